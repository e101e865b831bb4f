//! Application module
//!
//! Contains the core application architecture:
//! - Actions: What can happen
//! - State: What is true right now
//! - Reducer: Pure function (State, Action) -> State
//! - Effects: Requests the reducer queues for the event loop to run
//!
//! The reducer never performs I/O. Screen mounts, form submissions and
//! logout are queued as [`Effect`]s on the state; the event loop drains them
//! and feeds the results back in as actions tagged with the visit that asked
//! for them.

pub mod actions;
pub mod event;
pub mod field;
pub mod reducer;
pub mod state;

// Re-export commonly used types
pub use actions::{Action, Effect};
pub use field::TextField;
pub use reducer::reduce;
pub use state::{
    AppState, CredentialsField, CredentialsForm, HomeSection, HomeState, ReferralField,
    ReferralFormState, SearchState, StatusBarState, UiConfig, PAGE_ROWS,
};
