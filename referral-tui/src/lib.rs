//! referral-tui library
//!
//! Exports the application state machine, service bridge and renderer for
//! testing and reuse by the binary.

pub mod app;
pub mod error;
pub mod services;
pub mod terminal;
pub mod ui;

// Re-export commonly used types
pub use app::{reduce, Action, AppState, Effect};
pub use error::{Result, TuiError};
