//! Referral - client library for the hospital referral tracking API
//!
//! This library provides the session handling, API client and screen-level
//! services shared by the referral front ends.

pub mod api;
pub mod claims;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use api::ApiClient;
pub use config::Config;
pub use error::{ReferralError, Result};
pub use service::{Loadable, ReferralService, Route, Submission};
pub use session::{Session, StorageBackend, TokenStore};
pub use types::{Diagnostic, Equipment, Hospital, MedicalHistory, Patient, Referral, ReferralStatus};
