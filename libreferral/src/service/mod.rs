//! Service layer for the referral client
//!
//! This module holds the screen-level operations so that any front end
//! (the terminal UI today) only has to render results and forward input.
//!
//! # Architecture
//!
//! `ReferralService` is a facade over specialized sub-services that share one
//! `ApiClient` and one `Session`:
//!
//! - `guard`: start route selection from the stored token
//! - `HomeService`: home aggregate fetch and equipment search
//! - `DetailsService`: patient details with hospital name resolution
//! - `AuthService`: login, registration and logout
//! - `ReferralFormService`: referral form options and submission
//!
//! Every screen operation resolves to either a [`Loadable`] or a
//! [`Submission`]. Failures carry a single static message; the underlying
//! cause is logged and never shown.
//!
//! # Example
//!
//! ```no_run
//! use libreferral::service::{ReferralService, Route};
//!
//! # async fn example() -> libreferral::Result<()> {
//! let service = ReferralService::new()?;
//!
//! if service.start_route() == Route::Home {
//!     let view = service.home().load().await;
//!     if let Some(data) = view.data.ready() {
//!         println!("{} patients", data.patients.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod details;
pub mod guard;
pub mod home;
pub mod referral;

pub use guard::Route;

use std::fmt::Display;
use std::sync::Arc;

use self::auth::AuthService;
use self::details::{DetailsService, HospitalDirectory};
use self::home::HomeService;
use self::referral::ReferralFormService;
use crate::{ApiClient, Config, Result, Session};

/// State of data fetched for a screen
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    /// Static user-facing message
    Failed(&'static str),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Loading
    }
}

impl<T> Loadable<T> {
    /// Turn a fetch result into a screen state
    ///
    /// On failure the cause is logged and replaced by `message`.
    pub fn settle<E: Display>(result: std::result::Result<T, E>, message: &'static str) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => {
                tracing::warn!(error = %e, "{}", message);
                Loadable::Failed(message)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&'static str> {
        match self {
            Loadable::Failed(message) => Some(*message),
            _ => None,
        }
    }
}

/// Outcome of a form submission
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Success; the front end should move to this route
    Navigate(Route),
    /// Failure with a static user-facing message
    Rejected(&'static str),
}

impl Submission {
    pub(crate) fn settle<E: Display>(
        result: std::result::Result<(), E>,
        next: Route,
        message: &'static str,
    ) -> Self {
        match result {
            Ok(()) => Submission::Navigate(next),
            Err(e) => {
                tracing::warn!(error = %e, "{}", message);
                Submission::Rejected(message)
            }
        }
    }
}

/// Main service facade
///
/// All sub-services share the same `ApiClient` (and therefore the same
/// connection pool and `Session`).
pub struct ReferralService {
    session: Session,
    config: Arc<Config>,
    home: HomeService,
    details: DetailsService,
    auth: AuthService,
    referral: ReferralFormService,
}

impl ReferralService {
    /// Create a service from the default configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration cannot be loaded
    /// - The configured base URL is invalid
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config)
    }

    /// Create a service with the token store selected by `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let session = Session::from_config(&config.session)?;
        Self::with_session(config, session)
    }

    /// Create a service over an existing session
    ///
    /// Used by tests and by front ends that manage their own token store.
    pub fn with_session(config: Config, session: Session) -> Result<Self> {
        let client = ApiClient::new(&config.api, session.clone())?;

        let directory = if config.cache.hospital_names {
            tracing::debug!("Hospital name cache enabled");
            Some(Arc::new(HospitalDirectory::new()))
        } else {
            None
        };

        let home = HomeService::new(client.clone());
        let details = DetailsService::new(client.clone(), directory.clone());
        let auth = AuthService::new(client.clone(), directory);
        let referral = ReferralFormService::new(client);

        Ok(Self {
            session,
            config: Arc::new(config),
            home,
            details,
            auth,
            referral,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Route to show at launch
    pub fn start_route(&self) -> Route {
        guard::start_route(&self.session)
    }

    /// Access the home service
    pub fn home(&self) -> &HomeService {
        &self.home
    }

    /// Access the patient details service
    pub fn details(&self) -> &DetailsService {
        &self.details
    }

    /// Access the login/registration service
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Access the referral form service
    pub fn referral(&self) -> &ReferralFormService {
        &self.referral
    }
}
