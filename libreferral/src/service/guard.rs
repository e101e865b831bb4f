//! Navigation routes and the launch-time session guard

use crate::session::Session;
use crate::types::Patient;

/// Screens of the client
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Launch placeholder shown while the guard decides
    Index,
    Instructions,
    Login,
    Register,
    Home,
    /// Patient details; the patient travels with the route
    Details(Patient),
    ReferralForm,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Route::Index => "Referral",
            Route::Instructions => "Getting Started",
            Route::Login => "Login",
            Route::Register => "Register",
            Route::Home => "Home",
            Route::Details(_) => "Patient Details",
            Route::ReferralForm => "New Referral",
        }
    }
}

/// Decide the first screen from the stored token
///
/// The token is read once; the guard is not re-evaluated later. A storage
/// failure is logged and treated as "no token".
pub fn start_route(session: &Session) -> Route {
    match session.is_authenticated() {
        Ok(true) => Route::Home,
        Ok(false) => Route::Instructions,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read session token");
            Route::Instructions
        }
    }
}
