//! Login, registration and logout

use std::sync::Arc;

use crate::service::details::HospitalDirectory;
use crate::service::{Route, Submission};
use crate::types::Credentials;
use crate::{ApiClient, Result};

/// Shown when the token request fails or the token cannot be stored
pub const LOGIN_FAILED: &str = "Login failed";

/// Shown when account creation fails
pub const REGISTRATION_FAILED: &str = "Registration failed";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    directory: Option<Arc<HospitalDirectory>>,
}

impl AuthService {
    pub fn new(client: ApiClient, directory: Option<Arc<HospitalDirectory>>) -> Self {
        Self { client, directory }
    }

    async fn obtain_and_store(&self, credentials: &Credentials) -> Result<()> {
        let tokens = self.client.obtain_token(credentials).await?;
        self.client.session().begin(&tokens.access)
    }

    /// Log in and persist the access token
    ///
    /// On failure the stored token is left untouched.
    pub async fn login(&self, credentials: &Credentials) -> Submission {
        tracing::info!(username = %credentials.username, "Logging in");
        let result = self.obtain_and_store(credentials).await;
        Submission::settle(result, Route::Home, LOGIN_FAILED)
    }

    /// Create an account; success leads to the login screen
    pub async fn register(&self, credentials: &Credentials) -> Submission {
        tracing::info!(username = %credentials.username, "Registering account");
        let result = self.client.register_user(credentials).await;
        Submission::settle(result, Route::Login, REGISTRATION_FAILED)
    }

    /// Forget the token and any cached hospital names
    ///
    /// A storage failure is logged; the user still leaves the signed-in
    /// screens.
    pub fn logout(&self) -> Route {
        if let Err(e) = self.client.session().end() {
            tracing::error!(error = %e, "Failed to clear session token");
        }
        if let Some(directory) = &self.directory {
            directory.clear();
        }
        Route::Instructions
    }
}
