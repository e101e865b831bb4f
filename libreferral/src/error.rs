//! Error types for the referral client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReferralError>;

#[derive(Error, Debug)]
pub enum ReferralError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ReferralError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ReferralError::InvalidInput(_) => 3,
            ReferralError::Api(ApiError::Unauthorized(_)) => 2,
            ReferralError::Api(_) => 1,
            ReferralError::Config(_) => 1,
            ReferralError::Session(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("OS keyring unavailable: {0}")]
    KeyringUnavailable(String),

    #[error("Keyring operation failed: {0}")]
    Keyring(String),

    #[error("Token file error: {0}")]
    Io(String),

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("No token storage backend available")]
    NoStoreAvailable,
}

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request to {path} failed with status {status}: {message}")]
    Status {
        path: String,
        status: u16,
        message: String,
    },

    #[error("Failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = ReferralError::InvalidInput("Empty query".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_unauthorized() {
        let error = ReferralError::Api(ApiError::Unauthorized("token expired".to_string()));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_api_errors() {
        let network = ReferralError::Api(ApiError::Network("connection refused".to_string()));
        assert_eq!(network.exit_code(), 1);

        let status = ReferralError::Api(ApiError::Status {
            path: "/patients".to_string(),
            status: 500,
            message: "Internal Server Error".to_string(),
        });
        assert_eq!(status.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_config_and_session() {
        let config = ReferralError::Config(ConfigError::MissingField("api.base_url".to_string()));
        assert_eq!(config.exit_code(), 1);

        let session = ReferralError::Session(SessionError::NoStoreAvailable);
        assert_eq!(session.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_status() {
        let error = ReferralError::Api(ApiError::Status {
            path: "/hospitals/3".to_string(),
            status: 404,
            message: "Not found.".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "API error: Request to /hospitals/3 failed with status 404: Not found."
        );
    }

    #[test]
    fn test_error_message_formatting_decode() {
        let error = ApiError::Decode {
            path: "/referrals".to_string(),
            message: "missing field `status`".to_string(),
        };
        assert!(error.to_string().contains("/referrals"));
        assert!(error.to_string().contains("missing field"));
    }

    #[test]
    fn test_error_conversion_from_session_error() {
        let error: ReferralError = SessionError::Io("permission denied".to_string()).into();

        match error {
            ReferralError::Session(_) => {}
            _ => panic!("Expected ReferralError::Session"),
        }
    }

    #[test]
    fn test_error_conversion_from_config_error() {
        let error: ReferralError = ConfigError::InvalidValue("base_url".to_string()).into();

        match error {
            ReferralError::Config(_) => {}
            _ => panic!("Expected ReferralError::Config"),
        }
    }

    #[test]
    fn test_api_error_clone() {
        let original = ApiError::Network("Connection failed".to_string());
        let cloned = original.clone();

        assert_eq!(original.to_string(), cloned.to_string());
    }
}
