use thiserror::Error;

/// Reasons a JWT payload could not yield an expiry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenDecodeError {
    #[error("token is not a JWT (missing payload segment)")]
    MissingPayload,
    #[error("token payload is not valid base64url")]
    Encoding,
    #[error("token payload is not valid JSON")]
    Json,
    #[error("token payload has no numeric exp claim")]
    MissingExpiry,
}

/// Normalized authentication errors.
///
/// Cloneable so that every waiter of a shared refresh observes the same outcome.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No refresh token stored")]
    NoRefreshToken,
    #[error("Refresh token rejected (status {status})")]
    RefreshRejected { status: u16 },
    #[error("Refresh response did not contain an access token")]
    RefreshMalformed,
    #[error("Invalid username or password (status {status})")]
    InvalidCredentials { status: u16 },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout after {0}ms")]
    Timeout(u64),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
