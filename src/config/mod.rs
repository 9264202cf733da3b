//! Client configuration (layered: code > env > defaults).

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const ENV_BASE_URL: &str = "SCHOLAR_API_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "SCHOLAR_API_TIMEOUT_SECS";
const ENV_CREDENTIAL_DIR: &str = "SCHOLAR_CREDENTIAL_DIR";

/// Where the API lives and how requests to it behave.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
    credential_dir: PathBuf,
}

impl ClientConfig {
    /// Create a config for `base_url` with default timeout and credential directory.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: normalize_base_url(base_url.as_ref())?,
            timeout: DEFAULT_TIMEOUT,
            credential_dir: crate::auth::store::default_credential_dir(),
        })
    }

    /// Load from environment variables (`.env` is honored when present).
    pub fn from_env() -> Result<Self, ClientError> {
        let _ = dotenvy::dotenv();

        let base_url = std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base_url)?;

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Configuration(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got {raw:?}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Ok(dir) = std::env::var(ENV_CREDENTIAL_DIR) {
            config = config.with_credential_dir(PathBuf::from(dir));
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credential_dir(mut self, dir: PathBuf) -> Self {
        self.credential_dir = dir;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn credential_dir(&self) -> &PathBuf {
        &self.credential_dir
    }

    /// Absolute URL for an API path such as `/notices/`.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|err| ClientError::Configuration(format!("invalid API base URL {raw:?}: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ClientError::Configuration(format!(
                "unsupported API base URL scheme: {other}"
            )))
        }
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
