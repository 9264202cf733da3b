//! Authenticated HTTP client with transparent access-token refresh.
//!
//! Every request passes through [`AuthenticatedHttpClient::request`]:
//!
//! 1. Preparation attaches `Authorization: Bearer <token>` and, when the stored
//!    token is already expired, waits for a refresh before sending.
//! 2. A `401` response triggers one refresh and exactly one replay.
//! 3. Refreshes are single-flight: concurrent requests share one exchange.
//!
//! Unrecoverable sessions clear the stored credentials and hand a login URL to
//! the configured [`LoginRedirect`].
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use scholar_client::auth::{MemoryCredentialStore, Session};
//! use scholar_client::client::AuthenticatedHttpClient;
//! use scholar_client::config::ClientConfig;
//!
//! # async fn example() -> scholar_client::error::Result<()> {
//! let config = ClientConfig::new("https://example.com/api")?;
//! let session = Session::new(Arc::new(MemoryCredentialStore::new()));
//! let client = AuthenticatedHttpClient::builder(config, session).build()?;
//! let notices = client.get("/notices/").await?;
//! println!("{}", notices.text());
//! # Ok(())
//! # }
//! ```

mod pipeline;
pub mod redirect;
pub mod request;

pub use redirect::{login_url, LoginRedirect, TracingRedirect};
pub use request::{ApiResponse, RequestDescriptor};

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Serialize;

use crate::auth::{RefreshCoordinator, Session};
use crate::config::ClientConfig;
use crate::error::Result;

/// HTTP client for the scholarship API. Cheap to clone; clones share the
/// session and the in-flight refresh.
#[derive(Clone)]
pub struct AuthenticatedHttpClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    session: Session,
    redirect: Arc<dyn LoginRedirect>,
    refresh: RefreshCoordinator,
}

impl fmt::Debug for AuthenticatedHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedHttpClient")
            .field("config", &self.inner.config)
            .field("refresh", &self.inner.refresh)
            .finish()
    }
}

/// Builder for [`AuthenticatedHttpClient`].
pub struct ClientBuilder {
    config: ClientConfig,
    session: Session,
    redirect: Option<Arc<dyn LoginRedirect>>,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Hook that receives the login URL when the session is unrecoverable.
    pub fn redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Use a preconfigured reqwest client instead of the default one.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<AuthenticatedHttpClient> {
        let http = match self.http {
            Some(http) => http,
            None => {
                let mut headers = HeaderMap::new();
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
                reqwest::Client::builder()
                    .default_headers(headers)
                    .pool_max_idle_per_host(10)
                    .build()?
            }
        };
        Ok(AuthenticatedHttpClient {
            inner: Arc::new(ClientInner {
                http,
                config: self.config,
                session: self.session,
                redirect: self.redirect.unwrap_or_else(|| Arc::new(TracingRedirect)),
                refresh: RefreshCoordinator::new(),
            }),
        })
    }
}

impl AuthenticatedHttpClient {
    pub fn builder(config: ClientConfig, session: Session) -> ClientBuilder {
        ClientBuilder {
            config,
            session,
            redirect: None,
            http: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// The coordinator shared by every request issued through this client.
    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.inner.refresh
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(RequestDescriptor::get(path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.request(RequestDescriptor::post(path).json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.request(RequestDescriptor::put(path).json(body)?).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.request(RequestDescriptor::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request(RequestDescriptor::delete(path)).await
    }
}
