//! Scholar client: authenticated access to the scholarship platform API.
//!
//! Bearer tokens are attached automatically, expired access tokens are
//! refreshed before a request leaves, and `401` responses trigger one refresh
//! plus a single replay. Concurrent requests that need a refresh share one
//! exchange with the authentication service.
//!
//! # Quick Start
//!
//! ```no_run
//! use scholar_client::prelude::*;
//!
//! # async fn example() -> scholar_client::error::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let session = Session::new(Arc::new(FileCredentialStore::new(config.credential_dir().clone())));
//! let client = AuthenticatedHttpClient::builder(config, session).build()?;
//!
//! AuthService::new(client.clone()).login("student", "secret", true).await?;
//! let notices = client.notices().list(&NoticeQuery::default()).await?;
//! println!("{} notices", notices.total);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
