//! Credentials, token refresh coordination, and authentication flows.

pub mod error;
pub mod refresh;
pub mod service;
pub mod session;
pub mod store;
pub mod token;

pub use error::{AuthError, TokenDecodeError};
pub use refresh::{RefreshCoordinator, RefreshResult};
pub use service::{AuthService, SessionRestore, User};
pub use session::Session;
pub use store::{CredentialKey, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use token::{decode_expiry, is_expired_at, AccessToken, RefreshToken, TokenPair};

/// Issue a token pair from username and password.
pub const TOKEN_CREATE_PATH: &str = "/auth/jwt/create/";
/// Exchange a refresh token for a new access token. Never carries `Authorization`.
pub const REFRESH_PATH: &str = "/auth/jwt/refresh/";
/// Check whether a token is still accepted by the server.
pub const VERIFY_PATH: &str = "/auth/jwt/verify/";
/// Profile of the signed-in user.
pub const CURRENT_USER_PATH: &str = "/auth/users/me/";
