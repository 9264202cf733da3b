//! Convenience re-exports for common use.

pub use std::sync::Arc;

pub use crate::api::{
    CommunityApi, NoticeQuery, NoticesApi, Page, PostQuery, Recipient, ScholarshipQuery,
    ScholarshipsApi,
};
pub use crate::auth::{
    AccessToken, AuthError, AuthService, CredentialStore, FileCredentialStore,
    MemoryCredentialStore, RefreshToken, Session, SessionRestore,
};
pub use crate::client::{ApiResponse, AuthenticatedHttpClient, LoginRedirect, RequestDescriptor};
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, Result};
