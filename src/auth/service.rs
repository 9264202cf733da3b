use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::session::Session;
use super::token::{AccessToken, RefreshToken, TokenPair};
use super::{CURRENT_USER_PATH, TOKEN_CREATE_PATH, VERIFY_PATH};
use crate::client::{AuthenticatedHttpClient, RequestDescriptor};
use crate::error::{ClientError, Result};

/// Outcome of re-validating persisted credentials at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRestore {
    /// Auto-login is on and the stored access token was accepted.
    Restored,
    /// The stored access token was rejected and credentials were cleared.
    Cleared,
    /// Nothing to restore (auto-login off or no stored token).
    Anonymous,
}

/// Profile returned by `GET /auth/users/me/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access: Option<String>,
    refresh: Option<String>,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

/// Login, logout, and session lifecycle on top of an [`AuthenticatedHttpClient`].
///
/// All I/O decisions (printing, prompting) belong to the caller.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: AuthenticatedHttpClient,
}

impl AuthService {
    pub fn new(client: AuthenticatedHttpClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AuthenticatedHttpClient {
        &self.client
    }

    fn session(&self) -> &Session {
        self.client.session()
    }

    /// Exchange username and password for a token pair and store it.
    ///
    /// `auto_login` decides whether the credentials survive [`AuthService::end_session`].
    pub async fn login(&self, username: &str, password: &str, auto_login: bool) -> Result<TokenPair> {
        let request =
            RequestDescriptor::post(TOKEN_CREATE_PATH).json(&LoginRequest { username, password })?;
        let response = self.client.send_unauthenticated(request).await?;

        let status = response.status().as_u16();
        if matches!(status, 400 | 401) {
            return Err(AuthError::InvalidCredentials { status }.into());
        }
        if !response.is_success() {
            return Err(response.into_error());
        }

        let payload: LoginResponse = response.json()?;
        let (Some(access), Some(refresh)) = (payload.access, payload.refresh) else {
            return Err(AuthError::InvalidResponse("login response missing access or refresh".into()).into());
        };
        let pair = TokenPair {
            access: AccessToken::new(access),
            refresh: RefreshToken::new(refresh),
        };
        self.session().store_pair(&pair)?;
        self.session().set_auto_login(auto_login)?;
        tracing::info!(username, auto_login, "logged in");
        Ok(pair)
    }

    /// Ask the server whether `token` is still valid.
    pub async fn verify(&self, token: &AccessToken) -> Result<bool> {
        let request = RequestDescriptor::post(VERIFY_PATH).json(&VerifyRequest {
            token: token.as_str(),
        })?;
        let response = self.client.send_unauthenticated(request).await?;
        Ok(response.is_success())
    }

    /// The signed-in user, or `None` when the server says nobody is signed in.
    pub async fn current_user(&self) -> Result<Option<User>> {
        match self.client.get(CURRENT_USER_PATH).await {
            Ok(response) => Ok(Some(response.json()?)),
            Err(ClientError::Http { status: 401 | 403, .. }) => Ok(None),
            Err(ClientError::Authentication(reason)) => {
                tracing::debug!(reason, "no recoverable session for current user");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Whether a usable access token is stored. An expired one is cleared.
    pub fn check_login_state(&self) -> Result<bool> {
        match self.session().access_token()? {
            Some(token) if token.is_expired() => {
                tracing::debug!("stored access token expired; clearing credentials");
                self.session().clear()?;
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    /// Re-validate persisted credentials when auto-login is enabled.
    ///
    /// Transport failures propagate and leave the stored credentials untouched.
    pub async fn restore_session(&self) -> Result<SessionRestore> {
        if !self.session().auto_login()? {
            return Ok(SessionRestore::Anonymous);
        }
        let Some(token) = self.session().access_token()? else {
            return Ok(SessionRestore::Anonymous);
        };
        if self.verify(&token).await? {
            Ok(SessionRestore::Restored)
        } else {
            self.session().clear()?;
            Ok(SessionRestore::Cleared)
        }
    }

    /// Drop tokens at the end of a session unless auto-login is enabled.
    ///
    /// Returns whether credentials were removed.
    pub fn end_session(&self) -> Result<bool> {
        if self.session().auto_login()? {
            return Ok(false);
        }
        let had_credentials =
            self.session().access_token()?.is_some() || self.session().refresh_token()?.is_some();
        self.session().clear()?;
        Ok(had_credentials)
    }

    /// Remove stored credentials. Safe to call when logged out.
    pub fn logout(&self) -> Result<()> {
        Ok(self.session().clear()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::store::MemoryCredentialStore;
    use crate::config::ClientConfig;

    fn service() -> AuthService {
        let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
        let session = Session::new(Arc::new(MemoryCredentialStore::new()));
        let client = AuthenticatedHttpClient::builder(config, session).build().unwrap();
        AuthService::new(client)
    }

    #[test]
    fn logout_succeeds_when_already_logged_out() {
        let svc = service();
        svc.logout().unwrap();
        svc.logout().unwrap();
    }

    #[test]
    fn check_login_state_clears_undecodable_token() {
        let svc = service();
        svc.client()
            .session()
            .store_pair(&TokenPair {
                access: AccessToken::new("opaque"),
                refresh: RefreshToken::new("r"),
            })
            .unwrap();
        assert!(!svc.check_login_state().unwrap());
        assert!(svc.client().session().refresh_token().unwrap().is_none());
    }

    #[test]
    fn end_session_keeps_tokens_with_auto_login() {
        let svc = service();
        let session = svc.client().session();
        session.set_access_token(&AccessToken::new("a")).unwrap();
        session.set_auto_login(true).unwrap();
        assert!(!svc.end_session().unwrap());
        assert!(session.access_token().unwrap().is_some());

        session.set_auto_login(false).unwrap();
        assert!(svc.end_session().unwrap());
        assert!(session.access_token().unwrap().is_none());
    }

    #[tokio::test]
    async fn restore_session_without_auto_login_is_anonymous() {
        let svc = service();
        svc.client()
            .session()
            .set_access_token(&AccessToken::new("a"))
            .unwrap();
        assert_eq!(svc.restore_session().await.unwrap(), SessionRestore::Anonymous);
    }
}
