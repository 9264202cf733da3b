use std::fmt;
use std::sync::Arc;

use super::error::AuthError;
use super::store::{CredentialKey, CredentialStore};
use super::token::{AccessToken, RefreshToken, TokenPair};

/// Typed view over a [`CredentialStore`], held by the HTTP client instead of global state.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn CredentialStore>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("store", &"..").finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn access_token(&self) -> Result<Option<AccessToken>, AuthError> {
        Ok(non_empty(self.store.get(CredentialKey::AccessToken)?).map(AccessToken::new))
    }

    pub fn refresh_token(&self) -> Result<Option<RefreshToken>, AuthError> {
        Ok(non_empty(self.store.get(CredentialKey::RefreshToken)?).map(RefreshToken::new))
    }

    pub fn set_access_token(&self, token: &AccessToken) -> Result<(), AuthError> {
        self.store.set(CredentialKey::AccessToken, token.as_str())
    }

    pub fn store_pair(&self, pair: &TokenPair) -> Result<(), AuthError> {
        self.store.set(CredentialKey::AccessToken, pair.access.as_str())?;
        self.store.set(CredentialKey::RefreshToken, pair.refresh.as_str())
    }

    /// Whether credentials should survive the end of the session.
    pub fn auto_login(&self) -> Result<bool, AuthError> {
        Ok(self.store.get(CredentialKey::AutoLogin)?.as_deref() == Some("true"))
    }

    pub fn set_auto_login(&self, enabled: bool) -> Result<(), AuthError> {
        self.store
            .set(CredentialKey::AutoLogin, if enabled { "true" } else { "false" })
    }

    /// Remove both tokens. The auto-login preference is kept.
    pub fn clear(&self) -> Result<(), AuthError> {
        self.store.remove(CredentialKey::AccessToken)?;
        self.store.remove(CredentialKey::RefreshToken)
    }

    pub fn has_credentials(&self) -> Result<bool, AuthError> {
        Ok(self.access_token()?.is_some())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
