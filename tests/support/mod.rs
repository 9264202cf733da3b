#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use scholar_client::auth::{CredentialKey, CredentialStore, MemoryCredentialStore, Session};
use scholar_client::client::{AuthenticatedHttpClient, LoginRedirect};
use scholar_client::config::ClientConfig;
use wiremock::MockServer;

/// Login redirect hook that remembers every URL it was handed.
#[derive(Default)]
pub struct RecordingRedirect {
    location: Option<String>,
    urls: Mutex<Vec<String>>,
}

impl RecordingRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("redirect lock poisoned").clone()
    }
}

impl LoginRedirect for RecordingRedirect {
    fn current_location(&self) -> Option<String> {
        self.location.clone()
    }

    fn redirect(&self, login_url: &str) {
        self.urls
            .lock()
            .expect("redirect lock poisoned")
            .push(login_url.to_string());
    }
}

pub struct Harness {
    pub client: AuthenticatedHttpClient,
    pub store: Arc<MemoryCredentialStore>,
    pub redirect: Arc<RecordingRedirect>,
}

impl Harness {
    pub fn seed(&self, access: Option<&str>, refresh: Option<&str>) {
        if let Some(access) = access {
            self.store.set(CredentialKey::AccessToken, access).unwrap();
        }
        if let Some(refresh) = refresh {
            self.store.set(CredentialKey::RefreshToken, refresh).unwrap();
        }
    }

    pub fn stored(&self, key: CredentialKey) -> Option<String> {
        self.store.get(key).unwrap()
    }
}

pub fn harness(server: &MockServer) -> Harness {
    harness_with(server, RecordingRedirect::new(), Duration::from_secs(5))
}

pub fn harness_with(server: &MockServer, redirect: RecordingRedirect, timeout: Duration) -> Harness {
    harness_for_url(&format!("{}/api", server.uri()), redirect, timeout)
}

pub fn harness_for_url(base_url: &str, redirect: RecordingRedirect, timeout: Duration) -> Harness {
    let store = Arc::new(MemoryCredentialStore::new());
    let redirect = Arc::new(redirect);
    let config = ClientConfig::new(base_url)
        .expect("valid base url")
        .with_timeout(timeout);
    let client = AuthenticatedHttpClient::builder(config, Session::new(store.clone()))
        .redirect(redirect.clone())
        .build()
        .expect("client builds");
    Harness {
        client,
        store,
        redirect,
    }
}

/// Unsigned JWT whose `exp` is `offset` from now.
pub fn jwt(subject: &str, offset: chrono::Duration) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(
        r#"{{"exp":{},"sub":"{subject}"}}"#,
        (Utc::now() + offset).timestamp()
    ));
    format!("{header}.{payload}.sig")
}

pub fn fresh_jwt(subject: &str) -> String {
    jwt(subject, chrono::Duration::hours(1))
}

pub fn expired_jwt(subject: &str) -> String {
    jwt(subject, -chrono::Duration::minutes(5))
}
