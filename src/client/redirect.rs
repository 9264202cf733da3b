//! Hook invoked when the session cannot be recovered.

use url::form_urlencoded;

/// Path of the login screen.
pub const LOGIN_PATH: &str = "/login";

/// Receives the forced navigation to the login screen.
///
/// The client never shows messages itself; embedders decide how to surface
/// the redirect (a UI route change, a CLI hint, a log line).
pub trait LoginRedirect: Send + Sync {
    /// Location the user should return to after signing in again.
    ///
    /// `None` makes the client fall back to the path of the failing request.
    fn current_location(&self) -> Option<String> {
        None
    }

    fn redirect(&self, login_url: &str);
}

/// Default hook: records the redirect in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRedirect;

impl LoginRedirect for TracingRedirect {
    fn redirect(&self, login_url: &str) {
        tracing::warn!(login_url, "session ended; sign in again to continue");
    }
}

/// `/login?next=<location>` with the location percent-encoded.
pub fn login_url(next: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}
