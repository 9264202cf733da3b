//! Request preparation, dispatch, and 401 recovery.

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::redirect::login_url;
use super::request::{ApiResponse, RequestDescriptor};
use super::AuthenticatedHttpClient;
use crate::auth::{AccessToken, AuthError, RefreshResult, REFRESH_PATH};
use crate::error::{ClientError, Result};
use crate::util::timeout::with_timeout;

/// What to do with a request whose response was not a success.
enum Recovery {
    Retry,
    Fail,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: Option<String>,
    refresh: Option<String>,
}

impl AuthenticatedHttpClient {
    /// Send `request` through the authentication pipeline.
    ///
    /// Non-2xx responses that refresh cannot resolve surface as
    /// [`ClientError::Http`]; transport failures surface unchanged as
    /// [`ClientError::Network`] or [`ClientError::Timeout`] and are never retried.
    pub async fn request(&self, mut request: RequestDescriptor) -> Result<ApiResponse> {
        let request_id = Uuid::new_v4();
        loop {
            self.prepare(&mut request).await?;
            tracing::debug!(
                %request_id,
                method = %request.method,
                path = %request.path,
                retried = request.retried,
                "sending request"
            );

            let response = self.dispatch(&request).await?;
            if response.is_success() {
                return Ok(response);
            }

            tracing::debug!(%request_id, status = response.status().as_u16(), "request failed");
            match self.recover(&mut request, &response).await {
                Recovery::Retry => continue,
                Recovery::Fail => return Err(response.into_error()),
            }
        }
    }

    /// Send without attaching or repairing credentials. Used for the public
    /// token endpoints (login, verify).
    pub(crate) async fn send_unauthenticated(
        &self,
        mut request: RequestDescriptor,
    ) -> Result<ApiResponse> {
        apply_default_content_type(&mut request);
        request.headers.remove(AUTHORIZATION);
        self.dispatch(&request).await
    }

    async fn prepare(&self, request: &mut RequestDescriptor) -> Result<()> {
        apply_default_content_type(request);

        if request.is_refresh_call() {
            request.headers.remove(AUTHORIZATION);
            return Ok(());
        }
        // The replay carries the token produced by the refresh it waited on.
        if request.retried {
            return Ok(());
        }

        let Some(access) = self.session().access_token()? else {
            return Ok(());
        };
        request.set_bearer(&access)?;
        if !access.is_expired() {
            return Ok(());
        }

        if self.session().refresh_token()?.is_none() {
            let reason = "access token expired and no refresh token is stored";
            self.force_logout(&request.path, reason);
            return Err(ClientError::Authentication(reason.to_string()));
        }

        tracing::debug!(path = %request.path, "access token expired; refreshing before send");
        let token = self
            .refresh_access_token(&request.path)
            .await
            .map_err(|err| ClientError::Authentication(format!("session refresh failed: {err}")))?;
        request.set_bearer(&token)
    }

    async fn recover(&self, request: &mut RequestDescriptor, response: &ApiResponse) -> Recovery {
        if response.status() != StatusCode::UNAUTHORIZED {
            return Recovery::Fail;
        }
        if request.is_refresh_call() {
            self.force_logout(&request.path, "refresh token rejected");
            return Recovery::Fail;
        }
        if request.retried {
            return Recovery::Fail;
        }
        request.retried = true;

        // A refresh that settled while this request was in flight already
        // replaced the token it was sent with.
        if let Ok(Some(current)) = self.session().access_token() {
            let sent = request.bearer().and_then(|value| value.to_str().ok());
            if sent.is_some_and(|sent| sent != current.bearer()) {
                tracing::debug!(path = %request.path, "token changed since send; replaying");
                return match request.set_bearer(&current) {
                    Ok(()) => Recovery::Retry,
                    Err(_) => Recovery::Fail,
                };
            }
        }

        match self.session().refresh_token() {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.force_logout(&request.path, "unauthorized and no refresh token is stored");
                return Recovery::Fail;
            }
            Err(err) => {
                self.force_logout(&request.path, &format!("credential store unreadable: {err}"));
                return Recovery::Fail;
            }
        }

        match self.refresh_access_token(&request.path).await {
            Ok(token) => match request.set_bearer(&token) {
                Ok(()) => Recovery::Retry,
                Err(err) => {
                    tracing::warn!(error = %err, "refreshed token cannot be sent");
                    Recovery::Fail
                }
            },
            Err(_) => Recovery::Fail,
        }
    }

    async fn dispatch(&self, request: &RequestDescriptor) -> Result<ApiResponse> {
        let url = self.config().endpoint(&request.path);
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        with_timeout(self.config().timeout(), async move {
            let response = builder.send().await?;
            ApiResponse::read(response).await
        })
        .await
    }

    /// Join or start the single-flight refresh. A failed refresh logs the
    /// session out once, inside the shared operation.
    pub(crate) async fn refresh_access_token(&self, trigger_path: &str) -> RefreshResult {
        let client = self.clone();
        let trigger_path = trigger_path.to_string();
        self.inner
            .refresh
            .refresh_with(move || async move {
                let result = client.exchange_refresh_token().await;
                if let Err(err) = &result {
                    client.force_logout(&trigger_path, &err.to_string());
                }
                result
            })
            .await
    }

    async fn exchange_refresh_token(&self) -> RefreshResult {
        let refresh = self
            .session()
            .refresh_token()?
            .ok_or(AuthError::NoRefreshToken)?;

        let url = self.config().endpoint(REFRESH_PATH);
        let send = self
            .inner
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(&RefreshRequest {
                refresh: refresh.as_str(),
            })
            .send();

        let payload = with_timeout(self.config().timeout(), async move {
            let response = send.await?;
            let status = response.status();
            if !status.is_success() {
                return Err(AuthError::RefreshRejected {
                    status: status.as_u16(),
                });
            }
            let body = response.bytes().await?;
            serde_json::from_slice::<RefreshResponse>(&body).map_err(|_| AuthError::RefreshMalformed)
        })
        .await?;

        let access = payload
            .access
            .filter(|access| !access.is_empty())
            .map(AccessToken::new)
            .ok_or(AuthError::RefreshMalformed)?;
        if payload.refresh.is_some() {
            tracing::debug!("refresh response carried a rotated refresh token; keeping the stored one");
        }

        self.session().set_access_token(&access)?;
        tracing::info!("access token refreshed");
        Ok(access)
    }

    /// Clear credentials and redirect to the login screen.
    fn force_logout(&self, request_path: &str, reason: &str) {
        tracing::warn!(reason, path = request_path, "session is unrecoverable; logging out");
        if let Err(err) = self.session().clear() {
            tracing::warn!(error = %err, "failed to clear stored credentials");
        }
        let next = self
            .inner
            .redirect
            .current_location()
            .unwrap_or_else(|| request_path.to_string());
        self.inner.redirect.redirect(&login_url(&next));
    }
}

fn apply_default_content_type(request: &mut RequestDescriptor) {
    if request.carries_body() && !request.headers.contains_key(CONTENT_TYPE) {
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
}
