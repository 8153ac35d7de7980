//! Session-managed client for the Service Layer REST API.
//!
//! `SessionClient` logs in lazily, caches the session for every caller that
//! shares it, and re-authenticates once when a request is rejected with
//! 401/403.

use std::future::Future;
use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::session::{Session, SessionTicket};
use crate::auth::Credentials;
use crate::config::ServiceLayerConfig;

use super::{ApiResponse, ClientError, RemoteErrorDetail, TransportFailure};

// ============================================================================
// Constants
// ============================================================================

/// Relative path of the login endpoint.
const LOGIN_PATH: &str = "Login";

/// Header carrying the session id on every authenticated request.
pub const SESSION_HEADER: &str = "B1SESSION";

/// Default overall timeout for one HTTP exchange, login included.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(100);

/// Default lifetime of idle pooled connections.
const DEFAULT_CONNECTION_LIFETIME: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, serde::Deserialize)]
struct LoginResponse {
    #[serde(rename = "SessionId")]
    session_id: Option<String>,
}

/// Client for one Service Layer company database.
///
/// Share it behind an `Arc`; all clones of the `Arc` use the same session.
pub struct SessionClient {
    http: Client,
    base_url: Url,
    credentials: Credentials,
    session: RwLock<Session>,
    login_lock: Mutex<()>,
}

/// Builder for `SessionClient`.
pub struct SessionClientBuilder {
    base_url: String,
    credentials: Credentials,
    timeout: Duration,
    connection_lifetime: Duration,
    accept_invalid_certs: bool,
}

impl SessionClientBuilder {
    /// Overall timeout for every remote call, including login.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How long an idle pooled connection is kept before it is dropped.
    pub fn connection_lifetime(mut self, lifetime: Duration) -> Self {
        self.connection_lifetime = lifetime;
        self
    }

    /// Skip TLS certificate validation. Diagnostics only.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> Result<SessionClient, ClientError> {
        let base_url = normalize_base_url(&self.base_url)?;

        if self.accept_invalid_certs {
            warn!(base_url = %base_url, "TLS certificate validation is disabled for the Service Layer");
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .pool_idle_timeout(self.connection_lifetime)
            .cookie_store(true)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(SessionClient {
            http,
            base_url,
            credentials: self.credentials,
            session: RwLock::new(Session::new()),
            login_lock: Mutex::new(()),
        })
    }
}

/// Parse the base URL and make sure relative paths join beneath it.
fn normalize_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidConfig("base URL is empty".to_string()));
    }
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| ClientError::InvalidConfig(format!("invalid base URL '{}': {}", trimmed, e)))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidConfig(format!(
            "base URL '{}' cannot carry relative paths",
            trimmed
        )));
    }
    Ok(url)
}

/// Drop null-valued object members, recursively.
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Run `fut` unless `cancel` fires first.
async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output, ClientError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransportFailure::Cancelled.into()),
        out = fut => Ok(out),
    }
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

impl SessionClient {
    pub fn builder(base_url: impl Into<String>, credentials: Credentials) -> SessionClientBuilder {
        SessionClientBuilder {
            base_url: base_url.into(),
            credentials,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            connection_lifetime: DEFAULT_CONNECTION_LIFETIME,
            accept_invalid_certs: false,
        }
    }

    /// Create a client from the `service_layer` configuration section.
    pub fn from_config(config: &ServiceLayerConfig) -> Result<Self, ClientError> {
        Self::builder(config.base_url.clone(), config.credentials())
            .timeout(config.request_timeout())
            .connection_lifetime(config.connection_lifetime())
            .accept_invalid_certs(config.ignore_tls_errors)
            .build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Authenticated read of a relative resource path.
    pub async fn get(&self, path: &str, cancel: &CancellationToken) -> Result<ApiResponse, ClientError> {
        self.send_with_auth_retry(Method::GET, path, None, cancel).await
    }

    /// Authenticated write of `payload` as JSON. Null members are omitted.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &B,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, ClientError> {
        let mut body = serde_json::to_value(payload)?;
        strip_nulls(&mut body);
        self.send_with_auth_retry(Method::POST, path, Some(&body), cancel).await
    }

    async fn send_with_auth_retry(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.endpoint(path)?;

        let ticket = self.ensure_session(cancel).await?;
        let response = self.dispatch(&method, &url, body, &ticket, cancel).await?;
        let status = response.status();
        if !is_auth_failure(status) {
            return self.read_response(&method, path, response, cancel).await;
        }

        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            "Service Layer rejected the session, re-login and retry once"
        );
        drop(response);
        self.session.write().await.invalidate(ticket.generation);

        let ticket = self.ensure_session(cancel).await?;
        let response = self.dispatch(&method, &url, body, &ticket, cancel).await?;
        self.read_response(&method, path, response, cancel).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            return Err(ClientError::InvalidPath {
                path: path.to_string(),
                reason: "path is empty".to_string(),
            });
        }
        self.base_url.join(relative).map_err(|e| ClientError::InvalidPath {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Build and send one attempt. The body is serialized afresh each time.
    async fn dispatch(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
        ticket: &SessionTicket,
        cancel: &CancellationToken,
    ) -> Result<Response, ClientError> {
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(header::ACCEPT, "application/json");

        if let Some(ref token) = ticket.token {
            request = request.header(SESSION_HEADER, token.as_str());
        }
        if let Some(body) = body {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        debug!(method = %method, url = %url, "Service Layer request");
        cancellable(cancel, request.send())
            .await?
            .map_err(|e| ClientError::Transport(e.into()))
    }

    async fn read_response(
        &self,
        method: &Method,
        path: &str,
        response: Response,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, ClientError> {
        let status = response.status();
        let text = cancellable(cancel, response.text())
            .await?
            .map_err(|e| ClientError::Transport(e.into()))?;

        if status.is_success() {
            return Ok(ApiResponse::decode(status, &text));
        }

        let err = ClientError::request_failed(method, path, status, &text);
        debug!(error = %err, "Service Layer request failed");
        Err(err)
    }

    /// Return the current session, logging in first if there is none.
    ///
    /// At most one login is in flight; callers that queued behind it pick up
    /// its session instead of logging in again.
    async fn ensure_session(&self, cancel: &CancellationToken) -> Result<SessionTicket, ClientError> {
        if let Some(ticket) = self.session.read().await.ticket() {
            return Ok(ticket);
        }

        let _guard = cancellable(cancel, self.login_lock.lock()).await?;

        if let Some(ticket) = self.session.read().await.ticket() {
            debug!("Session established by a concurrent caller");
            return Ok(ticket);
        }

        let token = self.login(cancel).await?;
        let ticket = self.session.write().await.establish(token);
        Ok(ticket)
    }

    async fn login(&self, cancel: &CancellationToken) -> Result<Option<String>, ClientError> {
        let url = self.endpoint(LOGIN_PATH)?;
        info!(
            company = %self.credentials.company_db(),
            user = %self.credentials.user_name(),
            "Logging in to Service Layer"
        );

        let request = self
            .http
            .post(url)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&self.credentials.login_request())?);

        let response = match cancellable(cancel, request.send()).await? {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                warn!(error = %e, "Service Layer login endpoint unreachable");
                return Err(ClientError::LoginFailed {
                    status: None,
                    remote: RemoteErrorDetail::default(),
                    source: Some(e),
                });
            }
            Err(e) => return Err(ClientError::Transport(e.into())),
        };

        let status = response.status();
        let text = cancellable(cancel, response.text())
            .await?
            .map_err(|e| ClientError::Transport(e.into()))?;

        if !status.is_success() {
            let err = ClientError::LoginFailed {
                status: Some(status),
                remote: RemoteErrorDetail::from_body(&text),
                source: None,
            };
            warn!(error = %err, "Service Layer login rejected");
            return Err(err);
        }

        let session_id = serde_json::from_str::<LoginResponse>(&text)
            .ok()
            .and_then(|r| r.session_id)
            .filter(|id| !id.trim().is_empty());

        if session_id.is_some() {
            info!("Service Layer session established");
        } else {
            warn!("Login response carried no SessionId, relying on the cookie session");
        }
        Ok(session_id)
    }
}
