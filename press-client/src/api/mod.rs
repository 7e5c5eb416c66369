//! Remote method API
//!
//! Every call goes to `/api/method/<dotted.path>` and the server wraps the
//! return value in a `{"message": ...}` envelope.

use async_trait::async_trait;
use press_core::{ErrorContext, PressError, PressResult};
use serde_json::{json, Value};
use std::collections::HashMap;

pub mod frappe;


pub use frappe::FrappeClient;

/// Whether the logged-in user may act on behalf of a team
pub const CAN_SWITCH_TO_TEAM: &str = "press.api.account.can_switch_to_team";

/// Number of sites owned by a team
pub const GET_SITE_COUNT: &str = "press.api.account.get_site_count";

/// Fetch a whole document
pub const GET_DOC: &str = "frappe.client.get";

/// Invoke a whitelisted method on a document
pub const RUN_DOC_METHOD: &str = "run_doc_method";

/// Configuration for API clients
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Site URL; `/api/method/...` is appended to it
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Additional headers
    pub headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 30,
            user_agent: format!("press-console/{}", env!("CARGO_PKG_VERSION")),
            headers: HashMap::new(),
        }
    }
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Build the client configuration from the `[server]` config section
    pub fn from_server_config(server: &press_core::ServerConfig) -> Self {
        let config = Self {
            base_url: server.base_url.clone(),
            timeout_seconds: server.timeout_seconds,
            user_agent: server.user_agent.clone(),
            headers: HashMap::new(),
        };
        match &server.cookie {
            Some(cookie) => config.with_cookie(cookie.clone()),
            None => config,
        }
    }

    /// Set additional header
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Send the session cookie with every request
    pub fn with_cookie(self, cookie: String) -> Self {
        self.with_header(reqwest::header::COOKIE.as_str().to_string(), cookie)
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Absolute URL of a method endpoint
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/api/method/{}",
            self.base_url.trim_end_matches('/'),
            method.trim_start_matches('/')
        )
    }
}

/// Remote procedures the console relies on.
///
/// Only [`PressApi::call_method`] talks to the network; the other methods
/// shape parameters and decode results on top of it.
#[async_trait]
pub trait PressApi: Send + Sync {
    /// Call a whitelisted server method and return the unwrapped `message`
    async fn call_method(&self, method: &str, params: Value) -> PressResult<Value>;

    /// Ask the server whether the current user may switch to `team`
    async fn can_switch_to_team(&self, team: &str) -> PressResult<bool> {
        let message = self
            .call_method(CAN_SWITCH_TO_TEAM, json!({ "team": team }))
            .await?;
        decode_flag(CAN_SWITCH_TO_TEAM, &message)
    }

    /// Number of sites belonging to `team`
    async fn get_site_count(&self, team: &str) -> PressResult<u64> {
        let message = self
            .call_method(GET_SITE_COUNT, json!({ "team": team }))
            .await?;
        decode_count(message)
    }

    /// Fetch a document by doctype and name
    async fn get_doc(&self, doctype: &str, name: &str) -> PressResult<Value> {
        self.call_method(GET_DOC, json!({ "doctype": doctype, "name": name }))
            .await
    }

    /// Run a whitelisted method of a document
    async fn run_doc_method(
        &self,
        doctype: &str,
        name: &str,
        method: &str,
        args: Value,
    ) -> PressResult<Value> {
        // The server parses `args` from a JSON string
        let args = serde_json::to_string(&args)?;
        self.call_method(
            RUN_DOC_METHOD,
            json!({ "dt": doctype, "dn": name, "method": method, "args": args }),
        )
        .await
    }
}

/// Interpret a server answer as a yes/no flag.
///
/// Python truthiness leaks through the API, so `1`/`0` show up next to real
/// booleans. Anything that is neither is rejected instead of guessed.
pub(crate) fn decode_flag(method: &str, message: &Value) -> PressResult<bool> {
    match message {
        Value::Bool(flag) => Ok(*flag),
        Value::Null => Ok(false),
        Value::Number(number) => Ok(number.as_f64().is_some_and(|n| n != 0.0)),
        other => Err(PressError::Internal {
            message: format!("Unexpected response from {}: {}", method, other),
            source: None,
            context: ErrorContext::new("press_api")
                .with_operation("decode_flag")
                .with_metadata("method", method),
        }),
    }
}

/// Interpret a server answer as a count.
///
/// `null` means nothing was counted and whole floats such as `1.0` are
/// accepted. Anything else must deserialize as an unsigned integer.
pub(crate) fn decode_count(message: Value) -> PressResult<u64> {
    match &message {
        Value::Null => Ok(0),
        Value::Number(number) => {
            if let Some(count) = number.as_u64() {
                return Ok(count);
            }
            match number.as_f64() {
                Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(n as u64),
                _ => Ok(serde_json::from_value(message)?),
            }
        }
        _ => Ok(serde_json::from_value(message)?),
    }
}

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &ApiClientConfig) -> PressResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            PressError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    for (key, value) in &config.headers {
        let header_name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            PressError::Config {
                message: format!("Invalid header name '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?;

        let mut header_value =
            reqwest::header::HeaderValue::from_str(value).map_err(|e| PressError::Config {
                message: format!("Invalid header value for '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            })?;
        if header_name == reqwest::header::COOKIE {
            header_value.set_sensitive(true);
        }

        headers.insert(header_name, header_value);
    }

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| PressError::Config {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}

/// Turn a non-success response into a [`PressError`].
///
/// Frappe puts the exception class in `exc_type` and user-facing messages in
/// `_server_messages`, a JSON-encoded list of JSON-encoded objects.
pub(crate) async fn handle_response_error(response: reqwest::Response, method: &str) -> PressError {
    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();

    let parsed: Option<Value> = serde_json::from_str(&body).ok();
    let exc_type = parsed
        .as_ref()
        .and_then(|v| v.get("exc_type"))
        .and_then(Value::as_str)
        .map(String::from);
    let message = parsed
        .as_ref()
        .and_then(server_message)
        .or_else(|| {
            parsed
                .as_ref()
                .and_then(|v| v.get("exception"))
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| {
            if body.is_empty() || parsed.is_some() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body.clone()
            }
        });

    let context = ErrorContext::new("press_api")
        .with_operation("call_method")
        .with_metadata("method", method)
        .with_metadata("url", url.as_str());

    let session_expired = matches!(
        exc_type.as_deref(),
        Some("AuthenticationError") | Some("SessionExpired") | Some("CSRFTokenError")
    );
    if status == reqwest::StatusCode::UNAUTHORIZED || session_expired {
        return PressError::Authentication {
            message,
            context: context.with_suggestion("Log in again and refresh the session cookie"),
        };
    }

    PressError::Server {
        status: status.as_u16(),
        message,
        exc_type,
        context: context.with_suggestion(match status.as_u16() {
            403 => "Check that the user has access to this team",
            404 => "Check the method name and the site URL",
            417 => "The server rejected the request parameters",
            _ => "Check network connectivity and server status",
        }),
    }
}

fn server_message(body: &Value) -> Option<String> {
    let raw = body.get("_server_messages")?.as_str()?;
    let messages: Vec<String> = serde_json::from_str(raw).ok()?;
    let first = messages.first()?;
    match serde_json::from_str::<Value>(first) {
        Ok(value) => value
            .get("message")
            .and_then(Value::as_str)
            .map(String::from),
        Err(_) => Some(first.clone()),
    }
}
