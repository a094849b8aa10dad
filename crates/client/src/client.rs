//! Authenticated HTTP client for the OneTap API.
//!
//! The base URL is never ambient: every client is built from an explicit
//! [`ClientConfig`] carrying the [`Environment`] it talks to.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::ApiError;

/// Query string or JSON body under construction.
pub type Payload = serde_json::Map<String, Value>;

const PRODUCTION_URL: &str = "https://api-beta.onetapcheckin.com";
const STAGING_URL: &str = "http://localhost:1337";

/// Identifier sent in the `x-sourceapp` header unless overridden.
pub const DEFAULT_SOURCE_APP: &str = "n8n-integration";

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Which OneTap server a client talks to.
///
/// Parsed from `"production"`, `"staging"`, or any absolute http(s) URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Environment {
    #[default]
    Production,
    Staging,
    Custom(Url),
}

impl Environment {
    pub fn base_url(&self) -> Result<Url, ApiError> {
        let raw = match self {
            Self::Production => PRODUCTION_URL,
            Self::Staging => STAGING_URL,
            Self::Custom(url) => return Ok(url.clone()),
        };
        Url::parse(raw).map_err(|_| ApiError::InvalidBaseUrl(raw.to_owned()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Staging => write!(f, "staging"),
            Self::Custom(url) => write!(f, "{url}"),
        }
    }
}

impl FromStr for Environment {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            other => match Url::parse(other) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Custom(url)),
                _ => Err(ApiError::InvalidBaseUrl(other.to_owned())),
            },
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        env.to_string()
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Everything needed to build an authenticated client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub environment: Environment,
    /// Static application identifier sent as `x-sourceapp`.
    pub source_app: String,
    /// Per-request timeout.  `None` leaves it to the transport.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, environment: Environment) -> Self {
        Self {
            api_key: api_key.into(),
            environment,
            source_app: DEFAULT_SOURCE_APP.to_owned(),
            timeout: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ApiRequest
// ---------------------------------------------------------------------------

/// A single outbound call: method, path, query and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Payload,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Payload::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, query: Payload) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Render a query payload as string pairs.
///
/// Arrays repeat their key, `null` is skipped, everything else uses its JSON
/// text (strings unquoted).
pub fn query_pairs(query: &Payload) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(query.len());
    for (key, value) in query {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| (key.clone(), scalar(item))));
            }
            other => pairs.push((key.clone(), scalar(other))),
        }
    }
    pairs
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// OneTapClient
// ---------------------------------------------------------------------------

/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct OneTapClient {
    http: Client,
    base_url: Url,
    config: ClientConfig,
}

impl OneTapClient {
    /// Build a client for the configured environment.
    ///
    /// # Errors
    /// Returns `ApiError::Http` if the reqwest client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = config.environment.base_url()?;
        let mut builder =
            Client::builder().user_agent(concat!("onetap-nodes/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.config.environment
    }

    /// Issue exactly one request and decode its JSON response.
    ///
    /// An empty 2xx body decodes to `null`.
    ///
    /// # Errors
    /// - [`ApiError::Http`] for transport failures.
    /// - [`ApiError::Status`] for any non-2xx answer.
    /// - [`ApiError::Decode`] if a non-empty body is not JSON.
    pub async fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let url = self
            .base_url
            .join(&request.path)
            .map_err(|_| ApiError::InvalidBaseUrl(format!("{}{}", self.base_url, request.path)))?;

        debug!(method = %request.method, %url, query = ?request.query, "sending OneTap request");

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header("X-API-Key", &self.config.api_key)
            .header("x-sourceapp", &self.config.source_app)
            .header(ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&query_pairs(&request.query));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());
            return Err(ApiError::Status { status, message });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Best human-readable message from an error body.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["message", "error"]
            .iter()
            .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_owned))
    });
    Some(from_json.unwrap_or_else(|| body.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn environment_parses_named_and_custom_values() {
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Staging);

        let custom: Environment = "http://127.0.0.1:4000".parse().unwrap();
        assert_eq!(custom.base_url().unwrap().as_str(), "http://127.0.0.1:4000/");

        assert!("ftp://example.com".parse::<Environment>().is_err());
        assert!("nonsense".parse::<Environment>().is_err());
    }

    #[test]
    fn environment_round_trips_through_serde() {
        let env: Environment = serde_json::from_value(json!("staging")).unwrap();
        assert_eq!(env, Environment::Staging);
        assert_eq!(serde_json::to_value(&env).unwrap(), json!("staging"));
        assert_eq!(
            Environment::Production.base_url().unwrap().as_str(),
            "https://api-beta.onetapcheckin.com/"
        );
    }

    #[test]
    fn query_pairs_render_scalars_and_repeat_arrays() {
        let query = json!({
            "page": 0,
            "favorite": true,
            "search": "jo",
            "listIds": ["a", "b"],
            "skipped": null,
        });
        let pairs = query_pairs(query.as_object().unwrap());

        assert!(pairs.contains(&("page".into(), "0".into())));
        assert!(pairs.contains(&("favorite".into(), "true".into())));
        assert!(pairs.contains(&("search".into(), "jo".into())));
        assert!(pairs.contains(&("listIds".into(), "a".into())));
        assert!(pairs.contains(&("listIds".into(), "b".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "skipped"));
    }

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"message":"Profile not found"}"#).as_deref(),
            Some("Profile not found")
        );
        assert_eq!(error_message("gateway down").as_deref(), Some("gateway down"));
        assert_eq!(error_message("  "), None);
    }
}
