//! Request descriptions and the pure request builder.
//!
//! A [`Request`] says what the caller wants (verb, path, payload, extra
//! headers). [`build_request`] combines it with an effective [`Config`] into
//! a [`RequestDescriptor`]: the final URL, headers and body. Building never
//! touches the network.

use crate::config::{Config, LOGIN_METHOD_HEADER};
use crate::{Error, Result};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use url::form_urlencoded;

/// The four operations a client exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `GET`, payload goes to the query string.
    Read,
    /// `POST`, payload goes to the JSON body.
    Create,
    /// `PUT`, payload goes to the JSON body.
    Replace,
    /// `DELETE`, payload goes to the JSON body.
    Delete,
}

/// Where a verb places its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadPlacement {
    /// Object payloads become `?key=value&...`; the request has no body.
    Query,
    /// The payload is sent as a JSON body.
    Body,
}

impl Verb {
    /// Every verb, in declaration order.
    pub const ALL: [Verb; 4] = [Verb::Read, Verb::Create, Verb::Replace, Verb::Delete];

    fn rule(self) -> (Method, PayloadPlacement) {
        match self {
            Verb::Read => (Method::GET, PayloadPlacement::Query),
            Verb::Create => (Method::POST, PayloadPlacement::Body),
            Verb::Replace => (Method::PUT, PayloadPlacement::Body),
            Verb::Delete => (Method::DELETE, PayloadPlacement::Body),
        }
    }

    /// The HTTP method this verb is sent as.
    pub fn method(self) -> Method {
        self.rule().0
    }

    /// Where this verb puts its payload.
    pub fn placement(self) -> PayloadPlacement {
        self.rule().1
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.method(), f)
    }
}

/// Everything a caller says about one call.
///
/// The payload is held as JSON; `Value::Null` means "no payload".
///
/// # Examples
///
/// ```
/// use fetchwire::{Request, Verb};
/// use serde_json::json;
///
/// let request = Request::new(Verb::Read, "/users")
///     .with_payload(json!({"page": 1}))?
///     .with_header("x-trace", "abc")?;
///
/// assert_eq!(request.verb, Verb::Read);
/// assert_eq!(request.headers["x-trace"], "abc");
/// # Ok::<(), fetchwire::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    pub verb: Verb,
    pub path: String,
    pub payload: Value,
    pub headers: HeaderMap,
}

impl Request {
    /// Creates a request with no payload and no extra headers.
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            payload: Value::Null,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `payload` cannot be represented
    /// as JSON.
    pub fn with_payload(mut self, payload: impl Serialize) -> Result<Self> {
        self.payload = serde_json::to_value(payload)
            .map_err(|e| Error::InvalidRequest(format!("Failed to serialize payload: {}", e)))?;
        Ok(self)
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::InvalidRequest(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::InvalidRequest(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Replaces the extra headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// A fully formed request, ready to send.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub verb: Verb,
    pub url: String,
    pub headers: HeaderMap,
    /// JSON text. Always `None` for [`Verb::Read`].
    pub body: Option<String>,
}

impl RequestDescriptor {
    /// The HTTP method of this request.
    pub fn method(&self) -> Method {
        self.verb.method()
    }
}

/// Builds the descriptor for `request` under the effective `config`.
///
/// Headers are layered, each layer replacing same-named headers from the
/// one before:
///
/// 1. `content-type: application/json`
/// 2. the request's own headers
/// 3. `x-login-method`, when `config.login_method` is non-empty
/// 4. `authorization`, when the resolver returns a token: `"<prefix> <token>"`,
///    or the bare token when the prefix is empty
///
/// For [`Verb::Read`] only object payloads are encoded into the query
/// string; arrays and scalars are dropped. The other verbs send any
/// non-null payload as the JSON body.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] when the login tag or token cannot be
/// used as a header value.
///
/// # Examples
///
/// ```
/// use fetchwire::{build_request, Config, Request, Verb};
/// use serde_json::json;
///
/// let mut config = Config::default();
/// config.base_address = "https://api.test".to_string();
/// config.token_resolver = std::sync::Arc::new(|_: &str| Some("T".to_string()));
///
/// let request = Request::new(Verb::Read, "/users").with_payload(json!({"a": 1, "b": "two"}))?;
/// let built = build_request(&request, &config)?;
///
/// assert_eq!(built.url, "https://api.test/users?a=1&b=two");
/// assert_eq!(built.headers["authorization"], "Bearer T");
/// assert!(built.body.is_none());
/// # Ok::<(), fetchwire::Error>(())
/// ```
pub fn build_request(request: &Request, config: &Config) -> Result<RequestDescriptor> {
    let token = config.resolve_token();
    let placement = request.verb.placement();

    // No slash normalization between base and path.
    let mut url = if config.base_address.is_empty() {
        request.path.clone()
    } else {
        format!("{}{}", config.base_address, request.path)
    };

    if placement == PayloadPlacement::Query {
        if let Value::Object(params) = &request.payload {
            let query = encode_query(params);
            if !query.is_empty() {
                url.push('?');
                url.push_str(&query);
            }
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for name in request.headers.keys() {
        headers.remove(name);
    }
    for (name, value) in &request.headers {
        headers.append(name.clone(), value.clone());
    }

    if !config.login_method.is_empty() {
        let value = HeaderValue::try_from(config.login_method.as_str())
            .map_err(|e| Error::InvalidRequest(format!("Invalid login method tag: {}", e)))?;
        headers.insert(HeaderName::from_static(LOGIN_METHOD_HEADER), value);
    }

    if let Some(token) = token {
        let credentials = if config.token_prefix.is_empty() {
            token
        } else {
            format!("{} {}", config.token_prefix, token)
        };
        let mut value = HeaderValue::try_from(credentials)
            .map_err(|e| Error::InvalidRequest(format!("Invalid authorization value: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let body = match placement {
        PayloadPlacement::Body if !request.payload.is_null() => Some(
            serde_json::to_string(&request.payload)
                .map_err(|e| Error::InvalidRequest(format!("Failed to serialize body: {}", e)))?,
        ),
        _ => None,
    };

    tracing::debug!(
        method = %request.verb,
        url = %url,
        has_body = body.is_some(),
        authorized = headers.contains_key(AUTHORIZATION),
        "Built HTTP request"
    );

    Ok(RequestDescriptor {
        verb: request.verb,
        url,
        headers,
        body,
    })
}

/// Encodes an object's entries as `application/x-www-form-urlencoded`,
/// keeping their order.
///
/// Strings are used verbatim, numbers, booleans and `null` in their display
/// form, nested arrays and objects as compact JSON. Floats keep their
/// fractional part, so `2.0` encodes as `2.0`, not `2`.
///
/// # Examples
///
/// ```
/// use fetchwire::encode_query;
/// use serde_json::json;
///
/// let params = json!({"q": "rust lang", "page": 2, "all": true});
/// assert_eq!(encode_query(params.as_object().unwrap()), "q=rust+lang&page=2&all=true");
/// ```
pub fn encode_query(params: &Map<String, Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, &query_value(value));
    }
    serializer.finish()
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
