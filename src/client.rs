//! The root client: shared configuration, dispatch and the verb facades.
//!
//! [`Client`] is the only entry point most callers need. Use
//! [`ClientBuilder`] to seed its configuration.

use crate::{
    config::{Config, ConfigOverrides, ConfigStore},
    request::{build_request, Request, RequestDescriptor, Verb},
    token::TokenResolver,
    Error, Response, Result,
};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// An HTTP client with layered configuration and token-based authorization.
///
/// Clones are cheap and share one configuration: [`Client::configure`] on
/// any clone is seen by all of them.
///
/// # Examples
///
/// ```no_run
/// use fetchwire::{Client, ConfigOverrides, Response};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Serialize)]
/// struct CreateUser {
///     name: String,
/// }
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), fetchwire::Error> {
/// let client = Client::builder().build()?;
/// client.configure(ConfigOverrides::new().base_address("https://api.example.com"));
///
/// // GET /users?page=1
/// let users: Response<Vec<User>> = client.read("/users", json!({"page": 1})).await?;
/// println!("Fetched {} users", users.len());
///
/// // POST /users with a JSON body
/// let new_user = CreateUser { name: "Alice".to_string() };
/// let created: Response<User> = client.create("/users", &new_user).await?;
/// println!("Created user with ID: {}", created.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    config: ConfigStore,
    timeout: Option<Duration>,
}

/// Extra headers and configuration overrides for a single call.
///
/// # Examples
///
/// ```
/// use fetchwire::{CallOptions, ConfigOverrides};
///
/// let options = CallOptions::new()
///     .header("x-request-id", "42")?
///     .overrides(ConfigOverrides::new().token_prefix("Token"));
///
/// assert_eq!(options.headers["x-request-id"], "42");
/// # Ok::<(), fetchwire::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Headers layered over `content-type` and under the auth headers.
    pub headers: HeaderMap,
    /// Configuration fields that apply to this call only.
    pub overrides: ConfigOverrides,
}

impl CallOptions {
    /// Creates empty call options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::InvalidRequest(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::InvalidRequest(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Replaces the headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the per-call configuration overrides.
    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Shallow-merges `overrides` into this client's shared configuration.
    ///
    /// Fields left unset keep their current value. The change is visible to
    /// every clone of this client and to every call built afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use fetchwire::{Client, ConfigOverrides};
    ///
    /// # fn example() -> Result<(), fetchwire::Error> {
    /// let client = Client::builder().build()?;
    /// client.configure(ConfigOverrides::new().base_address("https://api.test"));
    ///
    /// let config = client.config();
    /// assert_eq!(config.base_address, "https://api.test");
    /// assert_eq!(config.token_prefix, "Bearer");
    /// # Ok(())
    /// # }
    /// ```
    pub fn configure(&self, overrides: ConfigOverrides) {
        self.inner.config.configure(overrides);
    }

    /// Returns a copy of the shared configuration.
    pub fn config(&self) -> Config {
        self.inner.config.snapshot()
    }

    /// Builds the descriptor for `request` without sending it.
    ///
    /// `overrides` apply to this build only; the shared configuration is
    /// left untouched.
    pub fn build(
        &self,
        request: &Request,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<RequestDescriptor> {
        let config = self.inner.config.effective(overrides);
        build_request(request, &config)
    }

    /// Sends a built request and parses the JSON response.
    ///
    /// One network round-trip per call. Transport errors come back as
    /// [`Error::Transport`], non-2xx statuses as [`Error::Protocol`] (the body
    /// is not read), and unparseable 2xx bodies as [`Error::Serialization`].
    pub async fn dispatch<T>(&self, descriptor: RequestDescriptor) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let url = Url::parse(&descriptor.url)?;
        let method = descriptor.method();

        tracing::debug!(method = %method, url = %url, "Executing HTTP request");

        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .headers(descriptor.headers.clone());

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = &descriptor.body {
            request = request.body(body.clone());
        }

        let start_time = Instant::now();
        let response = request.send().await.map_err(|e| {
            tracing::warn!(
                error = %e,
                method = %descriptor.verb,
                url = %descriptor.url,
                "Request failed"
            );
            Error::from(e)
        })?;

        self.parse_response(response, &descriptor, start_time).await
    }

    /// Parses the response and returns a typed `Response`.
    async fn parse_response<T>(
        &self,
        response: reqwest::Response,
        descriptor: &RequestDescriptor,
        start_time: Instant,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let headers = response.headers().clone();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "Received HTTP response"
        );

        if !status.is_success() {
            let message = match status.canonical_reason() {
                Some(reason) => reason.to_string(),
                None => format!(
                    "{} {} failed with status {}",
                    descriptor.verb,
                    descriptor.url,
                    status.as_u16()
                ),
            };

            if status.is_server_error() {
                tracing::warn!(status = status.as_u16(), message = %message, "Server error (5xx)");
            } else {
                tracing::error!(status = status.as_u16(), message = %message, "Request rejected");
            }

            return Err(Error::Protocol {
                status,
                message,
                headers,
            });
        }

        let raw_body = response.text().await?;
        let latency = start_time.elapsed();

        match serde_json::from_str::<T>(&raw_body) {
            Ok(data) => Ok(Response::new(data, raw_body, status, headers, latency)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    raw_response = %raw_body,
                    "Failed to parse response"
                );

                Err(Error::Serialization {
                    status,
                    raw_response: raw_body,
                    source: e,
                })
            }
        }
    }

    /// Builds and sends `request`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchwire::{Client, ConfigOverrides, Request, Verb};
    /// use serde_json::json;
    ///
    /// # async fn example() -> Result<(), fetchwire::Error> {
    /// let client = Client::builder().base_address("https://api.example.com").build()?;
    ///
    /// let request = Request::new(Verb::Replace, "/users/1")
    ///     .with_payload(json!({"name": "Bob"}))?;
    /// let overrides = ConfigOverrides::new().token_key("admin_token");
    ///
    /// let updated = client
    ///     .call::<serde_json::Value>(request, Some(&overrides))
    ///     .await?;
    /// println!("{}", updated.data);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<T>(
        &self,
        request: Request,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let descriptor = self.build(&request, overrides)?;
        self.dispatch(descriptor).await
    }

    async fn send<T>(
        &self,
        verb: Verb,
        path: String,
        payload: impl Serialize,
        options: Option<&CallOptions>,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let mut request = Request::new(verb, path).with_payload(payload)?;
        let overrides = match options {
            Some(options) => {
                request.headers = options.headers.clone();
                Some(&options.overrides).filter(|o| !o.is_empty())
            }
            None => None,
        };
        self.call(request, overrides).await
    }

    /// `GET path`, with an object `params` encoded into the query string.
    ///
    /// Pass `()` for no parameters. Arrays and scalars are not encoded.
    pub async fn read<T>(&self, path: impl Into<String>, params: impl Serialize) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.send(Verb::Read, path.into(), params, None).await
    }

    /// Like [`Client::read`], with extra headers and per-call overrides.
    pub async fn read_with<T>(
        &self,
        path: impl Into<String>,
        params: impl Serialize,
        options: &CallOptions,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.send(Verb::Read, path.into(), params, Some(options)).await
    }

    /// `POST path` with `body` as JSON.
    pub async fn create<T>(&self, path: impl Into<String>, body: impl Serialize) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.send(Verb::Create, path.into(), body, None).await
    }

    /// Like [`Client::create`], with extra headers and per-call overrides.
    pub async fn create_with<T>(
        &self,
        path: impl Into<String>,
        body: impl Serialize,
        options: &CallOptions,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.send(Verb::Create, path.into(), body, Some(options)).await
    }

    /// `PUT path` with `body` as JSON.
    pub async fn replace<T>(&self, path: impl Into<String>, body: impl Serialize) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.send(Verb::Replace, path.into(), body, None).await
    }

    /// Like [`Client::replace`], with extra headers and per-call overrides.
    pub async fn replace_with<T>(
        &self,
        path: impl Into<String>,
        body: impl Serialize,
        options: &CallOptions,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.send(Verb::Replace, path.into(), body, Some(options)).await
    }

    /// `DELETE path`. Unlike [`Client::read`], `params` travel as a JSON body.
    ///
    /// Pass `()` to send no body.
    pub async fn remove<T>(&self, path: impl Into<String>, params: impl Serialize) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.send(Verb::Delete, path.into(), params, None).await
    }

    /// Like [`Client::remove`], with extra headers and per-call overrides.
    pub async fn remove_with<T>(
        &self,
        path: impl Into<String>,
        params: impl Serialize,
        options: &CallOptions,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.send(Verb::Delete, path.into(), params, Some(options)).await
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Every configuration field starts at its default (see
/// [`Config::default`]); the setters here only change the starting point.
/// The client can still be reconfigured later with [`Client::configure`].
///
/// # Examples
///
/// ```no_run
/// use fetchwire::{ClientBuilder, MemoryStore, StoreTokenResolver};
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), fetchwire::Error> {
/// let tokens = Arc::new(MemoryStore::new());
/// tokens.set("session", "\"abc123\"");
///
/// let client = ClientBuilder::new()
///     .base_address("https://api.example.com")
///     .token_key("session")
///     .token_resolver(StoreTokenResolver::new(tokens))
///     .login_method("sso")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    config: Config,
    http_client: Option<reqwest::Client>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            http_client: None,
            timeout: None,
        }
    }

    /// Sets the address prepended to every request path.
    pub fn base_address(mut self, address: impl Into<String>) -> Self {
        self.config.base_address = address.into();
        self
    }

    /// Sets the key the token is looked up under.
    pub fn token_key(mut self, key: impl Into<String>) -> Self {
        self.config.token_key = key.into();
        self
    }

    /// Sets the `authorization` prefix. An empty prefix sends the bare token.
    pub fn token_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.token_prefix = prefix.into();
        self
    }

    /// Sets the login-method tag. An empty tag omits the header.
    pub fn login_method(mut self, tag: impl Into<String>) -> Self {
        self.config.login_method = tag.into();
        self
    }

    /// Replaces the token resolver.
    pub fn token_resolver(mut self, resolver: impl TokenResolver + 'static) -> Self {
        self.config.token_resolver = Arc::new(resolver);
        self
    }

    /// Replaces the whole starting configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Uses an existing `reqwest::Client` as the transport.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Opt-in per-request timeout.
    ///
    /// Off by default, in which case a request waits as long as the
    /// transport lets it. An elapsed timeout is reported as
    /// [`Error::Transport`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build()?,
        };

        tracing::debug!(config = ?self.config, timeout = ?self.timeout, "Client created");

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                config: ConfigStore::new(self.config),
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
