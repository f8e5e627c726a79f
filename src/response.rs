//! Parsed 2xx responses.
//!
//! Only successful responses become a [`Response`]; everything else is an
//! [`Error`](crate::Error). The raw body stays around so a caller can log
//! exactly what the server sent next to what it was parsed into.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A 2xx response and the JSON value parsed from its body.
///
/// `Response<T>` derefs to `T`:
///
/// ```no_run
/// use fetchwire::Client;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Account {
///     email: String,
/// }
///
/// # async fn example() -> Result<(), fetchwire::Error> {
/// let client = Client::builder()
///     .base_address("https://api.example.com")
///     .build()?;
///
/// let account = client.read::<Account>("/me", ()).await?;
/// println!("{} ({} in {:?})", account.email, account.status, account.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    pub data: T,
    /// Body text as received, before parsing.
    pub raw_body: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Send to end of body.
    pub latency: Duration,
}

impl<T> Response<T> {
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Converts the parsed value, keeping status, headers, body and latency.
    ///
    /// ```
    /// # use fetchwire::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let ids = Response::new(
    ///     vec![3, 1, 2],
    ///     "[3,1,2]".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::ZERO,
    /// );
    ///
    /// let count = ids.map(|ids| ids.len());
    /// assert_eq!(count.data, 3);
    /// assert_eq!(count.raw_body, "[3,1,2]");
    /// ```
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        let Response {
            data,
            raw_body,
            status,
            headers,
            latency,
        } = self;
        Response::new(f(data), raw_body, status, headers, latency)
    }

    /// Drops the metadata.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Looks up a response header. Non-UTF-8 values read as absent.
    ///
    /// ```
    /// # use fetchwire::Response;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("etag", HeaderValue::from_static("\"v7\""));
    ///
    /// let response = Response::new((), String::new(), StatusCode::OK, headers, Duration::ZERO);
    /// assert_eq!(response.header("ETag"), Some("\"v7\""));
    /// assert_eq!(response.header("content-type"), None);
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}
