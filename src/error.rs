//! Error types for HTTP API calls.
//!
//! Failures are split by where they happen: the transport ([`Error::Transport`]),
//! the HTTP protocol ([`Error::Protocol`]), or parsing the body of a successful
//! response ([`Error::Serialization`]). Nothing in this crate retries or
//! translates them; each one reaches the caller as-is.

use http::{HeaderMap, StatusCode};

/// The main error type for HTTP API calls.
///
/// # Examples
///
/// ```no_run
/// use fetchwire::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_address("https://api.example.com")
///     .build()?;
///
/// match client.read::<serde_json::Value>("/endpoint", ()).await {
///     Ok(response) => println!("Success: {:?}", response.data),
///     Err(Error::Protocol { status, message, .. }) => {
///         eprintln!("HTTP error {}: {}", status, message);
///     }
///     Err(Error::Serialization { raw_response, source, .. }) => {
///         eprintln!("Failed to parse {}: {}", raw_response, source);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error from the underlying HTTP transport.
    ///
    /// Connection failures, DNS failures and (when the opt-in timeout is
    /// enabled) timeouts all land here, exactly as `reqwest` reported them.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    ///
    /// `message` is the status reason phrase, or a fallback naming the verb
    /// and URL when the status has none. The response body is never read on
    /// this path.
    #[error("{message}")]
    Protocol {
        /// The HTTP status code
        status: StatusCode,
        /// The reason phrase or fallback description
        message: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// A 2xx response whose body is not valid JSON for the expected type.
    #[error("Failed to parse response (status {status}): {source}")]
    Serialization {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body that failed to parse
        raw_response: String,
        /// The parser error
        #[source]
        source: serde_json::Error,
    },

    /// The request could not be put on the wire.
    ///
    /// Raised for header names or values that are not valid HTTP, and for
    /// payloads whose `Serialize` implementation fails.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The composed URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the HTTP status code if this error has one.
    ///
    /// # Examples
    ///
    /// ```
    /// use fetchwire::Error;
    /// use http::{HeaderMap, StatusCode};
    ///
    /// let err = Error::Protocol {
    ///     status: StatusCode::NOT_FOUND,
    ///     message: "Not Found".to_string(),
    ///     headers: HeaderMap::new(),
    /// };
    ///
    /// assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    /// assert!(err.is_protocol());
    /// ```
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Protocol { status, .. } => Some(*status),
            Error::Serialization { status, .. } => Some(*status),
            Error::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Returns `true` for network-level failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Returns `true` for non-2xx responses.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol { .. })
    }

    /// Returns `true` when a successful response could not be parsed.
    pub fn is_serialization(&self) -> bool {
        matches!(self, Error::Serialization { .. })
    }

    /// Returns the raw response body if this error kept one.
    ///
    /// Only [`Error::Serialization`] carries a body; protocol failures never
    /// read it.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Serialization { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for HTTP API calls.
pub type Result<T> = std::result::Result<T, Error>;
