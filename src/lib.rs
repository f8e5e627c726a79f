//! # Fetchwire - a configurable JSON-over-HTTP client
//!
//! Fetchwire turns a description of a call (verb, path, payload, headers) into
//! a fully formed HTTP request, sends it with `reqwest`, and parses the JSON
//! answer. It takes care of three things callers should not have to repeat:
//!
//! - **Layered configuration**: one shared [`Config`] per [`Client`], changed
//!   with [`Client::configure`], plus per-call [`ConfigOverrides`] that never
//!   leak into the shared state.
//! - **Authorization**: a pluggable [`TokenResolver`] looks the token up by
//!   key; the client composes `authorization` and `x-login-method` headers.
//! - **Payload placement**: `read` encodes object payloads into the query
//!   string, `create`, `replace` and `remove` send them as a JSON body.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fetchwire::{Client, ConfigOverrides};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fetchwire::Error> {
//!     let client = Client::builder().build()?;
//!     client.configure(ConfigOverrides::new().base_address("https://api.example.com"));
//!
//!     // GET https://api.example.com/users?page=1
//!     let users = client.read::<Vec<User>>("/users", json!({"page": 1})).await?;
//!     for user in users.iter() {
//!         println!("{}: {}", user.id, user.name);
//!     }
//!
//!     // POST with a JSON body
//!     let created = client
//!         .create::<User>("/users", json!({"name": "Alice"}))
//!         .await?;
//!     println!("Created user with ID: {}", created.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Tokens
//!
//! By default the token is read from the environment variable named by the
//! token key (`access_token`). Any store or closure can replace it:
//!
//! ```no_run
//! use fetchwire::{Client, FileStore, StoreTokenResolver};
//!
//! # fn example() -> Result<(), fetchwire::Error> {
//! let client = Client::builder()
//!     .token_resolver(StoreTokenResolver::new(FileStore::new("/var/lib/myapp/session.json")))
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Failures are classified, never retried:
//!
//! ```no_run
//! use fetchwire::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().base_address("https://api.example.com").build()?;
//! match client.read::<serde_json::Value>("/endpoint", ()).await {
//!     Ok(response) => println!("Success: {:?}", response.data),
//!     Err(Error::Protocol { status, message, .. }) => eprintln!("{}: {}", status, message),
//!     Err(Error::Serialization { raw_response, .. }) => eprintln!("Bad JSON: {}", raw_response),
//!     Err(Error::Transport(e)) => eprintln!("Network: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;
pub mod request;
mod response;
pub mod token;

pub use client::{CallOptions, Client, ClientBuilder};
pub use config::{Config, ConfigOverrides, ConfigStore};
pub use error::{Error, Result};
pub use request::{build_request, encode_query, PayloadPlacement, Request, RequestDescriptor, Verb};
pub use response::Response;
pub use token::{
    strip_wrapping_quotes, EnvStore, FileStore, KeyValueStore, MemoryStore, StoreTokenResolver,
    TokenResolver,
};
