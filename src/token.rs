//! Authentication token lookup.
//!
//! A [`TokenResolver`] turns a storage key into a token, or `None` when
//! nothing is stored. The default resolver, [`StoreTokenResolver`], reads
//! from any [`KeyValueStore`] and strips the single pair of double quotes
//! that JSON-encoding writers tend to leave around stored strings.
//!
//! This crate only ever reads tokens. Writing them is the job of whatever
//! signs the user in.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves an authentication token from a storage key.
///
/// Returning `None` means "no token", which is a valid state and never an
/// error. Implementations must be synchronous and free of network access.
///
/// Any `Fn(&str) -> Option<String>` is a resolver:
///
/// ```
/// use fetchwire::TokenResolver;
///
/// let resolver = |key: &str| (key == "session").then(|| "abc".to_string());
/// assert_eq!(resolver.resolve("session"), Some("abc".to_string()));
/// assert_eq!(resolver.resolve("other"), None);
/// ```
pub trait TokenResolver: Send + Sync {
    /// Looks up the token stored under `key`.
    fn resolve(&self, key: &str) -> Option<String>;
}

impl<F> TokenResolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn resolve(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// A read-only view of a persistent key/value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Removes exactly one leading and one trailing `"` when both are present.
///
/// # Examples
///
/// ```
/// use fetchwire::strip_wrapping_quotes;
///
/// assert_eq!(strip_wrapping_quotes("\"abc123\""), "abc123");
/// assert_eq!(strip_wrapping_quotes("abc123"), "abc123");
/// assert_eq!(strip_wrapping_quotes("\"\"abc\"\""), "\"abc\"");
/// assert_eq!(strip_wrapping_quotes("\"abc"), "\"abc");
/// ```
pub fn strip_wrapping_quotes(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(raw)
}

/// The default resolver: reads a [`KeyValueStore`] and unwraps quoted values.
#[derive(Clone)]
pub struct StoreTokenResolver<S> {
    store: S,
}

impl<S: KeyValueStore> StoreTokenResolver<S> {
    /// Creates a resolver backed by `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> TokenResolver for StoreTokenResolver<S> {
    fn resolve(&self, key: &str) -> Option<String> {
        let Some(raw) = self.store.get(key) else {
            tracing::debug!(key = key, "No token stored");
            return None;
        };

        tracing::debug!(key = key, "Resolved token from store");
        Some(strip_wrapping_quotes(&raw).to_string())
    }
}

impl<S> fmt::Debug for StoreTokenResolver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreTokenResolver").finish_non_exhaustive()
    }
}

/// An in-process store, mostly useful for tests and for applications that
/// keep the session token in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }

    /// Removes the value stored under `key`.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().remove(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }
}

/// A JSON object file on disk, e.g. `{"access_token": "\"abc\""}`.
///
/// The file is read on every lookup so that tokens written by another
/// process are picked up. Anything that prevents reading a string value
/// resolves to `None`.
///
/// Lookups are blocking file reads. Resolvers are synchronous, so inside
/// [`Client::call`](crate::Client::call) the read happens on the task that
/// builds the request. Keep the file small, or use [`MemoryStore`] on hot
/// paths.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store reading from `path`. The file does not need to exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "Token file not readable");
                return None;
            }
        };

        let entries: serde_json::Map<String, serde_json::Value> =
            match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "Token file is not a JSON object");
                    return None;
                }
            };

        match entries.get(key)? {
            serde_json::Value::String(value) => Some(value.clone()),
            _ => {
                tracing::warn!(path = %self.path.display(), key = key, "Token entry is not a string");
                None
            }
        }
    }
}

/// The process environment as a key/value store.
///
/// With a prefix, key `access_token` and prefix `MYAPP_` look up the
/// variable `MYAPP_access_token`.
#[derive(Debug, Clone, Default)]
pub struct EnvStore {
    prefix: String,
}

impl EnvStore {
    /// Creates a store reading variables by their exact key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that prepends `prefix` to every key.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl KeyValueStore for EnvStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{}", self.prefix, key)).ok()
    }
}
