//! Client configuration and its override rules.
//!
//! A [`Client`](crate::Client) owns one [`ConfigStore`] holding the shared
//! [`Config`]. It changes only through [`ConfigStore::configure`], which
//! shallow-merges a [`ConfigOverrides`], and is read through
//! [`ConfigStore::snapshot`], which hands out an independent copy. Each call
//! can carry its own `ConfigOverrides`; those are merged onto a snapshot and
//! never written back.

use crate::token::{EnvStore, StoreTokenResolver, TokenResolver};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Storage key the default configuration looks the token up under.
pub const DEFAULT_TOKEN_KEY: &str = "access_token";

/// Scheme placed before the token in the `authorization` header.
pub const DEFAULT_TOKEN_PREFIX: &str = "Bearer";

/// Value of the login-method header in the default configuration.
pub const DEFAULT_LOGIN_METHOD: &str = "jwt";

/// Name of the header carrying the login-method tag.
pub const LOGIN_METHOD_HEADER: &str = "x-login-method";

/// A complete configuration. Every field always has a value.
#[derive(Clone)]
pub struct Config {
    /// Key handed to the token resolver.
    pub token_key: String,
    /// Prefix for the `authorization` header. Empty sends the bare token.
    pub token_prefix: String,
    /// Login-method tag. Empty omits the header.
    pub login_method: String,
    /// Looks the token up from `token_key`.
    pub token_resolver: Arc<dyn TokenResolver>,
    /// Prepended verbatim to every path. Empty uses paths as given.
    pub base_address: String,
}

impl Config {
    /// Returns a copy of this configuration with `overrides` applied.
    ///
    /// Fields set in `overrides` win; the others keep their current value.
    ///
    /// # Examples
    ///
    /// ```
    /// use fetchwire::{Config, ConfigOverrides};
    ///
    /// let base = Config::default();
    /// let merged = base.merged(&ConfigOverrides::new().token_prefix("Token"));
    ///
    /// assert_eq!(merged.token_prefix, "Token");
    /// assert_eq!(merged.token_key, base.token_key);
    /// assert_eq!(base.token_prefix, "Bearer");
    /// ```
    pub fn merged(&self, overrides: &ConfigOverrides) -> Config {
        let mut config = self.clone();
        overrides.apply_to(&mut config);
        config
    }

    /// Resolves the token for this configuration's `token_key`.
    pub fn resolve_token(&self) -> Option<String> {
        self.token_resolver.resolve(&self.token_key)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            token_prefix: DEFAULT_TOKEN_PREFIX.to_string(),
            login_method: DEFAULT_LOGIN_METHOD.to_string(),
            token_resolver: Arc::new(StoreTokenResolver::new(EnvStore::new())),
            base_address: String::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token_key", &self.token_key)
            .field("token_prefix", &self.token_prefix)
            .field("login_method", &self.login_method)
            .field("base_address", &self.base_address)
            .finish_non_exhaustive()
    }
}

/// A partial configuration: every field is optional.
///
/// Used both for [`ConfigStore::configure`] and as per-call overrides.
#[derive(Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces [`Config::token_key`] when set.
    pub token_key: Option<String>,
    /// Replaces [`Config::token_prefix`] when set.
    pub token_prefix: Option<String>,
    /// Replaces [`Config::login_method`] when set.
    pub login_method: Option<String>,
    /// Replaces [`Config::token_resolver`] when set.
    pub token_resolver: Option<Arc<dyn TokenResolver>>,
    /// Replaces [`Config::base_address`] when set.
    pub base_address: Option<String>,
}

impl ConfigOverrides {
    /// Creates an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage key the token is looked up under.
    pub fn token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = Some(key.into());
        self
    }

    /// Sets the `authorization` prefix; empty sends the bare token.
    pub fn token_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.token_prefix = Some(prefix.into());
        self
    }

    /// Sets the login-method tag; empty omits the header.
    pub fn login_method(mut self, tag: impl Into<String>) -> Self {
        self.login_method = Some(tag.into());
        self
    }

    /// Replaces the token resolver.
    pub fn token_resolver(mut self, resolver: impl TokenResolver + 'static) -> Self {
        self.token_resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets the address prepended to every path.
    pub fn base_address(mut self, address: impl Into<String>) -> Self {
        self.base_address = Some(address.into());
        self
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.token_key.is_none()
            && self.token_prefix.is_none()
            && self.login_method.is_none()
            && self.token_resolver.is_none()
            && self.base_address.is_none()
    }

    fn apply_to(&self, config: &mut Config) {
        if let Some(key) = &self.token_key {
            config.token_key = key.clone();
        }
        if let Some(prefix) = &self.token_prefix {
            config.token_prefix = prefix.clone();
        }
        if let Some(tag) = &self.login_method {
            config.login_method = tag.clone();
        }
        if let Some(resolver) = &self.token_resolver {
            config.token_resolver = Arc::clone(resolver);
        }
        if let Some(address) = &self.base_address {
            config.base_address = address.clone();
        }
    }
}

impl fmt::Debug for ConfigOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOverrides")
            .field("token_key", &self.token_key)
            .field("token_prefix", &self.token_prefix)
            .field("login_method", &self.login_method)
            .field("token_resolver", &self.token_resolver.as_ref().map(|_| ".."))
            .field("base_address", &self.base_address)
            .finish()
    }
}

/// The shared, mutable configuration of one client.
///
/// Updates are not coordinated with requests in flight: a request that has
/// already taken its snapshot keeps it.
#[derive(Debug, Default)]
pub struct ConfigStore {
    current: RwLock<Config>,
}

impl ConfigStore {
    /// Creates a store holding `config`.
    pub fn new(config: Config) -> Self {
        Self {
            current: RwLock::new(config),
        }
    }

    /// Shallow-merges `overrides` into the shared configuration.
    ///
    /// The whole merge happens under one write lock, so readers see either
    /// none or all of it.
    pub fn configure(&self, overrides: ConfigOverrides) {
        let mut current = self.current.write();
        overrides.apply_to(&mut current);
        tracing::debug!(config = ?*current, "Configuration updated");
    }

    /// Returns an independent copy of the shared configuration.
    pub fn snapshot(&self) -> Config {
        self.current.read().clone()
    }

    /// Returns the shared configuration merged with per-call `overrides`.
    pub fn effective(&self, overrides: Option<&ConfigOverrides>) -> Config {
        let snapshot = self.snapshot();
        match overrides {
            Some(overrides) => snapshot.merged(overrides),
            None => snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = Config::default();
        assert_eq!(config.token_key, DEFAULT_TOKEN_KEY);
        assert_eq!(config.token_prefix, DEFAULT_TOKEN_PREFIX);
        assert_eq!(config.login_method, DEFAULT_LOGIN_METHOD);
        assert_eq!(config.base_address, "");
    }

    #[test]
    fn test_configure_shallow_merge() {
        let store = ConfigStore::default();
        store.configure(ConfigOverrides::new().base_address("https://api.test"));

        let config = store.snapshot();
        assert_eq!(config.base_address, "https://api.test");
        assert_eq!(config.token_key, DEFAULT_TOKEN_KEY);
        assert_eq!(config.token_prefix, DEFAULT_TOKEN_PREFIX);
        assert_eq!(config.login_method, DEFAULT_LOGIN_METHOD);

        store.configure(ConfigOverrides::new().token_prefix("").token_key("session"));
        let config = store.snapshot();
        assert_eq!(config.base_address, "https://api.test");
        assert_eq!(config.token_prefix, "");
        assert_eq!(config.token_key, "session");
    }

    #[test]
    fn test_later_configure_wins() {
        let store = ConfigStore::default();
        store.configure(ConfigOverrides::new().login_method("sso"));
        store.configure(ConfigOverrides::new().login_method("password"));
        assert_eq!(store.snapshot().login_method, "password");
    }

    #[test]
    fn test_empty_configure_changes_nothing() {
        let store = ConfigStore::default();
        store.configure(ConfigOverrides::new());
        let config = store.snapshot();
        assert_eq!(config.token_key, DEFAULT_TOKEN_KEY);
        assert!(ConfigOverrides::new().is_empty());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let store = ConfigStore::default();
        let mut copy = store.snapshot();
        copy.token_key = "changed".to_string();
        copy.base_address = "https://elsewhere".to_string();

        let config = store.snapshot();
        assert_eq!(config.token_key, DEFAULT_TOKEN_KEY);
        assert_eq!(config.base_address, "");
    }

    #[test]
    fn test_effective_does_not_touch_shared() {
        let store = ConfigStore::default();
        let overrides = ConfigOverrides::new()
            .token_key("other")
            .token_resolver(|_: &str| Some("override".to_string()));

        let effective = store.effective(Some(&overrides));
        assert_eq!(effective.token_key, "other");
        assert_eq!(effective.resolve_token(), Some("override".to_string()));

        let shared = store.effective(None);
        assert_eq!(shared.token_key, DEFAULT_TOKEN_KEY);
    }

    #[test]
    fn test_configure_is_not_torn_by_concurrent_snapshots() {
        let store = Arc::new(ConfigStore::default());

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..20_000 {
                    let value = format!("v{i}");
                    store.configure(
                        ConfigOverrides::new()
                            .token_key(value.clone())
                            .base_address(value),
                    );
                }
            })
        };

        let reader = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..20_000 {
                    let config = store.snapshot();
                    if config.token_key != DEFAULT_TOKEN_KEY || !config.base_address.is_empty() {
                        assert_eq!(config.token_key, config.base_address);
                    }
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();

        let config = store.snapshot();
        assert_eq!(config.token_key, "v19999");
        assert_eq!(config.base_address, "v19999");
    }

    #[test]
    fn test_resolver_override_through_configure() {
        let store = ConfigStore::default();
        store.configure(
            ConfigOverrides::new().token_resolver(|key: &str| Some(format!("token-for-{key}"))),
        );
        assert_eq!(
            store.snapshot().resolve_token(),
            Some(format!("token-for-{DEFAULT_TOKEN_KEY}"))
        );
    }
}
