use std::time::Duration;

use thiserror::Error;

use crate::auth::keys::KeyPaths;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be an integer in 1..={max}, got {value:?}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        max: i64,
    },
}

/// Upper bound for token lifetimes, well inside what timestamps can represent.
pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 86_400;
const MAX_STORE_TIMEOUT_MS: i64 = 10 * 60 * 1_000;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String,

    pub mongodb_uri: Option<String>,
    pub db_name: String,

    pub token_issuer: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub store_timeout: Duration,

    pub keys: KeyPaths,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let or = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let bounded = |name: &'static str, default: i64, max: i64| -> Result<i64, ConfigError> {
            match var(name) {
                None => Ok(default),
                Some(value) => match value.trim().parse::<i64>() {
                    Ok(n) if (1..=max).contains(&n) => Ok(n),
                    _ => Err(ConfigError::InvalidNumber { name, value, max }),
                },
            }
        };

        let store_timeout_ms = bounded("STORE_TIMEOUT_MS", 3_000, MAX_STORE_TIMEOUT_MS)?;

        Ok(Self {
            bind_addr: or("BIND_ADDR", "127.0.0.1:3000"),
            mongodb_uri: var("MONGODB_URI").filter(|s| !s.trim().is_empty()),
            db_name: or("DB_NAME", "auth_db"),
            token_issuer: or("TOKEN_ISSUER", "cleanarch.service"),
            access_ttl_seconds: bounded("ACCESS_TOKEN_TTL_SECONDS", 10 * 60, MAX_TTL_SECONDS)?,
            refresh_ttl_seconds: bounded("REFRESH_TOKEN_TTL_SECONDS", 100 * 60, MAX_TTL_SECONDS)?,
            store_timeout: Duration::from_millis(store_timeout_ms as u64),
            keys: KeyPaths {
                access_private: or("ACCESS_PRIVATE_KEY_PATH", "./keys/auth-private.pem").into(),
                access_public: or("ACCESS_PUBLIC_KEY_PATH", "./keys/auth-public.pem").into(),
                refresh_private: or("REFRESH_PRIVATE_KEY_PATH", "./keys/auth-refresh-private.pem")
                    .into(),
                refresh_public: or("REFRESH_PUBLIC_KEY_PATH", "./keys/auth-refresh-public.pem")
                    .into(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_token_lifetimes() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.access_ttl_seconds, 600);
        assert_eq!(cfg.refresh_ttl_seconds, 6_000);
        assert_eq!(cfg.store_timeout, Duration::from_secs(3));
        assert_eq!(cfg.token_issuer, "cleanarch.service");
        assert!(cfg.mongodb_uri.is_none());
        assert_eq!(
            cfg.keys.refresh_public.to_str(),
            Some("./keys/auth-refresh-public.pem")
        );
    }

    #[test]
    fn overrides_are_read() {
        let cfg = Config::from_lookup(lookup(&[
            ("REFRESH_TOKEN_TTL_SECONDS", "36000"),
            ("MONGODB_URI", "mongodb://localhost:27017"),
            ("STORE_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(cfg.refresh_ttl_seconds, 36_000);
        assert_eq!(cfg.store_timeout, Duration::from_millis(250));
        assert_eq!(cfg.mongodb_uri.as_deref(), Some("mongodb://localhost:27017"));
    }

    #[test]
    fn rejects_non_positive_ttl() {
        let err = Config::from_lookup(lookup(&[("ACCESS_TOKEN_TTL_SECONDS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { name: "ACCESS_TOKEN_TTL_SECONDS", .. }
        ));

        assert!(Config::from_lookup(lookup(&[("STORE_TIMEOUT_MS", "soon")])).is_err());
    }

    #[test]
    fn rejects_ttl_beyond_representable_expiry() {
        let err = Config::from_lookup(lookup(&[("REFRESH_TOKEN_TTL_SECONDS", "10000000000000")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { name: "REFRESH_TOKEN_TTL_SECONDS", .. }
        ));

        let max = MAX_TTL_SECONDS.to_string();
        let cfg = Config::from_lookup(lookup(&[("ACCESS_TOKEN_TTL_SECONDS", max.as_str())])).unwrap();
        assert_eq!(cfg.access_ttl_seconds, MAX_TTL_SECONDS);

        let over = (MAX_TTL_SECONDS + 1).to_string();
        assert!(Config::from_lookup(lookup(&[("ACCESS_TOKEN_TTL_SECONDS", over.as_str())])).is_err());
    }
}
