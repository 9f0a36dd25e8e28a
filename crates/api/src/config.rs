use axum::http::HeaderValue;

/// Where work items are stored.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    /// PostgreSQL via `DATABASE_URL`.
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    /// Process-local store; contents are lost on restart.
    Memory,
}

/// A configuration variable was missing or malformed.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },

    #[error("{var}='{value}' is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `STORAGE_BACKEND`      | `postgres`                 |
    /// | `DATABASE_URL`         | required for `postgres`    |
    /// | `DB_MAX_CONNECTIONS`   | `20`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_var(&lookup, "PORT", 3000u16)?;
        let request_timeout_secs = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;

        let raw_origins =
            lookup("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into());
        let cors_origins = raw_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let backend = lookup("STORAGE_BACKEND").unwrap_or_else(|| "postgres".into());
        let storage = match backend.as_str() {
            "postgres" => StorageConfig::Postgres {
                database_url: lookup("DATABASE_URL")
                    .ok_or(ConfigError::Missing { var: "DATABASE_URL" })?,
                max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS", 20u32)?,
            },
            "memory" => StorageConfig::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    var: "STORAGE_BACKEND",
                    value: other.to_string(),
                    reason: "expected 'postgres' or 'memory'".into(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            storage,
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn memory_backend_uses_defaults() {
        let config = load(&[("STORAGE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.cors_origins, ["http://localhost:5173"]);
        assert_eq!(config.storage, StorageConfig::Memory);
    }

    #[test]
    fn postgres_requires_database_url() {
        assert_eq!(
            load(&[]).unwrap_err(),
            ConfigError::Missing { var: "DATABASE_URL" }
        );

        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/tracklane"),
            ("DB_MAX_CONNECTIONS", "5"),
        ])
        .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Postgres {
                database_url: "postgres://localhost/tracklane".into(),
                max_connections: 5,
            }
        );
    }

    #[test]
    fn bad_port_is_reported() {
        let err = load(&[("STORAGE_BACKEND", "memory"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn unknown_backend_is_reported() {
        let err = load(&[("STORAGE_BACKEND", "mongo")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "STORAGE_BACKEND", .. }));
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = load(&[
            ("STORAGE_BACKEND", "memory"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,,"),
        ])
        .unwrap();
        assert_eq!(config.cors_origins, ["http://a.test", "http://b.test"]);
    }
}
