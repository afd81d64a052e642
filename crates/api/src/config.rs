//! Process configuration, read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `JWT_SECRET` | insecure dev secret (with a warning) |
//! | `DATABASE_URL` | unset: in-memory membership store |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `DB_ACQUIRE_TIMEOUT_MS` | `2000` |
//! | `BOOTSTRAP_OWNER` | unset |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use talentdesk_auth::PrincipalId;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 2_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

impl ConfigError {
    fn invalid(name: &'static str, message: impl ToString) -> Self {
        ConfigError::Invalid { name, message: message.to_string() }
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    /// Granted an org-wide `owner` membership at startup.
    pub bootstrap_owner: Option<PrincipalId>,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout", &self.db_acquire_timeout)
            .field("bootstrap_owner", &self.bootstrap_owner)
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e))?;

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().map_err(|e| ConfigError::invalid("DB_MAX_CONNECTIONS", e))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let acquire_ms = match var("DB_ACQUIRE_TIMEOUT_MS") {
            Some(v) => v.parse().map_err(|e| ConfigError::invalid("DB_ACQUIRE_TIMEOUT_MS", e))?,
            None => DEFAULT_ACQUIRE_TIMEOUT_MS,
        };

        let bootstrap_owner = var("BOOTSTRAP_OWNER")
            .map(|v| v.parse::<PrincipalId>())
            .transpose()
            .map_err(|e| ConfigError::invalid("BOOTSTRAP_OWNER", e))?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url: var("DATABASE_URL"),
            db_max_connections,
            db_acquire_timeout: Duration::from_millis(acquire_ms),
            bootstrap_owner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(c.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(c.database_url, None);
        assert_eq!(c.db_max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(c.bootstrap_owner, None);
    }

    #[test]
    fn reads_values_and_treats_blank_as_unset() {
        let owner = PrincipalId::new();
        let owner_str = owner.to_string();
        let c = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "   "),
            ("DB_MAX_CONNECTIONS", "3"),
            ("BOOTSTRAP_OWNER", &owner_str),
        ])
        .unwrap();

        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.jwt_secret, "s3cret");
        assert_eq!(c.database_url, None);
        assert_eq!(c.db_max_connections, 3);
        assert_eq!(c.bootstrap_owner, Some(owner));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            config(&[("BOOTSTRAP_OWNER", "not-a-uuid")]),
            Err(ConfigError::Invalid { name: "BOOTSTRAP_OWNER", .. })
        ));
        assert!(config(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(config(&[("DB_MAX_CONNECTIONS", "-1")]).is_err());
    }
}
