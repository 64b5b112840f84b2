//! Connection parameters read from the function's environment.
//!
//! Missing variables fail config construction up front, so a
//! misconfigured function dies on startup instead of on its first query.

use std::fmt;
use std::str::FromStr;

use crate::error::ProbeError;

pub const DEFAULT_POSTGRES_PORT: u16 = 5432;
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// How the connection to the store is secured.
///
/// `VerifiedTls` is the default; certificate validation is only disabled
/// when the caller explicitly opts into `InsecureTls` (for example against
/// an RDS instance presenting a self-signed certificate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportSecurity {
    None,
    InsecureTls,
    #[default]
    VerifiedTls,
}

impl FromStr for TransportSecurity {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "insecure-tls" => Ok(Self::InsecureTls),
            "verified-tls" => Ok(Self::VerifiedTls),
            other => Err(ProbeError::Connection(format!(
                "unknown transport security mode {other:?} (expected none, insecure-tls or verified-tls)"
            ))),
        }
    }
}

impl fmt::Display for TransportSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::InsecureTls => "insecure-tls",
            Self::VerifiedTls => "verified-tls",
        })
    }
}

/// Everything needed to open one connection to a store.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub transport: TransportSecurity,
}

impl ConnectionConfig {
    /// Reads the relational store configuration from the process
    /// environment: `DB_HOST` (or `RDS_ENDPOINT`), `DB_PORT`, `DB_USER`,
    /// `DB_DATABASE`, `DB_PASSWORD` and `DB_TLS_MODE`.
    pub fn postgres_from_env() -> Result<Self, ProbeError> {
        Self::postgres_from(|key| std::env::var(key).ok())
    }

    /// Like [`postgres_from_env`](Self::postgres_from_env) but with an
    /// injected variable lookup.
    pub fn postgres_from<F>(var: F) -> Result<Self, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("DB_HOST")
            .or_else(|| var("RDS_ENDPOINT"))
            .ok_or_else(|| missing("DB_HOST"))?;
        let port = parse_port(var("DB_PORT"), "DB_PORT", DEFAULT_POSTGRES_PORT)?;
        let username = var("DB_USER").ok_or_else(|| missing("DB_USER"))?;
        let password = var("DB_PASSWORD").ok_or_else(|| missing("DB_PASSWORD"))?;
        let database = var("DB_DATABASE");
        let transport = match var("DB_TLS_MODE") {
            Some(mode) => mode.parse()?,
            None => TransportSecurity::default(),
        };

        Ok(Self {
            host,
            port,
            database,
            username: Some(username),
            password: Some(password),
            transport,
        })
    }

    /// Reads the key-value store configuration from the process
    /// environment: `REDIS_HOST` and `REDIS_PORT`. ElastiCache in this
    /// setup takes no credentials and no TLS.
    pub fn redis_from_env() -> Result<Self, ProbeError> {
        Self::redis_from(|key| std::env::var(key).ok())
    }

    /// Like [`redis_from_env`](Self::redis_from_env) but with an injected
    /// variable lookup.
    pub fn redis_from<F>(var: F) -> Result<Self, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("REDIS_HOST").ok_or_else(|| missing("REDIS_HOST"))?;
        let port = parse_port(var("REDIS_PORT"), "REDIS_PORT", DEFAULT_REDIS_PORT)?;

        Ok(Self {
            host,
            port,
            database: None,
            username: None,
            password: None,
            transport: TransportSecurity::None,
        })
    }

    /// Renders the libpq-style conninfo string used by `tokio_postgres`.
    pub fn conninfo(&self) -> String {
        let mut parts = vec![format!("host={}", self.host), format!("port={}", self.port)];
        if let Some(user) = &self.username {
            parts.push(format!("user={user}"));
        }
        if let Some(password) = &self.password {
            parts.push(format!("password={password}"));
        }
        if let Some(database) = &self.database {
            parts.push(format!("dbname={database}"));
        }
        parts.push(match self.transport {
            TransportSecurity::None => "sslmode=disable".to_string(),
            _ => "sslmode=require".to_string(),
        });
        parts.join(" ")
    }

    /// Renders the `redis://` URL for the key-value store.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

fn missing(key: &str) -> ProbeError {
    ProbeError::Connection(format!("environment variable {key} is not set"))
}

fn parse_port(value: Option<String>, key: &str, default: u16) -> Result<u16, ProbeError> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| ProbeError::Connection(format!("{key} is not a valid port: {raw:?}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn lookup(map: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
        move |key| map.get(key).cloned()
    }

    #[test]
    fn postgres_config_reads_all_fields() {
        let env = vars(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "5433"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_DATABASE", "appdb"),
            ("DB_TLS_MODE", "insecure-tls"),
        ]);
        let config = ConnectionConfig::postgres_from(lookup(&env)).unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 5433);
        assert_eq!(config.username.as_deref(), Some("app"));
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.database.as_deref(), Some("appdb"));
        assert_eq!(config.transport, TransportSecurity::InsecureTls);
    }

    #[test]
    fn postgres_config_falls_back_to_rds_endpoint() {
        let env = vars(&[
            ("RDS_ENDPOINT", "cluster.rds.amazonaws.com"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "hunter2"),
        ]);
        let config = ConnectionConfig::postgres_from(lookup(&env)).unwrap();
        assert_eq!(config.host, "cluster.rds.amazonaws.com");
        assert_eq!(config.port, DEFAULT_POSTGRES_PORT);
        assert_eq!(config.database, None);
        assert_eq!(config.transport, TransportSecurity::VerifiedTls);
    }

    #[test]
    fn postgres_config_requires_credentials() {
        let env = vars(&[("DB_HOST", "db.internal"), ("DB_USER", "app")]);
        let err = ConnectionConfig::postgres_from(lookup(&env)).unwrap_err();
        assert!(err.to_string().contains("DB_PASSWORD"));
    }

    #[test]
    fn postgres_config_rejects_bad_port() {
        let env = vars(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "not-a-port"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "hunter2"),
        ]);
        assert!(ConnectionConfig::postgres_from(lookup(&env)).is_err());
    }

    #[test]
    fn postgres_config_rejects_unknown_tls_mode() {
        let env = vars(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_TLS_MODE", "yolo"),
        ]);
        let err = ConnectionConfig::postgres_from(lookup(&env)).unwrap_err();
        assert!(err.to_string().contains("yolo"));
    }

    #[test]
    fn redis_config_defaults_port() {
        let env = vars(&[("REDIS_HOST", "cache.internal")]);
        let config = ConnectionConfig::redis_from(lookup(&env)).unwrap();
        assert_eq!(config.port, DEFAULT_REDIS_PORT);
        assert_eq!(config.transport, TransportSecurity::None);
        assert_eq!(config.redis_url(), "redis://cache.internal:6379/");
    }

    #[test]
    fn redis_config_requires_host() {
        let env = vars(&[]);
        assert!(ConnectionConfig::redis_from(lookup(&env)).is_err());
    }

    #[test]
    fn conninfo_includes_all_populated_fields() {
        let env = vars(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_DATABASE", "appdb"),
        ]);
        let config = ConnectionConfig::postgres_from(lookup(&env)).unwrap();
        assert_eq!(
            config.conninfo(),
            "host=db.internal port=5432 user=app password=hunter2 dbname=appdb sslmode=require"
        );
    }

    #[test]
    fn conninfo_disables_ssl_when_transport_is_none() {
        let env = vars(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_TLS_MODE", "none"),
        ]);
        let config = ConnectionConfig::postgres_from(lookup(&env)).unwrap();
        assert!(config.conninfo().ends_with("sslmode=disable"));
    }

    #[test]
    fn transport_security_round_trips() {
        for mode in [
            TransportSecurity::None,
            TransportSecurity::InsecureTls,
            TransportSecurity::VerifiedTls,
        ] {
            assert_eq!(mode.to_string().parse::<TransportSecurity>().unwrap(), mode);
        }
    }

    #[test]
    fn transport_security_defaults_to_verified() {
        assert_eq!(TransportSecurity::default(), TransportSecurity::VerifiedTls);
    }
}
