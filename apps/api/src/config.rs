//! API server configuration.
//!
//! Settings are layered, later layers winning:
//!
//! ```text
//! built-in defaults ─► kestrel.toml (optional) ─► KESTREL_* environment
//! ```
//!
//! Environment keys use `__` between section and field, for example
//! `KESTREL_SERVER__PORT=8080` or `KESTREL_AUTH__JWT_SECRET=...`.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Secret used when none is configured. Refused outside debug builds.
pub const DEV_JWT_SECRET: &str = "kestrel-dev-secret-change-in-production";

/// Default token lifetime: 30 days.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 30 * 24 * 60 * 60;

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: IpAddr,

    /// HTTP port
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path
    pub path: PathBuf,

    /// Pool size
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub token_lifetime_secs: i64,
}

impl ApiConfig {
    /// Load configuration from `kestrel.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("kestrel").required(false))
            .add_source(
                Environment::with_prefix("KESTREL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::from_builder(builder)
    }

    /// Applies defaults under the given sources, then validates.
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: ApiConfig = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000_i64)?
            .set_default("database.path", "kestrel.db")?
            .set_default("database.max_connections", 8_i64)?
            .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
            .set_default("auth.token_lifetime_secs", DEFAULT_TOKEN_LIFETIME_SECS)?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults only.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_builder(Config::builder())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()));
        }
        if self.auth.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("auth.token_lifetime_secs".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".to_string()));
        }
        if !cfg!(debug_assertions) && self.auth.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()));
        }
        Ok(())
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::defaults().unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.path, PathBuf::from("kestrel.db"));
        assert_eq!(config.auth.token_lifetime_secs, DEFAULT_TOKEN_LIFETIME_SECS);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let builder = Config::builder().add_source(File::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [auth]
            jwt_secret = "from-file"
            "#,
            FileFormat::Toml,
        ));

        let config = ApiConfig::from_builder(builder).unwrap();
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.auth.jwt_secret, "from-file");
        assert_eq!(config.database.max_connections, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let builder = Config::builder().add_source(File::from_str(
            "[auth]\ntoken_lifetime_secs = 0\n",
            FileFormat::Toml,
        ));
        assert!(matches!(
            ApiConfig::from_builder(builder),
            Err(ConfigError::InvalidValue(_))
        ));

        let builder = Config::builder().add_source(File::from_str(
            "[auth]\njwt_secret = \"  \"\n",
            FileFormat::Toml,
        ));
        assert!(matches!(
            ApiConfig::from_builder(builder),
            Err(ConfigError::MissingRequired(_))
        ));
    }
}
