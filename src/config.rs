use std::env;
use std::fmt;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_JWT_EXPIRATION_SECS: i64 = 60 * 60 * 24; // 24 hours

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the server runs on the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let jwt_expiration_secs =
            parse_or(&lookup, "JWT_EXPIRATION_SECS", DEFAULT_JWT_EXPIRATION_SECS)?;
        if jwt_expiration_secs <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRATION_SECS",
                value: jwt_expiration_secs.to_string(),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            server_port: parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            jwt_secret,
            jwt_expiration_secs,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
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

    #[test]
    fn test_config_defaults() {
        let env = vars(&[("JWT_SECRET", "test-secret")]);
        let config = Config::from_vars(|key| env.get(key).cloned()).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.jwt_expiration_secs, 86_400);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let env = vars(&[
            ("JWT_SECRET", "test-secret"),
            ("DATABASE_URL", "postgres://test"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("JWT_EXPIRATION_SECS", "600"),
            ("BCRYPT_COST", "4"),
        ]);
        let config = Config::from_vars(|key| env.get(key).cloned()).unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://test"));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.jwt_expiration_secs, 600);
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn test_config_requires_secret() {
        let env = vars(&[("SERVER_PORT", "3000")]);
        assert_eq!(
            Config::from_vars(|key| env.get(key).cloned()).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
    }

    #[test]
    fn test_config_rejects_bad_numbers() {
        let env = vars(&[("JWT_SECRET", "s"), ("SERVER_PORT", "eighty")]);
        assert!(matches!(
            Config::from_vars(|key| env.get(key).cloned()),
            Err(ConfigError::Invalid { key: "SERVER_PORT", .. })
        ));

        let env = vars(&[("JWT_SECRET", "s"), ("JWT_EXPIRATION_SECS", "0")]);
        assert!(Config::from_vars(|key| env.get(key).cloned()).is_err());
    }
}
