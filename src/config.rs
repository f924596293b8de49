use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(&'static str),

    #[error("Environment variable '{key}' has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub upload_dir: PathBuf,
    pub max_resume_bytes: usize,
    pub bcrypt_cost: u32,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bcrypt_cost = parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let token_ttl_days = parse_or(&get, "TOKEN_TTL_DAYS", DEFAULT_TOKEN_TTL_DAYS)?;
        if token_ttl_days <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_DAYS",
                value: token_ttl_days.to_string(),
            });
        }

        Ok(Config {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 3000)?,
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            token_ttl_days,
            upload_dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
            max_resume_bytes: parse_or(&get, "MAX_RESUME_BYTES", DEFAULT_MAX_RESUME_BYTES)?,
            bcrypt_cost,
            allowed_origins: get("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mongodb://localhost:27017/job_board"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.token_ttl_days, 7);
        assert_eq!(config.max_resume_bytes, 5 * 1024 * 1024);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn requires_secret_and_database() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "x")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "mongodb://db")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mongodb://db"),
            ("JWT_SECRET", "x"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mongodb://db"),
            ("JWT_SECRET", "x"),
            ("BCRYPT_COST", "2"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BCRYPT_COST", .. }));
    }

    #[test]
    fn splits_origins() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mongodb://db"),
            ("JWT_SECRET", "x"),
            ("ALLOWED_ORIGINS", "http://localhost:5173, https://jobs.example.com,"),
        ]))
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:5173", "https://jobs.example.com"]
        );
    }
}
