//! Runtime configuration loaded from the environment.

use std::path::PathBuf;

use review_core::{SchedulerError, SchedulingPolicy};
use thiserror::Error;

/// Upper bound for a study session, matching what the settings API accepts.
pub const MAX_SESSION_SIZE: u32 = 100;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_CARDS_PER_SESSION: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read scheduling policy from {}: {source}", path.display())]
    PolicyFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse scheduling policy from {}: {source}", path.display())]
    PolicyParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Policy(#[from] SchedulerError),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    /// Session size used when neither the request nor the user's settings
    /// provide one.
    pub max_cards_per_session: u32,
    pub policy: SchedulingPolicy,
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let max_cards_per_session = match lookup("MAX_CARDS_PER_SESSION") {
            Some(raw) => parse_session_size(&raw)?,
            None => DEFAULT_CARDS_PER_SESSION,
        };

        let policy = match lookup("SCHEDULING_POLICY_FILE") {
            Some(path) => load_policy(PathBuf::from(path))?,
            None => SchedulingPolicy::default(),
        };
        policy.validate()?;

        Ok(Self {
            database_url,
            host,
            port,
            log_filter,
            max_cards_per_session,
            policy,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Session sizes are accepted in `1..=MAX_SESSION_SIZE`.
pub fn validate_session_size(size: u32) -> Result<u32, String> {
    if (1..=MAX_SESSION_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(format!("must be between 1 and {MAX_SESSION_SIZE}, got {size}"))
    }
}

fn parse_session_size(raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "MAX_CARDS_PER_SESSION",
        value: raw.to_string(),
        reason,
    };
    let size = raw.trim().parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    validate_session_size(size).map_err(invalid)
}

fn load_policy(path: PathBuf) -> Result<SchedulingPolicy, ConfigError> {
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(source) => return Err(ConfigError::PolicyFile { path, source }),
    };
    serde_json::from_str(&contents).map_err(|source| ConfigError::PolicyParse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/flashdeck")]))
                .unwrap();
        assert_eq!(config.database_url, "postgres://localhost/flashdeck");
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.max_cards_per_session, 10);
        assert_eq!(config.policy, SchedulingPolicy::default());
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
        assert_eq!(err.to_string(), "DATABASE_URL must be set");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/test"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("RUST_LOG", "debug"),
            ("MAX_CARDS_PER_SESSION", "25"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.max_cards_per_session, 25);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/test"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_session_size_bounds() {
        for bad in ["0", "101", "-3", "ten"] {
            let err = Config::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://db/test"),
                ("MAX_CARDS_PER_SESSION", bad),
            ]))
            .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid { key: "MAX_CARDS_PER_SESSION", .. }
            ));
        }
        assert_eq!(validate_session_size(100), Ok(100));
        assert_eq!(validate_session_size(1), Ok(1));
    }

    #[test]
    fn test_policy_file_missing() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/test"),
            ("SCHEDULING_POLICY_FILE", "/nonexistent/flashdeck/policy.json"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::PolicyFile { .. }));
    }

    #[test]
    fn test_policy_file_loaded_and_validated() {
        let dir = std::env::temp_dir();
        let good_path = dir.join(format!("flashdeck-policy-ok-{}.json", std::process::id()));
        std::fs::write(&good_path, r#"{ "max_ease": 3.0 }"#).unwrap();
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/test"),
            ("SCHEDULING_POLICY_FILE", good_path.to_str().unwrap()),
        ]))
        .unwrap();
        assert_eq!(config.policy.max_ease, Some(3.0));
        std::fs::remove_file(&good_path).ok();

        let bad_path = dir.join(format!("flashdeck-policy-bad-{}.json", std::process::id()));
        std::fs::write(&bad_path, r#"{ "ease_floor": 3.0 }"#).unwrap();
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/test"),
            ("SCHEDULING_POLICY_FILE", bad_path.to_str().unwrap()),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Policy(SchedulerError::InvalidPolicy(_))));
        std::fs::remove_file(&bad_path).ok();

        let junk_path = dir.join(format!("flashdeck-policy-junk-{}.json", std::process::id()));
        std::fs::write(&junk_path, "not json").unwrap();
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/test"),
            ("SCHEDULING_POLICY_FILE", junk_path.to_str().unwrap()),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::PolicyParse { .. }));
        std::fs::remove_file(&junk_path).ok();
    }
}
