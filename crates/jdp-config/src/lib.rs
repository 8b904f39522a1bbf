// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-config
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric variable did not parse.
    #[error("invalid value for {var}: '{value}'")]
    InvalidNumber {
        /// Variable name.
        var: String,
        /// Offending value.
        value: String,
    },

    /// A validation rule failed.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Broker connection and consumption settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Bootstrap server list.
    pub bootstrap_servers: String,
    /// Consumer group id.
    pub consumer_group: String,
    /// Poll timeout per loop iteration.
    pub poll_timeout: Duration,
    /// Worker thread count per source (one consumer each).
    pub consumer_concurrency: usize,
}

/// Topic layout: one request topic per source, one result topic, one
/// fail topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    /// TEXT request topic.
    pub text_request: String,
    /// IMAGE/OCR request topic.
    pub ocr_request: String,
    /// URL request topic.
    pub url_request: String,
    /// Success event topic.
    pub result: String,
    /// Fail event topic.
    pub fail: String,
}

/// Worker lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Grace period for in-flight messages at shutdown.
    pub shutdown_timeout: Duration,
    /// Retry-budget hint forwarded to downstream consumers.
    pub max_retries: u32,
}

/// Full service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Broker settings.
    pub broker: BrokerConfig,
    /// Topic layout.
    pub topics: TopicConfig,
    /// Worker lifecycle settings.
    pub worker: WorkerConfig,
    /// Directory for the date-stamped fail backup files.
    pub fail_backup_dir: PathBuf,
    /// Override directory for the keyword policy files; embedded
    /// defaults are used when unset.
    pub keyword_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Read configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |var: &str, default: &str| -> String {
            vars.get(var)
                .map(String::as_str)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default)
                .to_string()
        };

        let poll_timeout_sec: f64 = parse_number(vars, "KAFKA_POLL_TIMEOUT_SEC", "1.0")?;
        let consumer_concurrency: usize = parse_number(vars, "KAFKA_CONSUMER_CONCURRENCY", "3")?;
        let shutdown_timeout_sec: u64 = parse_number(vars, "SHUTDOWN_TIMEOUT_SEC", "30")?;
        let max_retries: u32 = parse_number(vars, "MAX_RETRIES", "3")?;

        let config = Self {
            broker: BrokerConfig {
                bootstrap_servers: get("KAFKA_BOOTSTRAP_SERVERS", "127.0.0.1:19092"),
                consumer_group: get("KAFKA_CONSUMER_GROUP", "preprocess-group"),
                poll_timeout: Duration::from_secs_f64(poll_timeout_sec),
                consumer_concurrency,
            },
            topics: TopicConfig {
                text_request: get("KAFKA_TEXT_TOPIC", "jd.preprocess.text.request"),
                ocr_request: get("KAFKA_OCR_TOPIC", "jd.preprocess.ocr.request"),
                url_request: get("KAFKA_URL_TOPIC", "jd.preprocess.url.request"),
                result: get("KAFKA_RESULT_TOPIC", "jd.preprocess.response"),
                fail: get("KAFKA_FAIL_TOPIC", "jd.preprocess.response.fail"),
            },
            worker: WorkerConfig {
                shutdown_timeout: Duration::from_secs(shutdown_timeout_sec),
                max_retries,
            },
            fail_backup_dir: PathBuf::from(get("FAIL_BACKUP_DIR", "logs/fail_backup")),
            keyword_dir: vars
                .get("KEYWORD_CONFIG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.broker.consumer_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "KAFKA_CONSUMER_CONCURRENCY must be at least 1".into(),
            ));
        }
        if self.broker.poll_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "KAFKA_POLL_TIMEOUT_SEC must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    var: &str,
    default: &str,
) -> Result<T, ConfigError> {
    let raw = vars
        .get(var)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default);
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var: var.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_with_empty_environment() {
        let config = ServiceConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.topics.text_request, "jd.preprocess.text.request");
        assert_eq!(config.topics.fail, "jd.preprocess.response.fail");
        assert_eq!(config.broker.consumer_group, "preprocess-group");
        assert_eq!(config.broker.poll_timeout, Duration::from_secs(1));
        assert_eq!(config.worker.shutdown_timeout, Duration::from_secs(30));
        assert!(config.keyword_dir.is_none());
    }

    #[test]
    fn overrides_win() {
        let vars: HashMap<String, String> = [
            ("KAFKA_TEXT_TOPIC", "custom.text"),
            ("KAFKA_POLL_TIMEOUT_SEC", "0.5"),
            ("SHUTDOWN_TIMEOUT_SEC", "5"),
            ("KEYWORD_CONFIG_DIR", "/etc/jd/keywords"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let config = ServiceConfig::from_vars(&vars).unwrap();
        assert_eq!(config.topics.text_request, "custom.text");
        assert_eq!(config.broker.poll_timeout, Duration::from_millis(500));
        assert_eq!(config.worker.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.keyword_dir.as_deref(), Some(std::path::Path::new("/etc/jd/keywords")));
    }

    #[test]
    fn malformed_numbers_are_errors_not_defaults() {
        let vars: HashMap<String, String> =
            [("MAX_RETRIES".to_string(), "many".to_string())].into_iter().collect();
        let err = ServiceConfig::from_vars(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let vars: HashMap<String, String> =
            [("KAFKA_CONSUMER_CONCURRENCY".to_string(), "0".to_string())]
                .into_iter()
                .collect();
        let err = ServiceConfig::from_vars(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
