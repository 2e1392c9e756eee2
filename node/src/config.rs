//! Engine configuration with TOML file support.

use adsettle_contract::DEFAULT_LOCK_SECS;
use adsettle_evidence::{FetchPolicy, DEFAULT_MAX_BODY_BYTES};
use adsettle_settlement::{CreditPolicy, RIGHT_CREDIT, WRONG_CREDIT};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for an adsettle engine.
///
/// Can be loaded from a TOML file via [`EngineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Data directory for the LMDB ledger.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Seconds escrowed funds stay locked.
    #[serde(default = "default_escrow_lock_secs")]
    pub escrow_lock_secs: u64,

    /// Credit per judgment that matches the majority.
    #[serde(default = "default_right_credit")]
    pub right_credit: u32,

    /// Credit removed per judgment against the majority.
    #[serde(default = "default_wrong_credit")]
    pub wrong_credit: u32,

    /// Log output format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Evidence fetching limits.
    #[serde(default)]
    pub evidence: EvidenceConfig,
}

/// Timeout, retry and size limits for verifier result files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Largest result file accepted, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./adsettle_data")
}

fn default_map_size_mb() -> usize {
    256
}

fn default_escrow_lock_secs() -> u64 {
    DEFAULT_LOCK_SECS
}

fn default_right_credit() -> u32 {
    RIGHT_CREDIT
}

fn default_wrong_credit() -> u32 {
    WRONG_CREDIT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_max_body_bytes() -> u64 {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl EvidenceConfig {
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn credit_policy(&self) -> CreditPolicy {
        CreditPolicy {
            right_credit: Decimal::from(self.right_credit),
            wrong_credit: Decimal::from(self.wrong_credit),
        }
    }

    /// LMDB map size in bytes; fails if `map_size_mb` does not fit.
    pub fn map_size_bytes(&self) -> Result<usize, NodeError> {
        self.map_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| NodeError::Config(format!("map_size_mb {} is too large", self.map_size_mb)))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            escrow_lock_secs: default_escrow_lock_secs(),
            right_credit: default_right_credit(),
            wrong_credit: default_wrong_credit(),
            evidence: EvidenceConfig::default(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = EngineConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = EngineConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.escrow_lock_secs, 604_800);
        assert_eq!(config.right_credit, 1);
        assert_eq!(config.wrong_credit, 9);
        assert_eq!(config.evidence.max_retries, 2);
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            escrow_lock_secs = 60
            log_format = "json"

            [evidence]
            timeout_secs = 3
        "#;
        let config = EngineConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.escrow_lock_secs, 60);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.evidence.fetch_policy().timeout, Duration::from_secs(3));
        assert_eq!(config.evidence.retry_backoff_ms, 250); // default
        assert_eq!(config.evidence.fetch_policy().max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn body_limit_is_configurable() {
        let config = EngineConfig::from_toml_str("[evidence]\nmax_body_bytes = 4096\n").unwrap();
        assert_eq!(config.evidence.fetch_policy().max_body_bytes, 4096);
    }

    #[test]
    fn oversized_map_is_a_config_error() {
        let config = EngineConfig {
            map_size_mb: usize::MAX,
            ..EngineConfig::default()
        };
        assert!(matches!(config.map_size_bytes(), Err(NodeError::Config(_))));
        assert_eq!(EngineConfig::default().map_size_bytes().unwrap(), 256 * 1024 * 1024);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = EngineConfig::from_toml_file("/nonexistent/adsettle.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
