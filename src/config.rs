use serde::{Deserialize, Serialize};

/// Which anchor ledger deployment the service runs against.
///
/// Only `Mock` is wired in this build; the variants fix the configuration
/// surface for real deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEnvironment {
    Mock,
    Testnet,
    Mainnet,
}

/// Runtime configuration for the notarization service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotaryConfig {
    /// Address the HTTP API binds to
    pub bind_addr: String,

    /// Budget for one content store write, in milliseconds
    pub store_timeout_ms: u64,

    /// Budget for one ledger commitment, in milliseconds
    pub anchor_timeout_ms: u64,

    /// Flat per-notarization verification surcharge in USD
    pub verification_overhead: f64,

    pub ledger_environment: LedgerEnvironment,
}

impl Default for NotaryConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            store_timeout_ms: 5_000,
            anchor_timeout_ms: 10_000,
            verification_overhead: 0.05,
            ledger_environment: LedgerEnvironment::Mock,
        }
    }
}

impl NotaryConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Unparseable values are ignored with a warning rather than aborting
    /// startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("VERISEAL_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(ms) = env_u64("VERISEAL_STORE_TIMEOUT_MS") {
            config.store_timeout_ms = ms;
        }
        if let Some(ms) = env_u64("VERISEAL_ANCHOR_TIMEOUT_MS") {
            config.anchor_timeout_ms = ms;
        }

        config
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(%name, %raw, "ignoring unparseable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NotaryConfig::default();
        assert_eq!(config.store_timeout_ms, 5_000);
        assert_eq!(config.anchor_timeout_ms, 10_000);
        assert_eq!(config.ledger_environment, LedgerEnvironment::Mock);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: NotaryConfig =
            serde_json::from_str(r#"{"bindAddr": "0.0.0.0:9000"}"#).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.store_timeout_ms, 5_000);
    }
}
