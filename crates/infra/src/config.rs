//! Configuration loading and representation.
//!
//! Every setting has a default; environment variables override them.

use std::time::Duration;

use thiserror::Error;

use stockroom_inventory::ThresholdPolicy;

use crate::alerts::LowStockAlertRunner;

pub const ENV_LOW_STOCK_THRESHOLD: &str = "STOCKROOM_LOW_STOCK_THRESHOLD";
pub const ENV_ALERT_INTERVAL_SECS: &str = "STOCKROOM_ALERT_INTERVAL_SECS";
pub const ENV_ALERT_MAX_RETRIES: &str = "STOCKROOM_ALERT_MAX_RETRIES";
pub const ENV_ALERT_BACKOFF_MS: &str = "STOCKROOM_ALERT_BACKOFF_MS";
pub const ENV_TX_TIMEOUT_MS: &str = "STOCKROOM_TX_TIMEOUT_MS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Deadline for one store transaction; `None` means no deadline.
    pub tx_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct StockroomConfig {
    pub threshold_policy: ThresholdPolicy,
    pub alerts: LowStockAlertRunner,
    pub store: StoreConfig,
}

impl StockroomConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source (unset or blank means default).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(threshold) = parse::<u32, _>(&lookup, ENV_LOW_STOCK_THRESHOLD)? {
            cfg.threshold_policy.global_default = threshold;
        }
        if let Some(secs) = parse::<u64, _>(&lookup, ENV_ALERT_INTERVAL_SECS)? {
            if secs == 0 {
                return Err(invalid(ENV_ALERT_INTERVAL_SECS, "0", "must be at least 1"));
            }
            cfg.alerts.interval = Duration::from_secs(secs);
        }
        if let Some(retries) = parse::<u32, _>(&lookup, ENV_ALERT_MAX_RETRIES)? {
            cfg.alerts.max_retries = retries;
        }
        if let Some(ms) = parse::<u64, _>(&lookup, ENV_ALERT_BACKOFF_MS)? {
            cfg.alerts.base_backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64, _>(&lookup, ENV_TX_TIMEOUT_MS)? {
            cfg.store.tx_timeout = Some(Duration::from_millis(ms));
        }

        Ok(cfg)
    }
}

fn parse<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| invalid(var, trimmed, &e.to_string()))
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use stockroom_catalog::DEFAULT_LOW_STOCK_THRESHOLD;

    fn load(vars: &[(&str, &str)]) -> Result<StockroomConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StockroomConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.threshold_policy.global_default, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(cfg.alerts.interval, Duration::from_secs(86_400));
        assert_eq!(cfg.alerts.max_retries, 3);
        assert_eq!(cfg.alerts.base_backoff, Duration::from_millis(500));
        assert_eq!(cfg.store.tx_timeout, None);
    }

    #[test]
    fn overrides_from_variables() {
        let cfg = load(&[
            (ENV_LOW_STOCK_THRESHOLD, "100"),
            (ENV_ALERT_INTERVAL_SECS, "60"),
            (ENV_ALERT_MAX_RETRIES, "0"),
            (ENV_ALERT_BACKOFF_MS, "25"),
            (ENV_TX_TIMEOUT_MS, " 750 "),
        ])
        .unwrap();
        assert_eq!(cfg.threshold_policy.global_default, 100);
        assert_eq!(cfg.alerts.interval, Duration::from_secs(60));
        assert_eq!(cfg.alerts.max_retries, 0);
        assert_eq!(cfg.alerts.base_backoff, Duration::from_millis(25));
        assert_eq!(cfg.store.tx_timeout, Some(Duration::from_millis(750)));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = load(&[(ENV_LOW_STOCK_THRESHOLD, "  ")]).unwrap();
        assert_eq!(cfg.threshold_policy.global_default, DEFAULT_LOW_STOCK_THRESHOLD);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = load(&[(ENV_LOW_STOCK_THRESHOLD, "-5")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_LOW_STOCK_THRESHOLD, .. }));
        assert!(load(&[(ENV_ALERT_INTERVAL_SECS, "0")]).is_err());
        assert!(load(&[(ENV_TX_TIMEOUT_MS, "soon")]).is_err());
    }
}
