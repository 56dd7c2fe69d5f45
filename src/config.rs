//! Runtime configuration from the environment (and an optional `.env`).

use std::time::Duration;

use tracing::debug;

use crate::cache::expiry_from_secs;
use crate::data::SourceUrls;
use crate::error::HistoryError;
use crate::io::normalize::EmptySeriesPolicy;

const DEFAULT_CACHE_TTL_SECS: f64 = 3600.0;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Settings for the history service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub sources: SourceUrls,
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
    pub empty_series: EmptySeriesPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sources: SourceUrls::default(),
            cache_ttl: Duration::from_secs_f64(DEFAULT_CACHE_TTL_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            empty_series: EmptySeriesPolicy::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from process environment after reading `.env` if present.
    pub fn from_env() -> Result<Self, HistoryError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables; unset keys use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HistoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let sources = SourceUrls {
            confirmed: var("CASE_HISTORY_CONFIRMED_URL").unwrap_or(defaults.sources.confirmed),
            deaths: var("CASE_HISTORY_DEATHS_URL").unwrap_or(defaults.sources.deaths),
            recovered: var("CASE_HISTORY_RECOVERED_URL").unwrap_or(defaults.sources.recovered),
        };

        let cache_ttl = match var("CASE_HISTORY_CACHE_TTL_SECS") {
            Some(raw) => {
                let secs = raw.parse::<f64>().map_err(|e| {
                    HistoryError::InvalidConfig(format!("CASE_HISTORY_CACHE_TTL_SECS='{raw}': {e}"))
                })?;
                expiry_from_secs(secs)?
            }
            None => defaults.cache_ttl,
        };

        let http_timeout = match var("CASE_HISTORY_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(HistoryError::InvalidConfig(format!(
                        "CASE_HISTORY_HTTP_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                    )));
                }
            },
            None => defaults.http_timeout,
        };

        let empty_series = match var("CASE_HISTORY_EMPTY_SERIES") {
            Some(raw) => raw.parse::<EmptySeriesPolicy>()?,
            None => defaults.empty_series,
        };

        let config = Self {
            sources,
            cache_ttl,
            http_timeout,
            empty_series,
        };
        debug!("Loaded config: {config:?}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServiceConfig, HistoryError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.empty_series, EmptySeriesPolicy::Skip);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("CASE_HISTORY_DEATHS_URL", "http://mirror/deaths.csv"),
            ("CASE_HISTORY_CACHE_TTL_SECS", "0.25"),
            ("CASE_HISTORY_HTTP_TIMEOUT_SECS", "5"),
            ("CASE_HISTORY_EMPTY_SERIES", "reject"),
        ])
        .unwrap();
        assert_eq!(config.sources.deaths, "http://mirror/deaths.csv");
        assert_eq!(config.sources.confirmed, SourceUrls::default().confirmed);
        assert_eq!(config.cache_ttl, Duration::from_millis(250));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.empty_series, EmptySeriesPolicy::Reject);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (key, value) in [
            ("CASE_HISTORY_CACHE_TTL_SECS", "-5"),
            ("CASE_HISTORY_CACHE_TTL_SECS", "soon"),
            ("CASE_HISTORY_HTTP_TIMEOUT_SECS", "0"),
            ("CASE_HISTORY_EMPTY_SERIES", "maybe"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert!(matches!(err, HistoryError::InvalidConfig(_)), "{key}={value}: {err:?}");
        }
    }
}
