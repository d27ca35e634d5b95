/// Engine configuration
///
/// Thresholds and sizes used by the list pages and dashboards. Every field
/// has a default, so a config file only needs the keys it changes:
///
/// ```
/// use stockview::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{"page_size": 25}"#).unwrap();
/// assert_eq!(config.page_size, 25);
/// assert_eq!(config.low_stock_threshold, 5);
/// ```

use crate::error::{Error, Result};
use crate::stats::DEFAULT_LOW_STOCK_THRESHOLD;
use crate::view::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_TOP_N: usize = 5;

pub const ENV_LOW_STOCK_THRESHOLD: &str = "STOCKVIEW_LOW_STOCK_THRESHOLD";
pub const ENV_PAGE_SIZE: &str = "STOCKVIEW_PAGE_SIZE";
pub const ENV_TOP_N: &str = "STOCKVIEW_TOP_N";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Products with stock below this are "low stock"
    pub low_stock_threshold: i64,
    /// Rows per page on list pages
    pub page_size: usize,
    /// Length of the dashboard top lists
    pub top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            page_size: DEFAULT_PAGE_SIZE,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Override fields from the `STOCKVIEW_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from `lookup`, which maps an env var name to its value.
    /// On error `self` is left unchanged.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let low_stock_threshold = parse_override(&lookup, ENV_LOW_STOCK_THRESHOLD)?;
        let page_size = parse_override(&lookup, ENV_PAGE_SIZE)?;
        let top_n = parse_override(&lookup, ENV_TOP_N)?;

        let updated = EngineConfig {
            low_stock_threshold: low_stock_threshold.unwrap_or(self.low_stock_threshold),
            page_size: page_size.unwrap_or(self.page_size),
            top_n: top_n.unwrap_or(self.top_n),
        };
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidConfig("page_size must be at least 1".to_string()));
        }
        if self.low_stock_threshold < 0 {
            return Err(Error::InvalidConfig(
                "low_stock_threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| Error::InvalidConfig(format!("{} has an invalid value: '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.low_stock_threshold, 5);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.top_n, 5);
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = EngineConfig::default();
        config
            .apply_overrides(env(&[(ENV_PAGE_SIZE, "20"), (ENV_TOP_N, " 3 "), (ENV_LOW_STOCK_THRESHOLD, "")]))
            .unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.top_n, 3);
        assert_eq!(config.low_stock_threshold, 5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_overrides(env(&[(ENV_PAGE_SIZE, "many")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        assert!(matches!(
            EngineConfig::from_json_str(r#"{"page_size": 0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"top_n": "five"}"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_failed_override_leaves_config_unchanged() {
        let mut config = EngineConfig::default();
        let result = config.apply_overrides(env(&[
            (ENV_LOW_STOCK_THRESHOLD, "8"),
            (ENV_PAGE_SIZE, "many"),
            (ENV_TOP_N, "3"),
        ]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert_eq!(config, EngineConfig::default());

        let result =
            config.apply_overrides(env(&[(ENV_LOW_STOCK_THRESHOLD, "8"), (ENV_PAGE_SIZE, "0")]));
        assert!(result.is_err());
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load("/nonexistent/stockview.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
