use std::{collections::HashMap, str::FromStr};

const PREFIXES: [&str; 3] = ["YNAB_", "TELEGRAM_", "MONO_"];

pub const YNAB_TOKEN: &str = "YNAB_TOKEN";
pub const YNAB_BUDGET_ID: &str = "YNAB_BUDGET_ID";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const YNAB_MONO_SETTINGS: &str = "YNAB_MONO_SETTINGS";
pub const YNAB_MONO_SUBMIT_TIMEOUT_SECS: &str = "YNAB_MONO_SUBMIT_TIMEOUT_SECS";
pub const YNAB_MONO_SHUTDOWN_TIMEOUT_SECS: &str = "YNAB_MONO_SHUTDOWN_TIMEOUT_SECS";
pub const YNAB_MONO_MAX_DEPTH: &str = "YNAB_MONO_MAX_DEPTH";

#[non_exhaustive]
pub struct Config {
    kv: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let kv = std::env::vars()
            .filter(|(k, _)| PREFIXES.iter().any(|p| k.starts_with(p)))
            .collect();

        Self { kv }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_map(kv: HashMap<String, String>) -> Self {
        Self { kv }
    }

    pub fn optional(&self, key: &str) -> Option<&str> {
        self.kv.get(key).map(|v| v.as_str())
    }

    pub fn require(&self, key: &str) -> anyhow::Result<&str> {
        self.optional(key)
            .ok_or_else(|| anyhow::anyhow!("required config key '{key}'"))
    }

    /// Parses an optional key, failing only when it is present but malformed.
    pub fn parse<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid value for '{key}': {e}"))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(pairs: &[(&str, &str)]) -> Config {
        let kv: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_map(kv)
    }

    #[test]
    fn test_optional_returns_value_when_present() {
        let config = test_config(&[(YNAB_BUDGET_ID, "budget-1")]);
        assert_eq!(config.optional(YNAB_BUDGET_ID), Some("budget-1"));
    }

    #[test]
    fn test_optional_returns_none_when_missing() {
        let config = test_config(&[]);
        assert_eq!(config.optional(YNAB_TOKEN), None);
    }

    #[test]
    fn test_require_returns_error_when_missing() {
        let config = test_config(&[]);
        let err_msg = config.require(TELEGRAM_BOT_TOKEN).unwrap_err().to_string();
        assert!(err_msg.contains(TELEGRAM_BOT_TOKEN));
    }

    #[test]
    fn test_parse_number() {
        let config = test_config(&[(YNAB_MONO_SUBMIT_TIMEOUT_SECS, " 45 ")]);
        let secs: Option<u64> = config.parse(YNAB_MONO_SUBMIT_TIMEOUT_SECS).unwrap();
        assert_eq!(secs, Some(45));
    }

    #[test]
    fn test_parse_missing_is_none() {
        let config = test_config(&[]);
        let secs: Option<u64> = config.parse(YNAB_MONO_SUBMIT_TIMEOUT_SECS).unwrap();
        assert_eq!(secs, None);
    }

    #[test]
    fn test_parse_malformed_names_key() {
        let config = test_config(&[(YNAB_MONO_SUBMIT_TIMEOUT_SECS, "soon")]);
        let err = config
            .parse::<u64>(YNAB_MONO_SUBMIT_TIMEOUT_SECS)
            .unwrap_err()
            .to_string();
        assert!(err.contains(YNAB_MONO_SUBMIT_TIMEOUT_SECS));
    }

    #[test]
    fn test_default_only_reads_known_prefixes() {
        let config = Config::new();
        assert!(config.kv.keys().all(|k| PREFIXES.iter().any(|p| k.starts_with(p))));
    }
}
