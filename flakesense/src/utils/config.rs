use std::time::Duration;

/// Backend address used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5001";

/// Default auto-refresh period
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

pub const API_URL_ENV: &str = "FLAKESENSE_API_URL";
pub const REFRESH_SECS_ENV: &str = "FLAKESENSE_REFRESH_SECS";
pub const TIMEOUT_SECS_ENV: &str = "FLAKESENSE_TIMEOUT_SECS";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL, without trailing slash
    pub api_base_url: String,

    /// Period between automatic refreshes
    pub refresh_interval: Duration,

    /// Per-request timeout (transport default when unset)
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: None,
        }
    }
}

impl Config {
    /// Defaults overlaid with `FLAKESENSE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config = config.with_api_url(lookup(API_URL_ENV));

        if let Some(secs) = lookup(REFRESH_SECS_ENV).and_then(|v| parse_secs(REFRESH_SECS_ENV, &v))
        {
            config.refresh_interval = secs;
        }

        if let Some(secs) = lookup(TIMEOUT_SECS_ENV).and_then(|v| parse_secs(TIMEOUT_SECS_ENV, &v))
        {
            config.request_timeout = Some(secs);
        }

        config
    }

    /// Override the base URL; empty values keep the current one
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                self.api_base_url = url.to_string();
            }
        }
        self
    }

    pub fn with_refresh_secs(mut self, secs: Option<u64>) -> Self {
        if let Some(secs) = secs.filter(|s| *s > 0) {
            self.refresh_interval = Duration::from_secs(secs);
        }
        self
    }

    pub fn with_timeout_secs(mut self, secs: Option<u64>) -> Self {
        if let Some(secs) = secs.filter(|s| *s > 0) {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        self
    }
}

fn parse_secs(key: &str, value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            log::warn!("ignoring {}={:?}: expected a positive number of seconds", key, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base_url, "http://localhost:5001");
        assert_eq!(config.refresh_interval, Duration::from_secs(10));
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_env_overlay() {
        let config = Config::from_lookup(lookup(&[
            (API_URL_ENV, "http://qa.internal:8080/"),
            (REFRESH_SECS_ENV, "30"),
            (TIMEOUT_SECS_ENV, "5"),
        ]));
        assert_eq!(config.api_base_url, "http://qa.internal:8080");
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = Config::from_lookup(lookup(&[
            (API_URL_ENV, "  "),
            (REFRESH_SECS_ENV, "soon"),
            (TIMEOUT_SECS_ENV, "0"),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default()
            .with_api_url(Some("http://127.0.0.1:9000".to_string()))
            .with_refresh_secs(Some(3))
            .with_timeout_secs(None);
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.refresh_interval, Duration::from_secs(3));
        assert_eq!(config.request_timeout, None);
    }
}
