//! Environment configuration.
//!
//! Every value is optional at startup. A missing value is reported once as a
//! warning and the process keeps running; the call that needs it fails later.

use tracing::warn;

pub const KMF_STATION_URL_BASE: &str = "KMF_STATION_URL_BASE";
pub const SECRET: &str = "SECRET";
pub const KMF_STATION_SECRET: &str = "KMF_STATION_SECRET";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const GITHUB_API_URL: &str = "GITHUB_API_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the distribution station.
    pub station_url_base: Option<String>,
    /// Bearer secret guarding `POST /update`.
    pub secret: Option<String>,
    /// Bearer secret sent when publishing to the station.
    pub station_secret: Option<String>,
    pub github_token: Option<String>,
    /// Override for the GitHub API root.
    pub github_api_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Config {
            station_url_base: get(KMF_STATION_URL_BASE),
            secret: get(SECRET),
            station_secret: get(KMF_STATION_SECRET),
            github_token: get(GITHUB_TOKEN),
            github_api_url: get(GITHUB_API_URL),
        }
    }

    /// Names of the required keys that are not set.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            (KMF_STATION_URL_BASE, &self.station_url_base),
            (SECRET, &self.secret),
            (KMF_STATION_SECRET, &self.station_secret),
            (GITHUB_TOKEN, &self.github_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key)
        .collect()
    }

    pub fn warn_missing(&self) {
        for key in self.missing_keys() {
            warn!("{} not specified", key);
        }
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_full() {
        let config = Config::from_lookup(lookup(&[
            (KMF_STATION_URL_BASE, "https://station.example.com"),
            (SECRET, "public"),
            (KMF_STATION_SECRET, "private"),
            (GITHUB_TOKEN, "ghp_token"),
        ]));
        assert_eq!(
            config.station_url_base.as_deref(),
            Some("https://station.example.com")
        );
        assert_eq!(config.secret.as_deref(), Some("public"));
        assert_eq!(config.station_secret.as_deref(), Some("private"));
        assert_eq!(config.github_token.as_deref(), Some("ghp_token"));
        assert_eq!(config.github_api_url, None);
        assert!(config.missing_keys().is_empty());
    }

    #[test]
    fn test_blank_values_are_missing() {
        let config = Config::from_lookup(lookup(&[(SECRET, "  "), (GITHUB_TOKEN, "")]));
        assert_eq!(config.secret, None);
        assert_eq!(
            config.missing_keys(),
            vec![KMF_STATION_URL_BASE, SECRET, KMF_STATION_SECRET, GITHUB_TOKEN]
        );
    }

    #[test]
    fn test_api_url_is_optional() {
        let config = Config::from_lookup(lookup(&[(GITHUB_API_URL, "http://127.0.0.1:9000")]));
        assert_eq!(
            config.github_api_url.as_deref(),
            Some("http://127.0.0.1:9000")
        );
        assert!(!config.missing_keys().contains(&GITHUB_API_URL));
    }
}
