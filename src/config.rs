use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Timeout for page and API requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Timeout for image existence probes in milliseconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
}

fn default_timeout() -> u64 { 8 }
fn default_probe_timeout() -> u64 { 4500 }

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 8,
            probe_timeout_ms: 4500,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = Path::new("config.toml");
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                if let Ok(cfg) = toml::from_str::<Config>(&content) {
                    return cfg;
                }
            }
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.fetch.timeout_secs, 8);
        assert_eq!(cfg.fetch.probe_timeout_ms, 4500);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("[fetch]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(cfg.fetch.timeout_secs, 5);
        assert_eq!(cfg.fetch.probe_timeout_ms, 4500);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.fetch.timeout_secs, 8);
    }
}
