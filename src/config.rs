use std::env;
use std::time::Duration;

use crate::datasource::hyperliquid::DEFAULT_PAGE_SIZE;

/// Service configuration read once at startup.
///
/// Clients receive these values explicitly; nothing below `main` reads the
/// process environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,

    pub hyperliquid_info_url: String,
    /// Maximum records the info endpoint returns per page
    pub hyperliquid_page_size: usize,
    /// Deadline for one whole PnL computation
    pub pnl_timeout: Duration,

    pub coingecko_api_url: String,
    pub coingecko_api_key: Option<String>,

    pub gemini_api_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let str_or = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        Self {
            server_host: str_or("SERVER_HOST", "0.0.0.0"),
            server_port: var("SERVER_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(8081),
            hyperliquid_info_url: str_or("HYPERLIQUID_INFO_URL", "https://api.hyperliquid.xyz/info"),
            hyperliquid_page_size: var("HYPERLIQUID_PAGE_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            pnl_timeout: Duration::from_secs(
                var("PNL_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            coingecko_api_url: str_or("COINGECKO_API_URL", "https://api.coingecko.com/api/v3"),
            coingecko_api_key: var("COINGECKO_DEMO_API_KEY"),
            gemini_api_url: str_or(
                "GEMINI_API_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: str_or("GEMINI_MODEL", "gemini-2.5-flash"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr(), "0.0.0.0:8081");
        assert_eq!(config.hyperliquid_page_size, 2000);
        assert_eq!(config.pnl_timeout, Duration::from_secs(60));
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert!(config.gemini_api_key.is_none());
        assert!(config.coingecko_api_key.is_none());
    }

    #[test]
    fn blank_and_unparseable_values_fall_back() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "   "),
            ("SERVER_PORT", "not-a-port"),
            ("HYPERLIQUID_PAGE_SIZE", "0"),
        ]);
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.server_port, 8081);
        assert_eq!(config.hyperliquid_page_size, 2000);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("SERVER_PORT", "3000"),
            ("GEMINI_API_KEY", "secret"),
            ("PNL_TIMEOUT_SECS", "5"),
            ("HYPERLIQUID_INFO_URL", "http://localhost:9000/info"),
        ]);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.pnl_timeout, Duration::from_secs(5));
        assert_eq!(config.hyperliquid_info_url, "http://localhost:9000/info");
    }
}
