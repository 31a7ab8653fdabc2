use dart_core::{DartError, DartResult};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://opendart.fss.or.kr/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Registry API keys are always 40 characters.
pub const API_KEY_LEN: usize = 40;

#[derive(Clone)]
pub struct OpenDartConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenDartConfig {
    pub fn new(api_key: impl Into<String>) -> DartResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.chars().count() != API_KEY_LEN {
            return Err(DartError::Config(format!(
                "OpenDART API key must be {} characters, got {}",
                API_KEY_LEN,
                api_key.chars().count()
            )));
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// `OPENDART_API_KEY` (or `API_KEY`), `OPENDART_BASE_URL`, `OPENDART_TIMEOUT_SECS`
    pub fn from_env() -> DartResult<Self> {
        let api_key = std::env::var("OPENDART_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| DartError::Config("OPENDART_API_KEY must be set".to_string()))?;

        let mut config = Self::new(api_key)?;

        if let Ok(base_url) = std::env::var("OPENDART_BASE_URL") {
            config = config.with_base_url(base_url);
        }

        if let Some(secs) = std::env::var("OPENDART_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for OpenDartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenDartConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_length_is_validated() {
        assert!(OpenDartConfig::new("a".repeat(40)).is_ok());
        assert!(matches!(
            OpenDartConfig::new("short").unwrap_err(),
            DartError::Config(_)
        ));
    }

    #[test]
    fn test_defaults_and_overrides() {
        let config = OpenDartConfig::new("k".repeat(40))
            .unwrap()
            .with_base_url("http://localhost:9000/api/");

        assert_eq!(config.base_url, "http://localhost:9000/api");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!format!("{:?}", config).contains("kkkk"));
    }
}
