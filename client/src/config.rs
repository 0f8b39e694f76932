//! Rate source configuration.

use chrono::NaiveDate;

/// Hosts serving the currency API.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Primary host serving the latest catalog and rate documents.
    pub primary_url: String,
    /// Mirror tried when the primary fails.
    pub fallback_url: String,
    /// Versioned host template for historical snapshots; `{date}` is
    /// replaced with the requested day (YYYY-MM-DD).
    pub historical_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            primary_url: "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1"
                .to_string(),
            fallback_url: "https://latest.currency-api.pages.dev/v1".to_string(),
            historical_url: "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@{date}/v1"
                .to_string(),
        }
    }
}

impl SourceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CUREX_PRIMARY_URL") {
            config.primary_url = url;
        }

        if let Ok(url) = std::env::var("CUREX_FALLBACK_URL") {
            config.fallback_url = url;
        }

        if let Ok(url) = std::env::var("CUREX_HISTORICAL_URL") {
            config.historical_url = url;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.primary_url.is_empty() {
            return Err("Primary URL cannot be empty".to_string());
        }

        if self.fallback_url.is_empty() {
            return Err("Fallback URL cannot be empty".to_string());
        }

        if !self.historical_url.contains("{date}") {
            return Err("Historical URL must contain a {date} placeholder".to_string());
        }

        Ok(())
    }

    /// Versioned host for one historical day.
    pub fn historical_url_for(&self, date: NaiveDate) -> String {
        self.historical_url
            .replace("{date}", &date.format("%Y-%m-%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SourceConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = SourceConfig::default();
        config.historical_url = "https://example.com/v1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_historical_url_substitution() {
        let config = SourceConfig::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();

        assert_eq!(
            config.historical_url_for(date),
            "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@2024-01-03/v1"
        );
    }
}
