use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use url::Url;

use crate::models::TransportKind;
use crate::plugins::extractors::StockPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub storage: StorageConfig,
    pub notifications: NotificationsConfig,
    pub targets: Vec<TargetConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub max_attempts: u32,
    pub min_retry_secs: u64,
    pub max_retry_secs: u64,
    pub request_timeout_secs: u64,
    pub browser_dwell_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    #[serde(default)]
    pub stock_policy: StockPolicy,
    #[serde(default)]
    pub link_base: Option<String>,
    #[serde(default)]
    pub chrome_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub snapshot_file: String,
    pub history_file: String,
    pub log_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
    pub username: String,
    pub max_title_len: usize,
}

/// One configured page/search to monitor. Retry fields override the
/// global scraper bounds when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub kind: TransportKind,
    pub url: String,
    pub price_threshold: i64,
    pub in_stock_alert: bool,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub min_retry_secs: Option<u64>,
    #[serde(default)]
    pub max_retry_secs: Option<u64>,
}

impl AppConfig {
    pub fn from_env(extra_file: Option<&Path>) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false));

        // An explicit file from the command line wins over the layered set
        if let Some(path) = extra_file {
            builder = builder.add_source(File::from(path));
        }

        let s = builder
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Fall back to bare environment variables for the secrets that
        // predate the config files
        if config.notifications.discord.webhook_url.is_none() {
            config.notifications.discord.webhook_url = env::var("DISCORD_WEBHOOK").ok();
        }
        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scraper.max_attempts == 0 {
            return Err(ConfigError::Message(
                "Scraper max_attempts must be greater than 0".into(),
            ));
        }

        if self.scraper.min_retry_secs > self.scraper.max_retry_secs {
            return Err(ConfigError::Message(
                "Scraper min_retry_secs cannot exceed max_retry_secs".into(),
            ));
        }

        if self.scraper.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Scraper request_timeout_secs must be greater than 0".into(),
            ));
        }

        if let Some(link_base) = &self.scraper.link_base {
            if Url::parse(link_base).is_err() {
                return Err(ConfigError::Message("Invalid scraper link_base URL".into()));
            }
        }

        if self.notifications.discord.max_title_len == 0 {
            return Err(ConfigError::Message(
                "Discord max_title_len must be greater than 0".into(),
            ));
        }

        if self.targets.is_empty() {
            return Err(ConfigError::Message(
                "At least one target must be configured".into(),
            ));
        }

        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(ConfigError::Message("Target name cannot be empty".into()));
            }

            if Url::parse(&target.url).is_err() {
                return Err(ConfigError::Message(format!(
                    "Invalid URL for target '{}'",
                    target.name
                )));
            }

            if target.max_attempts == Some(0) {
                return Err(ConfigError::Message(format!(
                    "Target '{}' max_attempts must be greater than 0",
                    target.name
                )));
            }

            let min = target.min_retry_secs.unwrap_or(self.scraper.min_retry_secs);
            let max = target.max_retry_secs.unwrap_or(self.scraper.max_retry_secs);
            if min > max {
                return Err(ConfigError::Message(format!(
                    "Target '{}' retry bounds are inverted",
                    target.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            scraper: ScraperConfig {
                max_attempts: 60,
                min_retry_secs: 10,
                max_retry_secs: 30,
                request_timeout_secs: 30,
                browser_dwell_secs: 8,
                user_agent: "Pricewatch/1.0".to_string(),
                accept_language: "en-US,en;q=0.9".to_string(),
                stock_policy: StockPolicy::AbortPage,
                link_base: None,
                chrome_path: None,
            },
            storage: StorageConfig {
                snapshot_file: "data/last_scrape.json".to_string(),
                history_file: "data/history.csv".to_string(),
                log_dir: "logs".to_string(),
            },
            notifications: NotificationsConfig {
                discord: DiscordConfig {
                    webhook_url: None,
                    username: "pricewatch".to_string(),
                    max_title_len: 35,
                },
            },
            targets: vec![TargetConfig {
                name: "RTX 5080".to_string(),
                kind: TransportKind::Standard,
                url: "https://www.example.com/products.html".to_string(),
                price_threshold: 1500,
                in_stock_alert: false,
                max_attempts: None,
                min_retry_secs: None,
                max_retry_secs: None,
            }],
        }
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_attempts() {
        let mut config = valid_config();
        config.scraper.max_attempts = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("max_attempts must be greater than 0"));
    }

    #[test]
    fn test_config_validation_inverted_retry_bounds() {
        let mut config = valid_config();
        config.scraper.min_retry_secs = 60;
        config.scraper.max_retry_secs = 10;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("min_retry_secs cannot exceed max_retry_secs"));
    }

    #[test]
    fn test_config_validation_invalid_target_url() {
        let mut config = valid_config();
        config.targets[0].url = "not-a-valid-url".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_config_validation_requires_targets() {
        let mut config = valid_config();
        config.targets.clear();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("At least one target"));
    }

    #[test]
    fn test_config_validation_per_target_override_bounds() {
        let mut config = valid_config();
        config.targets[0].min_retry_secs = Some(45);
        // Global max_retry_secs is 30, so the effective bounds invert.
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("retry bounds are inverted"));
    }

    #[test]
    fn test_target_deserializes_from_toml_shape() {
        let raw = r#"
            name = "RTX 5080"
            kind = "browser"
            url = "https://www.example.com/products.html"
            price_threshold = 1500
            in_stock_alert = false
        "#;
        let target: TargetConfig = toml_from_str(raw);
        assert_eq!(target.kind, TransportKind::Browser);
        assert_eq!(target.max_attempts, None);
    }

    fn toml_from_str(raw: &str) -> TargetConfig {
        let source = Config::builder()
            .add_source(File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap();
        source.try_deserialize().unwrap()
    }
}
