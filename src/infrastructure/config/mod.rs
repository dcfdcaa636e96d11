//! Configuration management

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::services::run_context::DEFAULT_TIMEZONE;

/// Notifier configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub database: DatabaseConfig,
    pub marketplace: MarketplaceConfig,
    pub notifications: NotificationsConfig,
    pub sentry: SentryConfig,
    /// IANA zone pickup windows are shown in
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MarketplaceConfig {
    pub base_url: String,
    pub user_agent: String,
    pub language: String,
    pub page_size: u32,
    pub polling_interval_secs: u64,
    pub max_polling_attempts: u32,
    pub access_token_lifetime_secs: i64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct NotificationsConfig {
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: PathBuf::from("tgtg-notifier.db"),
            },
            marketplace: MarketplaceConfig {
                base_url: "https://apptoogoodtogo.com/api/".to_string(),
                user_agent: "TGTG/24.11.0 Dalvik/2.1.0 (Linux; U; Android 14; Pixel 7 Pro Build/UQ1A.240105.004)".to_string(),
                language: "en-US".to_string(),
                page_size: 20,
                polling_interval_secs: 5,
                max_polling_attempts: 24,
                access_token_lifetime_secs: 4 * 3600,
                request_timeout_secs: 30,
            },
            notifications: NotificationsConfig {
                telegram: Some(TelegramConfig {
                    enabled: false,
                    token: None,
                }),
            },
            sentry: SentryConfig::default(),
            timezone: DEFAULT_TIMEZONE.name().to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment variables win over file values
    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            self.notifications.telegram = Some(TelegramConfig {
                enabled: true,
                token: Some(token),
            });
        }

        if let Ok(tz) = std::env::var("TGTG_TIMEZONE") {
            self.timezone = tz;
        }

        if let Ok(url) = std::env::var("TGTG_BASE_URL") {
            self.marketplace.base_url = url;
        }

        if let Ok(agent) = std::env::var("TGTG_USER_AGENT") {
            self.marketplace.user_agent = agent;
        }

        if let Ok(dsn) = std::env::var("SENTRY_SDK_URL") {
            self.sentry.dsn = Some(dsn);
        }

        if let Ok(environment) = std::env::var("SENTRY_SDK_ENVIRONMENT") {
            self.sentry.environment = Some(environment);
        }
    }

    /// Resolve the configured zone; the system zone is never used
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::InvalidValue(format!("timezone {:?}: {}", self.timezone, e)))
    }

    /// Bot token when Telegram delivery is enabled
    pub fn telegram_token(&self) -> Option<&str> {
        self.notifications
            .telegram
            .as_ref()
            .filter(|t| t.enabled)
            .and_then(|t| t.token.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }
}
