use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use notifier_engine::{DEFAULT_DISCORD_API_BASE, DEFAULT_POLL_INTERVAL};

use crate::logging::LogDestination;

pub const DEFAULT_API_URL: &str = "https://jotihunt.nl/api/2.0/articles";
pub const DEFAULT_ARTICLE_BASE_URL: &str = "https://jotihunt.nl/article/";
pub const DEFAULT_SENT_ARTICLES_FILE: &str = "sent_articles.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration, read once from the environment at startup.
#[derive(Clone)]
pub struct NotifierConfig {
    pub bot_token: String,
    pub channel_id: u64,
    pub api_url: String,
    pub article_base_url: String,
    pub sent_articles_file: PathBuf,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub discord_api_base: String,
    pub log_level: LevelFilter,
    pub log_destination: LogDestination,
}

impl NotifierConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token = get("DISCORD_BOT_TOKEN").ok_or(ConfigError::Missing("DISCORD_BOT_TOKEN"))?;
        let channel_id = parse_required(&get, "DISCORD_CHANNEL_ID")?;
        let poll_interval = match parse_optional::<u64>(&get, "POLL_INTERVAL_SECS")? {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    key: "POLL_INTERVAL_SECS",
                    value: "0".to_string(),
                    reason: "must be at least 1".to_string(),
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_POLL_INTERVAL,
        };
        let request_timeout = Duration::from_secs(
            parse_optional(&get, "REQUEST_TIMEOUT_SECS")?.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );
        let log_level = parse_optional(&get, "LOG_LEVEL")?.unwrap_or(LevelFilter::Info);
        let log_destination = parse_optional(&get, "LOG_DESTINATION")?.unwrap_or_default();

        Ok(Self {
            bot_token: bot_token.trim().to_string(),
            channel_id,
            api_url: get("API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            article_base_url: get("ARTICLE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ARTICLE_BASE_URL.to_string()),
            sent_articles_file: get("SENT_ARTICLES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SENT_ARTICLES_FILE)),
            poll_interval,
            request_timeout,
            discord_api_base: get("DISCORD_API_BASE")
                .unwrap_or_else(|| DEFAULT_DISCORD_API_BASE.to_string()),
            log_level,
            log_destination,
        })
    }
}

impl fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_url", &self.api_url)
            .field("article_base_url", &self.article_base_url)
            .field("sent_articles_file", &self.sent_articles_file)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("discord_api_base", &self.discord_api_base)
            .field("log_level", &self.log_level)
            .field("log_destination", &self.log_destination)
            .finish()
    }
}

fn parse_required<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    parse_optional(get, key)?.ok_or(ConfigError::Missing(key))
}

fn parse_optional<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(value) = get(key) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|err| ConfigError::Invalid {
            key,
            value,
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use log::LevelFilter;

    use super::{ConfigError, NotifierConfig, DEFAULT_API_URL, DEFAULT_ARTICLE_BASE_URL};
    use crate::logging::LogDestination;

    fn config(vars: &[(&str, &str)]) -> Result<NotifierConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NotifierConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = config(&[("DISCORD_BOT_TOKEN", "abc"), ("DISCORD_CHANNEL_ID", "123")]).unwrap();

        assert_eq!(config.bot_token, "abc");
        assert_eq!(config.channel_id, 123);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.article_base_url, DEFAULT_ARTICLE_BASE_URL);
        assert_eq!(config.sent_articles_file.to_str(), Some("sent_articles.json"));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.log_destination, LogDestination::Terminal);
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            ("DISCORD_BOT_TOKEN", "abc"),
            ("DISCORD_CHANNEL_ID", "123"),
            ("API_URL", "http://localhost:8080/articles"),
            ("ARTICLE_BASE_URL", "http://localhost:8080/a/"),
            ("POLL_INTERVAL_SECS", "30"),
            ("LOG_LEVEL", "debug"),
            ("LOG_DESTINATION", "both"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:8080/articles");
        assert_eq!(config.article_base_url, "http://localhost:8080/a/");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.log_destination, LogDestination::Both);
    }

    #[test]
    fn missing_token_is_fatal() {
        let err = config(&[("DISCORD_CHANNEL_ID", "123")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISCORD_BOT_TOKEN"));
    }

    #[test]
    fn non_numeric_channel_id_is_fatal() {
        let err = config(&[("DISCORD_BOT_TOKEN", "abc"), ("DISCORD_CHANNEL_ID", "general")])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DISCORD_CHANNEL_ID",
                ..
            }
        ));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = config(&[
            ("DISCORD_BOT_TOKEN", "abc"),
            ("DISCORD_CHANNEL_ID", "1"),
            ("API_URL", ""),
        ])
        .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = config(&[
            ("DISCORD_BOT_TOKEN", "abc"),
            ("DISCORD_CHANNEL_ID", "1"),
            ("POLL_INTERVAL_SECS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "POLL_INTERVAL_SECS", .. }));
    }

    #[test]
    fn debug_output_hides_token() {
        let config = config(&[("DISCORD_BOT_TOKEN", "hunter2"), ("DISCORD_CHANNEL_ID", "1")]).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
