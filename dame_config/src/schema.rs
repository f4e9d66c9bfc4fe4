use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use dame_core::PredictorSettings;

/// Directory under the home directory holding the config file.
pub const CONFIG_DIR: &str = "dame";
pub const CONFIG_FILE: &str = "config.json";

/// Environment variables that override file values, in the order applied.
pub const ENV_OVERRIDES: [&str; 4] = [
    "BOT_TOKEN",
    "TARGET_CHANNEL_ID",
    "PREDICTION_CHANNEL_ID",
    "ADMIN_CHAT_ID",
];

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub predictor: PredictorSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    /// Channel carrying the raw draw announcements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_channel_id: Option<i64>,
    /// Channel receiving forecasts and their resolutions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_channel_id: Option<i64>,
    /// Chat receiving the prompt when the failure threshold is reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_chat_id: Option<i64>,
    /// Chats allowed to issue commands; empty allows everyone.
    #[serde(default)]
    pub allow_from: Vec<String>,
}

impl Config {
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR)
            .join(CONFIG_FILE))
    }

    /// Load `~/dame/config.json` and apply environment overrides.
    ///
    /// A missing file is accepted when `BOT_TOKEN` is set, so the bot can run
    /// from the environment alone.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else if std::env::var_os("BOT_TOKEN").is_some() {
            info!(
                "No config file at {}, using environment only",
                config_path.display()
            );
            Self::default()
        } else {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'dame init' to create config.",
                config_path.display()
            );
        };

        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config
            .predictor
            .validate()
            .context("Invalid \"predictor\" section")?;
        Ok(config)
    }

    /// Replace file values with the ones `lookup` returns for [`ENV_OVERRIDES`].
    pub fn with_env_overrides<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let chat_id = |key: &str| -> anyhow::Result<Option<i64>> {
            non_empty(key)
                .map(|v| {
                    v.trim()
                        .parse::<i64>()
                        .with_context(|| format!("{key} must be a numeric chat id, got {v:?}"))
                })
                .transpose()
        };

        if let Some(token) = non_empty("BOT_TOKEN") {
            self.telegram.token = token;
        }
        if let Some(id) = chat_id("TARGET_CHANNEL_ID")? {
            self.telegram.source_channel_id = Some(id);
        }
        if let Some(id) = chat_id("PREDICTION_CHANNEL_ID")? {
            self.telegram.prediction_channel_id = Some(id);
        }
        if let Some(id) = chat_id("ADMIN_CHAT_ID")? {
            self.telegram.admin_chat_id = Some(id);
        }

        Ok(self)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR);

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, Self::TEMPLATE)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Set telegram.token to the token issued by @BotFather");
        println!("   2. Fill in the source and prediction channel ids");
        println!("   3. Run 'dame run' to start the bot");
        println!();
        println!("🔧 Environment overrides: {}", ENV_OVERRIDES.join(", "));
        println!();
        Ok(())
    }

    const TEMPLATE: &'static str = r#"{
  "telegram": {
    "token": "your-bot-token-here",
    "source_channel_id": -1001234567890,
    "prediction_channel_id": -1009876543210,
    "admin_chat_id": 123456789,
    "allow_from": []
  },
  "predictor": {
    "history_limit": 10,
    "max_failures_before_prompt": 2,
    "verification_window": 3,
    "completion_indicators": ["✅", "🔰"],
    "offsets": {
      "immediate": 2,
      "next_draw": 3,
      "wait_one": 3,
      "fallback": 2
    }
  }
}"#;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn template_parses() {
        let config = Config::from_json(Config::TEMPLATE).unwrap();
        assert_eq!(config.telegram.source_channel_id, Some(-1_001_234_567_890));
        assert_eq!(config.predictor, PredictorSettings::default());
    }

    #[test]
    fn predictor_section_is_optional() {
        let config = Config::from_json(r#"{ "telegram": { "token": "t" } }"#).unwrap();
        assert_eq!(config.predictor.history_limit, 10);
        assert!(config.telegram.allow_from.is_empty());
    }

    #[test]
    fn invalid_predictor_section_is_rejected() {
        let err = Config::from_json(r#"{ "predictor": { "history_limit": 0 } }"#).unwrap_err();
        assert!(format!("{err:#}").contains("history_limit"));
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BOT_TOKEN", "env-token"),
            ("TARGET_CHANNEL_ID", "-100"),
            ("ADMIN_CHAT_ID", " 42 "),
            ("PREDICTION_CHANNEL_ID", ""),
        ]);
        let config = Config::from_json(Config::TEMPLATE)
            .unwrap()
            .with_env_overrides(|key| env.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.telegram.token, "env-token");
        assert_eq!(config.telegram.source_channel_id, Some(-100));
        assert_eq!(config.telegram.admin_chat_id, Some(42));
        assert_eq!(
            config.telegram.prediction_channel_id,
            Some(-1_009_876_543_210)
        );
    }

    #[test]
    fn non_numeric_chat_id_is_an_error() {
        let result = Config::default().with_env_overrides(|key| {
            (key == "TARGET_CHANNEL_ID").then(|| "channel".to_string())
        });
        assert!(result.is_err());
    }
}
