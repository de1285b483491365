use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use teloxide::types::UserId;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default = "default_server_config")]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// The single user who receives every relayed message. In a private chat
    /// the user id doubles as the chat id.
    pub owner_id: u64,
    /// Value Telegram echoes back in `X-Telegram-Bot-Api-Secret-Token`.
    pub secret_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Public base URL used by `/registerWebhook`. Registration is refused without it.
    #[serde(default)]
    pub public_url: Option<String>,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_server_config() -> ServerConfig {
    ServerConfig {
        bind_address: default_bind_address(),
        public_url: None,
    }
}

/// Bot API accepts 1-256 characters from `A-Z a-z 0-9 _ -`.
pub fn is_valid_secret_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= 256
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl Config {
    pub fn owner(&self) -> UserId {
        UserId(self.telegram.owner_id)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("telegram.bot_token must not be empty");
        }
        if self.telegram.owner_id == 0 {
            anyhow::bail!("telegram.owner_id must be a real user id");
        }
        if !is_valid_secret_token(&self.telegram.secret_token) {
            anyhow::bail!(
                "telegram.secret_token must be 1-256 characters of A-Z, a-z, 0-9, '_' or '-'"
            );
        }
        if let Some(url) = &self.server.public_url {
            reqwest::Url::parse(url)
                .with_context(|| format!("server.public_url is not a valid URL: {}", url))?;
        }
        Ok(())
    }
}
