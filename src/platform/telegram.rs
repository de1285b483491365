use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use teloxide::payloads::{CopyMessageSetters, SetWebhookSetters};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId, User};
use teloxide::RequestError;
use tracing::{debug, info};

use crate::platform::{
    CopyOutcome, InboundEvent, MessageGateway, ReplyContext, Sender, WebhookRegistry,
};

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl From<&User> for Sender {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.as_deref().and_then(non_empty),
            first_name: non_empty(&user.first_name),
            last_name: user.last_name.as_deref().and_then(non_empty),
        }
    }
}

impl InboundEvent {
    /// Build an event from a Telegram message. Messages without a sender
    /// (channel posts, anonymous admins) yield `None`.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let sender = Sender::from(msg.from.as_ref()?);
        let reply = msg.reply_to_message().map(|replied| ReplyContext {
            markup: replied.reply_markup().cloned(),
        });

        Some(Self {
            sender,
            chat_id: msg.chat.id,
            message_id: msg.id,
            reply,
            text: msg.text().map(str::to_string),
        })
    }
}

/// Bot API client for the relay
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot_token: &str) -> Self {
        Self {
            bot: Bot::new(bot_token),
        }
    }
}

/// Whether the platform answered at all. Everything else is a rejection.
fn is_transport_failure(err: &RequestError) -> bool {
    matches!(
        err,
        RequestError::Network(_) | RequestError::InvalidJson { .. } | RequestError::Io(_)
    )
}

#[async_trait]
impl MessageGateway for TelegramGateway {
    async fn copy_message(
        &self,
        to: ChatId,
        from_chat: ChatId,
        message_id: MessageId,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<CopyOutcome> {
        let mut request = self.bot.copy_message(to, from_chat, message_id);
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }

        match request.await {
            Ok(copied) => {
                debug!("Copied message {} to {} as {}", message_id.0, to, copied.0);
                Ok(CopyOutcome::delivered())
            }
            Err(e) if is_transport_failure(&e) => {
                Err(anyhow::Error::new(e).context("copyMessage transport failure"))
            }
            Err(e) => Ok(CopyOutcome::rejected(e.to_string())),
        }
    }
}

#[async_trait]
impl WebhookRegistry for TelegramGateway {
    async fn register(&self, url: Url, secret_token: &str) -> Result<()> {
        info!("Registering webhook at {}", url);
        self.bot
            .set_webhook(url)
            .secret_token(secret_token)
            .await
            .context("setWebhook failed")?;
        Ok(())
    }

    async fn unregister(&self) -> Result<()> {
        info!("Removing webhook");
        self.bot
            .delete_webhook()
            .await
            .context("deleteWebhook failed")?;
        Ok(())
    }
}
