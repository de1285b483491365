pub mod telegram;

#[cfg(test)]
pub mod fake;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId, UserId};

/// The user who sent an inbound message
#[derive(Debug, Clone, PartialEq)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// The message an inbound message replies to
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplyContext {
    /// Inline keyboard attached to the replied-to message, as stored by the platform
    pub markup: Option<InlineKeyboardMarkup>,
}

/// A message received from the platform, reduced to what the relay needs
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub sender: Sender,
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub reply: Option<ReplyContext>,
    pub text: Option<String>,
}

/// Result of a copyMessage call the platform answered
#[derive(Debug, Clone, PartialEq)]
pub struct CopyOutcome {
    pub ok: bool,
    pub description: Option<String>,
}

impl CopyOutcome {
    pub fn delivered() -> Self {
        Self {
            ok: true,
            description: None,
        }
    }

    pub fn rejected(description: impl Into<String>) -> Self {
        Self {
            ok: false,
            description: Some(description.into()),
        }
    }
}

/// Outbound message copying.
///
/// `Ok` means the platform answered, successfully or not. `Err` is reserved for
/// transport failures (network, unparsable response).
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn copy_message(
        &self,
        to: ChatId,
        from_chat: ChatId,
        message_id: MessageId,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<CopyOutcome>;
}

/// Webhook (de)registration against the platform
#[async_trait]
pub trait WebhookRegistry: Send + Sync {
    async fn register(&self, url: Url, secret_token: &str) -> Result<()>;
    async fn unregister(&self) -> Result<()>;
}
