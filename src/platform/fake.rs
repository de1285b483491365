//! Scripted in-memory gateway for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId};

use crate::platform::{CopyOutcome, MessageGateway, WebhookRegistry};

#[derive(Debug, Clone)]
pub enum Scripted {
    Deliver,
    Reject(&'static str),
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyCall {
    pub to: ChatId,
    pub from_chat: ChatId,
    pub message_id: MessageId,
    pub markup: Option<InlineKeyboardMarkup>,
}

/// Answers copy calls from a script (delivering once it runs out) and records them.
#[derive(Default)]
pub struct FakeGateway {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<CopyCall>>,
    webhook: Mutex<Option<(Url, String)>>,
}

impl FakeGateway {
    pub fn scripted(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<CopyCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn webhook(&self) -> Option<(Url, String)> {
        self.webhook.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageGateway for FakeGateway {
    async fn copy_message(
        &self,
        to: ChatId,
        from_chat: ChatId,
        message_id: MessageId,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<CopyOutcome> {
        self.calls.lock().unwrap().push(CopyCall {
            to,
            from_chat,
            message_id,
            markup,
        });

        let next = self.script.lock().unwrap().pop_front();
        match next.unwrap_or(Scripted::Deliver) {
            Scripted::Deliver => Ok(CopyOutcome::delivered()),
            Scripted::Reject(description) => Ok(CopyOutcome::rejected(description)),
            Scripted::Fail => anyhow::bail!("connection reset"),
        }
    }
}

#[async_trait]
impl WebhookRegistry for FakeGateway {
    async fn register(&self, url: Url, secret_token: &str) -> Result<()> {
        *self.webhook.lock().unwrap() = Some((url, secret_token.to_string()));
        Ok(())
    }

    async fn unregister(&self) -> Result<()> {
        *self.webhook.lock().unwrap() = None;
        Ok(())
    }
}
