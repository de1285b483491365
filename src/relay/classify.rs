use teloxide::types::UserId;

use crate::platform::InboundEvent;

pub const START_COMMAND: &str = "/start";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    OwnerReply,
    Command,
    SenderMessage,
}

/// First match wins: an owner reply beats the start command.
pub fn classify(event: &InboundEvent, owner: UserId) -> Classification {
    if event.reply.is_some() && event.sender.id == owner {
        Classification::OwnerReply
    } else if event.text.as_deref() == Some(START_COMMAND) {
        Classification::Command
    } else {
        Classification::SenderMessage
    }
}
