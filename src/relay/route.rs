use teloxide::types::ChatId;

use crate::platform::InboundEvent;
use crate::relay::identity::extract_sender_id;

/// Chat an owner reply should be copied into, read back from the ticket on
/// the replied-to message. `None` when that message carries no ticket.
pub fn extract_destination(event: &InboundEvent) -> Option<ChatId> {
    let markup = event.reply.as_ref()?.markup.as_ref();
    let id = extract_sender_id(markup)?;
    id.parse::<i64>().ok().map(ChatId)
}
