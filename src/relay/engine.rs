use std::sync::Arc;

use anyhow::Result;
use teloxide::types::{ChatId, UserId};
use tracing::{debug, info, warn};

use crate::platform::{InboundEvent, MessageGateway};
use crate::relay::classify::{classify, Classification};
use crate::relay::identity::{build_ticket, SenderIdentity, TicketVariant};
use crate::relay::route::extract_destination;

/// Ticket variants tried, in order, when copying a sender's message to the owner.
pub const SENDER_ATTEMPTS: [TicketVariant; 2] =
    [TicketVariant::Revealed, TicketVariant::Anonymous];

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// `/start`: nothing to forward
    Acknowledged,
    /// Owner replied to a message without a ticket
    NoRoute,
    Delivered {
        to: ChatId,
        /// Ticket the copy carried; `None` for owner replies
        variant: Option<TicketVariant>,
    },
    /// The platform refused every attempt. Terminal, reported to nobody.
    Rejected {
        to: ChatId,
        description: Option<String>,
    },
}

/// Stateless relay between senders and the owner. Safe to share across
/// concurrent webhook calls.
pub struct RelayEngine {
    gateway: Arc<dyn MessageGateway>,
    owner: UserId,
}

impl RelayEngine {
    pub fn new(gateway: Arc<dyn MessageGateway>, owner: UserId) -> Self {
        Self { gateway, owner }
    }

    fn owner_chat(&self) -> ChatId {
        ChatId::from(self.owner)
    }

    /// Relay one event. `Err` only for transport failures.
    pub async fn relay(&self, event: &InboundEvent) -> Result<DeliveryOutcome> {
        match classify(event, self.owner) {
            Classification::OwnerReply => self.forward_to_sender(event).await,
            Classification::Command => {
                debug!("Start command from {}", event.sender.id.0);
                Ok(DeliveryOutcome::Acknowledged)
            }
            Classification::SenderMessage => self.forward_to_owner(event).await,
        }
    }

    async fn forward_to_sender(&self, event: &InboundEvent) -> Result<DeliveryOutcome> {
        let Some(to) = extract_destination(event) else {
            debug!("Owner replied to a message without a relay ticket, ignoring");
            return Ok(DeliveryOutcome::NoRoute);
        };

        let outcome = self
            .gateway
            .copy_message(to, event.chat_id, event.message_id, None)
            .await?;

        if outcome.ok {
            info!("Relayed owner reply to {}", to);
            Ok(DeliveryOutcome::Delivered { to, variant: None })
        } else {
            warn!(
                "Owner reply to {} rejected: {}",
                to,
                outcome.description.as_deref().unwrap_or("no description")
            );
            Ok(DeliveryOutcome::Rejected {
                to,
                description: outcome.description,
            })
        }
    }

    async fn forward_to_owner(&self, event: &InboundEvent) -> Result<DeliveryOutcome> {
        let identity = SenderIdentity::from_sender(&event.sender);
        let to = self.owner_chat();
        let mut description = None;

        for variant in SENDER_ATTEMPTS {
            let ticket = build_ticket(&identity, variant)?;
            let outcome = self
                .gateway
                .copy_message(to, event.chat_id, event.message_id, Some(ticket))
                .await?;

            if outcome.ok {
                info!("Relayed message from {} to owner ({})", identity.id, variant);
                return Ok(DeliveryOutcome::Delivered {
                    to,
                    variant: Some(variant),
                });
            }

            warn!(
                "Copy from {} with {} ticket rejected: {}",
                identity.id,
                variant,
                outcome.description.as_deref().unwrap_or("no description")
            );
            description = outcome.description;
        }

        Ok(DeliveryOutcome::Rejected { to, description })
    }
}
