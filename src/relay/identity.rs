//! Sender identity and the relay ticket that carries it.
//!
//! The ticket is the inline keyboard attached to every message copied to the
//! owner. Entry [0][0] is a callback button whose data is the sender id; the
//! platform stores it with the copy and hands it back when the owner replies.

use anyhow::{Context, Result};
use reqwest::Url;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardButtonKind, InlineKeyboardMarkup};

use crate::platform::Sender;

pub const LOCKED_ICON: &str = "🔒";
pub const UNLOCKED_ICON: &str = "🔓";

/// Presentation of a ticket. Never changes the recoverable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketVariant {
    /// Label plus a `tg://user` link to the sender's profile
    Revealed,
    /// Label only
    Anonymous,
}

impl TicketVariant {
    pub fn icon(self) -> &'static str {
        match self {
            TicketVariant::Revealed => UNLOCKED_ICON,
            TicketVariant::Anonymous => LOCKED_ICON,
        }
    }
}

impl std::fmt::Display for TicketVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketVariant::Revealed => write!(f, "revealed"),
            TicketVariant::Anonymous => write!(f, "anonymous"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub id: String,
    pub display_name: String,
}

impl SenderIdentity {
    pub fn from_sender(sender: &Sender) -> Self {
        Self {
            id: sender.id.0.to_string(),
            display_name: derive_display_name(sender),
        }
    }
}

/// `@handle` if the sender has one, otherwise first and last name.
pub fn derive_display_name(sender: &Sender) -> String {
    if let Some(handle) = sender.username.as_deref().filter(|h| !h.is_empty()) {
        return format!("@{}", handle);
    }

    [sender.first_name.as_deref(), sender.last_name.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn ticket_label(identity: &SenderIdentity, variant: TicketVariant) -> String {
    format!(
        "{} From: {} ({})",
        variant.icon(),
        identity.display_name,
        identity.id
    )
}

fn profile_url(id: &str) -> Result<Url> {
    Url::parse(&format!("tg://user?id={}", id))
        .with_context(|| format!("Invalid profile link for sender {}", id))
}

pub fn build_ticket(
    identity: &SenderIdentity,
    variant: TicketVariant,
) -> Result<InlineKeyboardMarkup> {
    let mut row = vec![InlineKeyboardButton::callback(
        ticket_label(identity, variant),
        identity.id.clone(),
    )];

    if variant == TicketVariant::Revealed {
        row.push(InlineKeyboardButton::url("👤 Profile", profile_url(&identity.id)?));
    }

    Ok(InlineKeyboardMarkup::new(vec![row]))
}

/// Sender id stored in entry [0][0], if the markup is a well-formed ticket.
pub fn extract_sender_id(markup: Option<&InlineKeyboardMarkup>) -> Option<String> {
    let button = markup?.inline_keyboard.first()?.first()?;
    match &button.kind {
        InlineKeyboardButtonKind::CallbackData(data)
            if !data.is_empty() && data.parse::<i64>().is_ok() =>
        {
            Some(data.clone())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::UserId;

    fn sender(username: Option<&str>, first: Option<&str>, last: Option<&str>) -> Sender {
        Sender {
            id: UserId(42),
            username: username.map(str::to_string),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
        }
    }

    fn identity() -> SenderIdentity {
        SenderIdentity {
            id: "42".to_string(),
            display_name: "@ann".to_string(),
        }
    }

    #[test]
    fn test_display_name_prefers_handle() {
        let s = sender(Some("ann"), Some("Ann"), Some("Lee"));
        assert_eq!(derive_display_name(&s), "@ann");
    }

    #[test]
    fn test_display_name_full_name() {
        let s = sender(None, Some("Ann"), Some("Lee"));
        assert_eq!(derive_display_name(&s), "Ann Lee");
    }

    #[test]
    fn test_display_name_first_only() {
        let s = sender(None, Some("Ann"), None);
        assert_eq!(derive_display_name(&s), "Ann");
    }

    #[test]
    fn test_display_name_empty() {
        assert_eq!(derive_display_name(&sender(None, None, None)), "");
        assert_eq!(derive_display_name(&sender(Some(""), None, None)), "");
    }

    #[test]
    fn test_id_round_trips_for_both_variants() {
        for variant in [TicketVariant::Revealed, TicketVariant::Anonymous] {
            let ticket = build_ticket(&identity(), variant).unwrap();
            assert_eq!(extract_sender_id(Some(&ticket)).as_deref(), Some("42"));
        }
    }

    #[test]
    fn test_anonymous_ticket_has_no_link() {
        let ticket = build_ticket(&identity(), TicketVariant::Anonymous).unwrap();
        assert_eq!(ticket.inline_keyboard.len(), 1);
        assert_eq!(ticket.inline_keyboard[0].len(), 1);
        assert_eq!(ticket.inline_keyboard[0][0].text, "🔒 From: @ann (42)");
    }

    #[test]
    fn test_revealed_ticket_links_profile() {
        let ticket = build_ticket(&identity(), TicketVariant::Revealed).unwrap();
        let row = &ticket.inline_keyboard[0];
        assert_eq!(row[0].text, "🔓 From: @ann (42)");
        assert_eq!(
            row[1].kind,
            InlineKeyboardButtonKind::Url(Url::parse("tg://user?id=42").unwrap())
        );
    }

    #[test]
    fn test_extract_rejects_missing_or_malformed() {
        assert_eq!(extract_sender_id(None), None);
        let no_rows = InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new());
        assert_eq!(extract_sender_id(Some(&no_rows)), None);

        let empty_row = InlineKeyboardMarkup::new(vec![Vec::<InlineKeyboardButton>::new()]);
        assert_eq!(extract_sender_id(Some(&empty_row)), None);

        let link_first = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
            "site",
            Url::parse("https://example.com").unwrap(),
        )]]);
        assert_eq!(extract_sender_id(Some(&link_first)), None);

        let not_numeric =
            InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback("x", "abc")]]);
        assert_eq!(extract_sender_id(Some(&not_numeric)), None);
    }
}
