//! Builds Discord embed payloads from agent status updates.

use chrono::Utc;

use herald_common::config::DEFAULT_MAX_FIELD_LENGTH;
use herald_common::types::{AgentProfile, EmbedField, NotificationPayload};

use crate::registry;

/// Label of the first message field; later ones read "Details (continued N)".
const FIELD_LABEL: &str = "Details";

/// Formats agent updates into [`NotificationPayload`]s.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    max_field_length: usize,
}

impl MessageFormatter {
    /// `max_field_length` is clamped to at least one character.
    pub fn new(max_field_length: usize) -> Self {
        Self {
            max_field_length: max_field_length.max(1),
        }
    }

    /// Build the payload for one status update.
    ///
    /// When `avatar_url` is present the webhook's username and avatar are
    /// overridden so the message shows up as coming from the agent itself.
    pub fn format(
        &self,
        profile: &AgentProfile,
        agent: &str,
        task: &str,
        status: &str,
        message: &str,
        avatar_url: Option<String>,
    ) -> NotificationPayload {
        let identity = format!("{} {}", profile.emoji, registry::display_name(agent));

        let fields = self
            .chunk(message)
            .into_iter()
            .enumerate()
            .map(|(i, value)| EmbedField {
                name: if i == 0 {
                    FIELD_LABEL.to_string()
                } else {
                    format!("{FIELD_LABEL} (continued {i})")
                },
                value,
                inline: false,
            })
            .collect();

        let username = avatar_url.as_ref().map(|_| identity.clone());

        NotificationPayload {
            title: identity,
            description: format!("**Task**: {task}\n**Status**: {status}"),
            color: profile.color,
            fields,
            username,
            avatar_url,
            timestamp: Utc::now(),
        }
    }

    /// Split `message` into consecutive segments of at most `max_field_length` characters.
    pub fn chunk(&self, message: &str) -> Vec<String> {
        let chars: Vec<char> = message.chars().collect();
        chars
            .chunks(self.max_field_length)
            .map(|segment| segment.iter().collect())
            .collect()
    }
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FIELD_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FALLBACK_PROFILE, lookup};

    #[test]
    fn test_chunk_exact_limit_is_one_field() {
        let formatter = MessageFormatter::default();
        let message = "a".repeat(1024);
        let parts = formatter.chunk(&message);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].chars().count(), 1024);
    }

    #[test]
    fn test_chunk_limit_plus_one_is_two_fields() {
        let formatter = MessageFormatter::default();
        let message = format!("{}z", "a".repeat(1024));
        let parts = formatter.chunk(&message);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1], "z");
    }

    #[test]
    fn test_chunk_empty_message_is_no_fields() {
        assert!(MessageFormatter::default().chunk("").is_empty());
    }

    #[test]
    fn test_chunk_counts_characters_not_bytes() {
        let formatter = MessageFormatter::new(2);
        assert_eq!(formatter.chunk("🟣🟣🟣"), vec!["🟣🟣", "🟣"]);
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        assert_eq!(MessageFormatter::new(0).chunk("ab"), vec!["a", "b"]);
    }

    #[test]
    fn test_format_known_agent() {
        let formatter = MessageFormatter::default();
        let payload = formatter.format(
            lookup("dexter"),
            "dexter",
            "Deploy frontend",
            "✅",
            "Deployment complete!",
            None,
        );

        assert_eq!(payload.title, "🟣 Dexter");
        assert_eq!(payload.description, "**Task**: Deploy frontend\n**Status**: ✅");
        assert_eq!(payload.color, 0x800080);
        assert_eq!(payload.fields.len(), 1);
        assert_eq!(payload.fields[0].name, "Details");
        assert_eq!(payload.fields[0].value, "Deployment complete!");
        assert!(!payload.fields[0].inline);
        assert!(payload.username.is_none());
        assert!(payload.avatar_url.is_none());
    }

    #[test]
    fn test_format_continuation_labels() {
        let formatter = MessageFormatter::new(4);
        let payload = formatter.format(lookup("riley"), "riley", "t", "🔄", "abcdefghij", None);
        let names: Vec<&str> = payload.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Details", "Details (continued 1)", "Details (continued 2)"]
        );
        assert_eq!(payload.fields[2].value, "ij");
    }

    #[test]
    fn test_format_avatar_sets_identity_override() {
        let formatter = MessageFormatter::default();
        let payload = formatter.format(
            lookup("sage"),
            "Sage",
            "Logo",
            "🔄",
            "Sketching",
            Some("https://img.test/sage.png".to_string()),
        );
        assert_eq!(payload.username.as_deref(), Some("🩷 Sage"));
        assert_eq!(payload.avatar_url.as_deref(), Some("https://img.test/sage.png"));
    }

    #[test]
    fn test_format_unknown_agent_uses_fallback() {
        let formatter = MessageFormatter::default();
        let payload = formatter.format(&FALLBACK_PROFILE, "zed", "x", "❌", "", None);
        assert_eq!(payload.title, "? Zed");
        assert_eq!(payload.color, 0x808080);
        assert!(payload.fields.is_empty());
    }
}
