use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display metadata for a known agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentProfile {
    /// Lowercase registry key
    pub name: &'static str,
    pub emoji: &'static str,
    /// 24-bit RGB accent color
    pub color: u32,
    pub role: &'static str,
    /// Image file name under the static avatar base. `None` means the
    /// webhook's default avatar is used.
    pub avatar_file: Option<&'static str>,
}

/// Agent status as stored in `discord_agent_state.current_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentStatus {
    Idle,
    Working,
    Blocked,
}

impl AgentStatus {
    /// Map a status glyph from the command line to a stored status.
    ///
    /// Unrecognized glyphs count as work in progress.
    pub fn from_glyph(glyph: &str) -> Self {
        match glyph.trim() {
            "✅" | "❌" => AgentStatus::Idle,
            "🔄" => AgentStatus::Working,
            "⚠️" | "⚠" => AgentStatus::Blocked,
            _ => AgentStatus::Working,
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Idle => write!(f, "IDLE"),
            AgentStatus::Working => write!(f, "WORKING"),
            AgentStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}

/// One embed field. Discord renders these in order below the description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Notification ready for webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Emoji plus display name (e.g., "🟣 Dexter")
    pub title: String,
    /// Task and status lines
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    /// Overrides the webhook's bot name when an avatar is attached
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a single webhook POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub success: bool,
    /// HTTP status and body, or the transport error, on failure
    pub detail: Option<String>,
}

impl DeliveryResult {
    pub fn delivered() -> Self {
        Self {
            success: true,
            detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: Some(detail.into()),
        }
    }
}
