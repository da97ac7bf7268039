//! Agent registry — static display metadata for every known agent.
//!
//! Lookups are case-insensitive. Unknown agents resolve to a neutral fallback
//! profile so a message can always be sent.

use herald_common::types::AgentProfile;

/// Profile used for any agent not in the table.
pub const FALLBACK_PROFILE: AgentProfile = AgentProfile {
    name: "unknown",
    emoji: "?",
    color: 0x808080,
    role: "Unknown Agent",
    avatar_file: None,
};

/// Agents that are not advertised in the usage listing.
const UNLISTED: &[&str] = &["claude"];

const AGENTS: &[AgentProfile] = &[
    AgentProfile {
        name: "alex",
        emoji: "🩵",
        color: 0x00FFFF,
        role: "Community & Support Orchestrator",
        avatar_file: Some("alex.png"),
    },
    AgentProfile {
        name: "andy",
        emoji: "🟠",
        color: 0xFF8C00,
        role: "Android/Mobile Orchestrator",
        avatar_file: Some("andy.png"),
    },
    AgentProfile {
        name: "charlie",
        emoji: "🔵",
        color: 0x0000FF,
        role: "Backend Orchestrator",
        avatar_file: Some("charlie.png"),
    },
    AgentProfile {
        name: "claude",
        emoji: "🤖",
        color: 0x000000,
        role: "AI Assistant",
        avatar_file: None,
    },
    AgentProfile {
        name: "dexter",
        emoji: "🟣",
        color: 0x800080,
        role: "DevOps & Deployment Orchestrator",
        avatar_file: Some("dexter.png"),
    },
    AgentProfile {
        name: "finn",
        emoji: "💛",
        color: 0xFFFF00,
        role: "Finance & Monetization Orchestrator",
        avatar_file: Some("finn.png"),
    },
    AgentProfile {
        name: "frankie",
        emoji: "🟢",
        color: 0x00FF00,
        role: "Frontend Orchestrator",
        avatar_file: Some("frankie.png"),
    },
    AgentProfile {
        name: "lex",
        emoji: "⚪",
        color: 0x808080,
        role: "Legal & Compliance Orchestrator",
        avatar_file: Some("lex.png"),
    },
    AgentProfile {
        name: "max",
        emoji: "🔴",
        color: 0xFF0000,
        role: "Marketing & Growth Orchestrator",
        avatar_file: Some("max_realistic.png"),
    },
    AgentProfile {
        name: "riley",
        emoji: "🔮",
        color: 0x4B0082,
        role: "Research & Architecture Orchestrator",
        avatar_file: Some("riley.png"),
    },
    AgentProfile {
        name: "sage",
        emoji: "🩷",
        color: 0xFF00FF,
        role: "Design & Brand Orchestrator",
        avatar_file: Some("sage.png"),
    },
    AgentProfile {
        name: "sammy",
        emoji: "🛡️",
        color: 0xC0C0C0,
        role: "Security Orchestrator",
        avatar_file: Some("sammy.png"),
    },
    AgentProfile {
        name: "scribbles",
        emoji: "📜",
        color: 0x8B4513,
        role: "Documentation Orchestrator",
        avatar_file: Some("scribbles_realistic.png"),
    },
    AgentProfile {
        name: "tessa",
        emoji: "🟡",
        color: 0xFFD700,
        role: "Testing & QA Orchestrator",
        avatar_file: Some("tessa.png"),
    },
];

/// Look up an agent by name, ignoring case.
///
/// Returns [`FALLBACK_PROFILE`] for unknown names.
pub fn lookup(name: &str) -> &'static AgentProfile {
    find(name).unwrap_or(&FALLBACK_PROFILE)
}

/// Look up an agent by name, returning `None` for unknown names.
pub fn find(name: &str) -> Option<&'static AgentProfile> {
    let key = name.trim().to_lowercase();
    AGENTS.iter().find(|profile| profile.name == key)
}

/// Known agents advertised in the usage listing, sorted by name.
pub fn listed() -> impl Iterator<Item = &'static AgentProfile> {
    AGENTS
        .iter()
        .filter(|profile| !UNLISTED.contains(&profile.name))
}

/// Agent name with its first character upper-cased and the rest lower-cased.
pub fn display_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let lower = lookup("dexter");
        assert_eq!(lookup("Dexter"), lower);
        assert_eq!(lookup("DEXTER"), lower);
        assert_eq!(lower.emoji, "🟣");
        assert_eq!(lower.color, 0x800080);
        assert_eq!(lower.role, "DevOps & Deployment Orchestrator");
        assert_eq!(lower.avatar_file, Some("dexter.png"));
    }

    #[test]
    fn test_every_known_agent_resolves_to_itself() {
        for profile in AGENTS {
            assert_eq!(lookup(&profile.name.to_uppercase()).name, profile.name);
        }
    }

    #[test]
    fn test_unknown_agent_gets_fallback() {
        let profile = lookup("mystery-bot");
        assert_eq!(profile, &FALLBACK_PROFILE);
        assert_eq!(profile.emoji, "?");
        assert_eq!(profile.color, 0x808080);
        assert_eq!(profile.role, "Unknown Agent");
        assert!(profile.avatar_file.is_none());
        assert!(find("mystery-bot").is_none());
    }

    #[test]
    fn test_claude_uses_default_avatar_and_is_unlisted() {
        assert!(lookup("claude").avatar_file.is_none());
        assert!(listed().all(|p| p.name != "claude"));
    }

    #[test]
    fn test_listing_is_sorted() {
        let names: Vec<&str> = listed().map(|p| p.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), AGENTS.len() - UNLISTED.len());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("dexter"), "Dexter");
        assert_eq!(display_name("SCRIBBLES"), "Scribbles");
        assert_eq!(display_name(""), "");
    }
}
