//! Avatar resolution strategies.
//!
//! A resolver maps an agent name to an image URL the webhook can display.
//! `None` means the webhook's default avatar is used.

use async_trait::async_trait;

use crate::registry;

/// Resolves an agent's avatar URL.
///
/// Implementations never fail: any problem degrades to `None` so that
/// message delivery is never blocked by avatar lookup.
#[async_trait]
pub trait AvatarResolver: Send + Sync {
    async fn resolve(&self, agent: &str) -> Option<String>;
}

/// Static avatars hosted under a fixed base URL (GitHub raw content).
#[derive(Debug, Clone)]
pub struct StaticAvatarResolver {
    base: String,
}

impl StaticAvatarResolver {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Compute the avatar URL without any I/O.
    pub fn url_for(&self, agent: &str) -> Option<String> {
        registry::find(agent)
            .and_then(|profile| profile.avatar_file)
            .map(|file| format!("{}/{}", self.base, file))
    }
}

#[async_trait]
impl AvatarResolver for StaticAvatarResolver {
    async fn resolve(&self, agent: &str) -> Option<String> {
        self.url_for(agent)
    }
}
