//! Notification pipeline: registry → state mirror → avatar → formatter → delivery.

use herald_common::config::{AvatarSource, HeraldConfig};
use herald_common::error::HeraldResult;
use herald_common::types::{DeliveryResult, NotificationPayload};

use crate::avatar::{AvatarResolver, StaticAvatarResolver};
use crate::delivery::{DELIVERY_TIMEOUT, DeliveryClient};
use crate::formatter::MessageFormatter;
use crate::mirror::{self, StateMirror};
use crate::registry;
use crate::taiga::TaigaAvatarResolver;
use crate::transport;

/// A single status update reported by an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentUpdate {
    pub agent: String,
    pub task: String,
    /// Status glyph, e.g. "✅" or "🔄"
    pub status: String,
    pub message: String,
}

/// Everything needed to turn an [`AgentUpdate`] into a delivered message.
pub struct Notifier {
    avatars: Box<dyn AvatarResolver>,
    formatter: MessageFormatter,
    delivery: DeliveryClient,
    mirror: Box<dyn StateMirror>,
}

impl Notifier {
    pub fn new(
        avatars: Box<dyn AvatarResolver>,
        formatter: MessageFormatter,
        delivery: DeliveryClient,
        mirror: Box<dyn StateMirror>,
    ) -> Self {
        Self {
            avatars,
            formatter,
            delivery,
            mirror,
        }
    }

    /// Wire up the avatar strategy, transport and mirror chosen by configuration.
    pub fn from_config(config: &HeraldConfig) -> HeraldResult<Self> {
        let avatars: Box<dyn AvatarResolver> = match (config.avatar_source, &config.taiga) {
            (AvatarSource::Taiga, Some(taiga)) => {
                Box::new(TaigaAvatarResolver::new(taiga.clone())?)
            }
            _ => Box::new(StaticAvatarResolver::new(&config.github_avatar_base)),
        };

        let transport = transport::build_transport(config.transport, DELIVERY_TIMEOUT)?;

        tracing::debug!(
            avatar_source = ?config.avatar_source,
            transport = ?config.transport,
            mirror = config.database.is_configured(),
            "Notifier configured"
        );

        Ok(Self::new(
            avatars,
            MessageFormatter::new(config.max_field_length),
            DeliveryClient::new(transport, &config.webhook_url),
            mirror::build_mirror(&config.database),
        ))
    }

    /// Resolve the agent's avatar and format the payload without sending it.
    pub async fn build_payload(&self, update: &AgentUpdate) -> NotificationPayload {
        let profile = registry::lookup(&update.agent);
        let avatar_url = self.avatars.resolve(&update.agent).await;

        self.formatter.format(
            profile,
            &update.agent,
            &update.task,
            &update.status,
            &update.message,
            avatar_url,
        )
    }

    /// Mirror the status, then format and deliver the message.
    ///
    /// Only the delivery outcome is reported; mirror and avatar failures
    /// degrade silently.
    pub async fn notify(&self, update: &AgentUpdate) -> DeliveryResult {
        self.mirror
            .mirror(&update.agent, &update.status, &update.task)
            .await;

        let payload = self.build_payload(update).await;
        let result = self.delivery.send(&payload).await;

        if result.success {
            tracing::info!(agent = %update.agent, task = %update.task, "Posted to Discord");
        } else {
            tracing::error!(
                agent = %update.agent,
                detail = result.detail.as_deref().unwrap_or_default(),
                "Failed to post to Discord"
            );
        }
        result
    }
}
