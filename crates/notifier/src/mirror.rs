//! Best-effort mirror of agent status into `discord_agent_state`.
//!
//! The mirror never affects delivery: connection and query failures are
//! logged at debug level and dropped.

use async_trait::async_trait;
use sqlx::PgPool;

use herald_common::config::DatabaseConfig;
use herald_common::db;
use herald_common::error::HeraldResult;
use herald_common::types::AgentStatus;

/// Records an agent's latest status somewhere outside the webhook.
#[async_trait]
pub trait StateMirror: Send + Sync {
    async fn mirror(&self, agent: &str, status_glyph: &str, task: &str);
}

/// Mirror used when no datastore is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStateMirror;

#[async_trait]
impl StateMirror for NoopStateMirror {
    async fn mirror(&self, _agent: &str, _status_glyph: &str, _task: &str) {}
}

/// PostgreSQL-backed mirror. Connects lazily on first use.
pub struct PgStateMirror {
    config: DatabaseConfig,
}

impl PgStateMirror {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    async fn write(&self, agent: &str, status: AgentStatus, task: &str) -> HeraldResult<u64> {
        let pool = db::create_pool(&self.config).await?;
        let rows = update_agent_state(&pool, agent, status, task).await;
        pool.close().await;
        rows
    }
}

#[async_trait]
impl StateMirror for PgStateMirror {
    async fn mirror(&self, agent: &str, status_glyph: &str, task: &str) {
        let status = AgentStatus::from_glyph(status_glyph);
        match self.write(agent, status, task).await {
            Ok(rows) => tracing::debug!(agent, %status, rows, "Mirrored agent state"),
            Err(e) => tracing::debug!(agent, error = %e, "Agent state mirror skipped"),
        }
    }
}

/// Update the state row for `agent` (matched lowercased). Returns rows affected.
pub async fn update_agent_state(
    pool: &PgPool,
    agent: &str,
    status: AgentStatus,
    task: &str,
) -> HeraldResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE discord_agent_state
        SET current_status = $1,
            current_task_description = $2,
            last_activity_at = NOW()
        WHERE agent_name = $3
        "#,
    )
    .bind(status)
    .bind(task)
    .bind(agent.trim().to_lowercase())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Pick the mirror implementation for this configuration.
pub fn build_mirror(config: &DatabaseConfig) -> Box<dyn StateMirror> {
    if config.is_configured() {
        Box::new(PgStateMirror::new(config.clone()))
    } else {
        Box::new(NoopStateMirror)
    }
}
