//! `agent-notify` binary entrypoint.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use herald_common::config::HeraldConfig;
use herald_notifier::cli;
use herald_notifier::pipeline::{AgentUpdate, Notifier};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing on stderr; stdout only carries the result line
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("herald_notifier=info,herald_common=info")
        }))
        .with_writer(std::io::stderr)
        .init();

    let update: AgentUpdate = match cli::parse(std::env::args_os()) {
        Ok(cli) => cli.into(),
        Err(usage) => {
            println!("{}", usage.text.trim_end());
            return Ok(if usage.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
    };

    // Fails before any network activity when the webhook is missing
    let config = HeraldConfig::from_env()?;
    let notifier = Notifier::from_config(&config)?;

    let result = notifier.notify(&update).await;
    if result.success {
        println!("Posted to Discord: {} - {}", update.agent, update.task);
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "Failed to post to Discord: {}",
            result.detail.as_deref().unwrap_or("unknown error")
        );
        Ok(ExitCode::FAILURE)
    }
}
