//! Command-line surface for `agent-notify`.

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};

use crate::pipeline::AgentUpdate;
use crate::registry;

const ENVIRONMENT_HELP: &str = "\
Environment variables:
  DISCORD_AGENT_WEBHOOK_URL  Discord webhook URL (required)
  HERALD_TRANSPORT           reqwest (default) or raw
  AVATAR_SOURCE              github or taiga (default: taiga when TAIGA_API_URL is set)
  GITHUB_AVATAR_BASE         Base URL of the static avatar images
  TAIGA_API_URL              Taiga API root, e.g. http://192.168.1.13:8080/api/v1
  TAIGA_EXTERNAL_URL         Public Taiga URL used for avatar links
  TAIGA_INTERNAL_HOST        Internal host[:port] rewritten in avatar links
  TAIGA_USERNAME             Taiga username for authentication
  TAIGA_PASSWORD             Taiga password for authentication
  TAIGA_PROJECT_ID           Project whose members are searched (default: 1)
  DATABASE_URL, DB_HOST, DB_PORT, DB_NAME, DB_USER, DB_PASSWORD
                             Optional agent state mirror";

/// Post an agent task-status update to Discord.
#[derive(Debug, Parser)]
#[command(
    name = "agent-notify",
    version,
    after_help = "Example:\n  agent-notify Dexter 'Deploy frontend' '✅' 'Deployment complete!'"
)]
pub struct Cli {
    /// Name of the agent (alex, andy, charlie, dexter, ...)
    #[arg(allow_hyphen_values = true)]
    pub agent: String,

    /// Brief task description
    #[arg(allow_hyphen_values = true)]
    pub task: String,

    /// Status emoji (e.g. '✅' '🔄' '⚠️' '❌')
    #[arg(allow_hyphen_values = true)]
    pub status: String,

    /// Detailed message content
    #[arg(allow_hyphen_values = true)]
    pub message: String,

    /// Anything after the message is accepted and ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub ignored: Vec<String>,
}

/// Text to print when parsing does not produce an update.
#[derive(Debug)]
pub struct Usage {
    pub text: String,
    /// `--version` exits 0; usage errors and `--help` exit 1.
    pub success: bool,
}

impl From<Cli> for AgentUpdate {
    fn from(cli: Cli) -> Self {
        AgentUpdate {
            agent: cli.agent,
            task: cli.task,
            status: cli.status,
            message: cli.message,
        }
    }
}

/// One line per advertised agent: `{emoji} {Name:12} - {role}`.
pub fn agent_listing() -> String {
    let mut listing = String::from("Available agents:\n");
    for profile in registry::listed() {
        listing.push_str(&format!(
            "  {} {:12} - {}\n",
            profile.emoji,
            registry::display_name(profile.name),
            profile.role
        ));
    }
    listing
}

fn command() -> clap::Command {
    Cli::command().after_long_help(format!(
        "Example:\n  agent-notify Dexter 'Deploy frontend' '✅' 'Deployment complete!'\n\n{ENVIRONMENT_HELP}\n\n{}",
        agent_listing()
    ))
}

/// Parse arguments. On failure (including `--help` and `--version`) returns
/// the text to print and whether the process should exit successfully.
pub fn parse<I, T>(args: I) -> Result<Cli, Usage>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = command();
    let matches = match command.try_get_matches_from_mut(args) {
        Ok(matches) => matches,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            return Err(Usage {
                text: e.to_string(),
                success: true,
            });
        }
        Err(_) => {
            return Err(Usage {
                text: command.render_long_help().to_string(),
                success: false,
            });
        }
    };
    Cli::from_arg_matches(&matches).map_err(|e| Usage {
        text: e.to_string(),
        success: false,
    })
}
