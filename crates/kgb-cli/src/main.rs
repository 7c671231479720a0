//! kgb-notify - send notifications to a KGB relay
//!
//! ## Commands
//!
//! - `relay`: relay a free-text message
//! - `commit`: send a structured commit notification
//!
//! Connection settings come from `--uri`/`--project`/`--password` or the
//! `KGB_URI`/`KGB_PROJECT`/`KGB_PASSWORD` environment variables.

mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kgb_client::config::{DEFAULT_URI, ENV_PASSWORD, ENV_PROJECT, ENV_TIMEOUT_SECS, ENV_URI};
use kgb_client::{AuthenticatedSession, Change, ClientConfig, CommitNotification};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "kgb-notify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Send commit notifications and messages to a KGB relay", long_about = None)]
struct Cli {
    /// Relay base address
    #[arg(long, env = ENV_URI, default_value = DEFAULT_URI, global = true)]
    uri: String,

    /// Project id registered with the relay
    #[arg(long, env = ENV_PROJECT, global = true)]
    project: Option<String>,

    /// Project password
    #[arg(long, env = ENV_PASSWORD, hide_env_values = true, global = true)]
    password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = ENV_TIMEOUT_SECS, global = true)]
    timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relay a free-text message
    Relay {
        /// Message words, joined with spaces
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Send a commit notification
    Commit {
        /// Commit author
        #[arg(short, long)]
        author: String,

        /// Commit log message
        #[arg(short, long)]
        log: String,

        /// Commit id
        #[arg(long, default_value = "")]
        commit_id: String,

        /// Revision prefix shown before the commit id
        #[arg(long, default_value = "")]
        rev_prefix: String,

        /// Branch the commit landed on
        #[arg(short, long, default_value = "")]
        branch: String,

        /// Module or sub-project
        #[arg(short, long, default_value = "")]
        module: String,

        /// Changed path, optionally prefixed with (A), (M) or (D) and suffixed with +
        #[arg(short, long = "change")]
        changes: Vec<Change>,

        /// Link to the commit in a web viewer
        #[arg(long)]
        web_link: Option<String>,

        /// Ask the relay to use IRC notices
        #[arg(long)]
        irc_notices: bool,

        /// Ask the relay to colorize its output
        #[arg(long)]
        color: bool,
    },
}

impl Cli {
    fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(
            &self.uri,
            self.project.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        );
        if let Some(secs) = self.timeout {
            config = config.with_timeout(secs);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    telemetry::init_tracing(cli.json, level);

    let session = cli
        .config()
        .session()
        .context("Failed to configure KGB client")?;

    match cli.command {
        Commands::Relay { message } => cmd_relay(&session, &message.join(" ")).await,
        Commands::Commit {
            author,
            log,
            commit_id,
            rev_prefix,
            branch,
            module,
            changes,
            web_link,
            irc_notices,
            color,
        } => {
            let mut commit = CommitNotification::new(&author, &log)
                .with_commit_id(&commit_id)
                .with_rev_prefix(&rev_prefix)
                .with_branch(&branch)
                .with_module(&module)
                .with_changes(changes);
            if let Some(url) = web_link {
                commit = commit.with_web_link(&url);
            }
            if irc_notices {
                commit = commit.with_irc_notices(true);
            }
            if color {
                commit = commit.with_color(true);
            }
            cmd_commit(&session, &commit).await
        }
    }
}

async fn cmd_relay(session: &AuthenticatedSession, message: &str) -> Result<()> {
    session
        .relay_message(message)
        .await
        .context("Failed to relay message")?;

    info!(project = %session.project_id(), "Message relayed");
    Ok(())
}

async fn cmd_commit(session: &AuthenticatedSession, commit: &CommitNotification) -> Result<()> {
    session
        .commit(commit)
        .await
        .with_context(|| format!("Failed to send commit notification for {}", commit.commit_id))?;

    info!(
        project = %session.project_id(),
        commit = %commit.commit_id,
        changes = commit.changes.len(),
        "Commit notification sent"
    );
    Ok(())
}
