//! CLI command definitions for the `gloom` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod account;
pub mod chat;
pub mod rooms;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use gigloom_types::error::{ApiError, SessionError, TransportError};

/// Chat with the people you hire (or work for) on Gigloom.
#[derive(Parser)]
#[command(name = "gloom", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Marketplace backend URL (overrides config.toml).
    #[arg(long, global = true, env = "GIGLOOM_BASE_URL")]
    pub base_url: Option<String>,

    /// Bearer token; defaults to the GIGLOOM_TOKEN environment variable.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Export trace spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List your conversations.
    #[command(alias = "ls")]
    Rooms,

    /// Print a room's message history.
    History {
        /// Chat room id.
        room: String,
    },

    /// Show the signed-in account.
    Whoami,

    /// Mark the service as complete and close the room.
    Complete {
        /// Chat room id.
        room: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Open an interactive chat in a room.
    Chat {
        /// Chat room id.
        room: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Whether `err` means the credential is missing, expired or rejected.
pub fn is_auth_error(err: &anyhow::Error) -> bool {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return api.is_auth_failure();
    }
    if let Some(transport) = err.downcast_ref::<TransportError>() {
        return transport.is_auth_failure();
    }
    matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::MissingCredential)
    )
}
