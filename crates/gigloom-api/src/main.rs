//! Gigloom chat client entry point.
//!
//! Binary name: `gloom`
//!
//! Parses CLI arguments, sets up logging and the marketplace clients, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use console::style;
use gigloom_observe::TracingOptions;

use cli::{Cli, Commands};
use state::AppState;

/// Exit code used when the user has to sign in again.
const EXIT_AUTH_REQUIRED: i32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    gigloom_observe::init_tracing(TracingOptions {
        verbosity: cli.verbose,
        quiet: cli.quiet,
        json: cli.json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "gloom", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    gigloom_observe::shutdown_tracing();

    match result {
        Err(err) if cli::is_auth_error(&err) => {
            eprintln!();
            eprintln!(
                "  {} Your session has expired. Log in again and set {} (or pass {}).",
                style("!").red().bold(),
                style("GIGLOOM_TOKEN").yellow(),
                style("--token").yellow()
            );
            eprintln!();
            std::process::exit(EXIT_AUTH_REQUIRED);
        }
        other => other,
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init(cli.base_url.as_deref(), cli.token).await?;

    match cli.command {
        Commands::Rooms => cli::rooms::list_rooms(&state, cli.json).await,
        Commands::History { room } => cli::rooms::show_history(&state, room.into(), cli.json).await,
        Commands::Whoami => cli::account::whoami(&state, cli.json).await,
        Commands::Complete { room, force } => {
            cli::account::complete_room(&state, room.into(), force, cli.json).await
        }
        Commands::Chat { room } => cli::chat::loop_runner::run_chat_loop(&state, room.into()).await,
        Commands::Completions { .. } => Ok(()),
    }
}
