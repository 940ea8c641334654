//! Interactive chat for one room.
//!
//! Live messages, connection notices and slash commands share one terminal
//! through rustyline-async. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// A steady-ticking spinner with `message`.
pub fn spinner(message: &'static str) -> anyhow::Result<ProgressBar> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    Ok(bar)
}
