//! Main chat loop orchestration.
//!
//! Resolves the local participant, opens the [`ChatSession`], then
//! multiplexes session events and user input until the user leaves or the
//! server asks for a fresh sign-in.

use std::io::Write;
use std::sync::Arc;

use console::style;
use rustyline_async::SharedWriter;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use gigloom_core::chat::{ChatSession, SessionOptions};
use gigloom_core::repository::AccountDirectory;
use gigloom_types::chat::RoomId;
use gigloom_types::error::ApiError;
use gigloom_types::event::SessionEvent;

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{MessageRenderer, prompt_for, send_failure_notice, state_notice};
use super::spinner;

/// What the loop should do after handling one event or line.
enum Flow {
    Continue,
    Leave,
}

/// Run the interactive chat loop for `room`.
pub async fn run_chat_loop(state: &AppState, room: RoomId) -> anyhow::Result<()> {
    let credential = state.credential()?;

    let progress = spinner("signing in...")?;
    let profile = state.rest.fetch_profile(&credential).await;
    progress.finish_and_clear();
    let profile = profile?;

    let (mut session, mut events) = ChatSession::open(
        room.clone(),
        state.auth.as_ref(),
        Arc::clone(&state.rest),
        Arc::clone(&state.transport),
        SessionOptions::from(&state.config),
    )?;
    session.set_participant(profile.id.clone());

    print_welcome_banner(&room, &profile.name, state.rest.base_url());

    let (mut input, mut out) = ChatInput::new(prompt_for(session.state()))
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;
    let mut renderer = MessageRenderer::new(Some(profile.id), state.config.duplicate_window());

    let result = loop {
        let flow = tokio::select! {
            event = events.recv() => match event {
                Ok(event) => on_event(event, &session, &mut input, &mut renderer, &mut out),
                Err(RecvError::Lagged(skipped)) => {
                    // Missed notices are harmless; the timeline snapshot is authoritative.
                    warn!(skipped, "chat display fell behind");
                    let lines = renderer.render_unseen(&session.timeline());
                    print_lines(&mut out, &lines).map(|()| Flow::Continue)
                }
                Err(RecvError::Closed) => Ok(Flow::Leave),
            },
            line = input.read_line() => on_input(line, &session, &mut input, &mut renderer, &mut out),
        };

        match flow {
            Ok(Flow::Continue) => {}
            Ok(Flow::Leave) => break Ok(()),
            Err(err) => break Err(err),
        }
    };

    session.close().await;
    input.flush();
    debug!(room = %room, "left chat room");
    if result.is_ok() {
        println!("\n  {}", style("Session ended.").dim());
    }
    result
}

fn on_event(
    event: SessionEvent,
    session: &ChatSession,
    input: &mut ChatInput,
    renderer: &mut MessageRenderer,
    out: &mut SharedWriter,
) -> anyhow::Result<Flow> {
    match event {
        SessionEvent::MessageReceived { message } => {
            if let Some(line) = renderer.render_new(&message) {
                writeln!(out, "  {line}")?;
            }
        }
        SessionEvent::HistoryLoaded { .. } => {
            let lines = renderer.render_unseen(&session.timeline());
            print_lines(out, &lines)?;
        }
        SessionEvent::HistoryFailed { reason } => {
            writeln!(out, "  {} Failed to load messages: {reason}", style("!").red().bold())?;
        }
        SessionEvent::StateChanged { state } => {
            input.update_prompt(&prompt_for(state));
            writeln!(out, "  {}", state_notice(state))?;
        }
        SessionEvent::ReconnectScheduled { attempt, delay_ms } => {
            writeln!(
                out,
                "  {} Connection lost, retrying in {:.0}s (attempt {attempt})",
                style("~").yellow().bold(),
                delay_ms as f64 / 1000.0
            )?;
        }
        SessionEvent::ReconnectExhausted { attempts } => {
            writeln!(
                out,
                "  {} Unable to connect after {attempts} attempts. Type /quit to leave.",
                style("!").red().bold()
            )?;
        }
        SessionEvent::AuthRequired => {
            return Err(anyhow::Error::new(ApiError::Unauthorized));
        }
        SessionEvent::FrameDropped { reason } => {
            debug!(%reason, "skipped unreadable chat frame");
        }
    }
    Ok(Flow::Continue)
}

fn on_input(
    line: InputEvent,
    session: &ChatSession,
    input: &mut ChatInput,
    renderer: &mut MessageRenderer,
    out: &mut SharedWriter,
) -> anyhow::Result<Flow> {
    let text = match line {
        InputEvent::Eof => return Ok(Flow::Leave),
        InputEvent::Interrupted => {
            writeln!(out, "  {}", style("Press Ctrl+D to exit, or keep chatting.").dim())?;
            return Ok(Flow::Continue);
        }
        InputEvent::Message(text) if text.is_empty() => return Ok(Flow::Continue),
        InputEvent::Message(text) => text,
    };

    if let Some(cmd) = commands::parse(&text) {
        match cmd {
            ChatCommand::Help => write!(out, "{}", commands::help_text())?,
            ChatCommand::Status => {
                writeln!(
                    out,
                    "  {} room {}, {}, {} message{}",
                    style("i").blue().bold(),
                    session.room(),
                    state_notice(session.state()),
                    session.timeline().len(),
                    if session.timeline().len() == 1 { "" } else { "s" }
                )?;
            }
            ChatCommand::Timeline => {
                let lines = renderer.render_all(&session.timeline());
                print_lines(out, &lines)?;
            }
            ChatCommand::Clear => input.clear(),
            ChatCommand::Quit => return Ok(Flow::Leave),
            ChatCommand::Unknown(name) => {
                writeln!(
                    out,
                    "  {} Unknown command: {}. Type /help for available commands.",
                    style("?").yellow().bold(),
                    style(name).dim()
                )?;
            }
        }
        return Ok(Flow::Continue);
    }

    // The message shows up once the server relays it back.
    if let Err(err) = session.send(&text) {
        writeln!(out, "  {}", send_failure_notice(&err))?;
    }
    Ok(Flow::Continue)
}

fn print_lines(out: &mut SharedWriter, lines: &[String]) -> anyhow::Result<()> {
    for line in lines {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}
