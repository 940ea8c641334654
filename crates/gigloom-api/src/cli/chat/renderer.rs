//! Message formatting for the terminal.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Local;
use console::style;
use gigloom_types::chat::{ChatMessage, ConnectionState, MessageId, ParticipantId};
use gigloom_types::error::SendError;

/// Formats timeline entries, labelling the local participant's messages.
///
/// Also remembers which entries were already shown, so a history page that
/// arrives after live messages only prints what is new. A stored record that
/// replaced a live echo carries a different id, so entries are also matched
/// by sender, text and time within `window`.
pub struct MessageRenderer {
    me: Option<ParticipantId>,
    window: Duration,
    shown_ids: HashSet<MessageId>,
    shown: Vec<ChatMessage>,
}

impl MessageRenderer {
    pub fn new(me: Option<ParticipantId>, window: Duration) -> Self {
        Self {
            me,
            window,
            shown_ids: HashSet::new(),
            shown: Vec::new(),
        }
    }

    fn mark_shown(&mut self, message: &ChatMessage) {
        if self.shown_ids.insert(message.id.clone()) {
            self.shown.push(message.clone());
        }
    }

    fn author(&self, message: &ChatMessage) -> String {
        if self.me.as_ref() == Some(&message.sender_id) {
            return style("You").green().bold().to_string();
        }
        let name = message
            .sender_name
            .clone()
            .unwrap_or_else(|| format!("user {}", message.sender_id));
        style(name).cyan().bold().to_string()
    }

    /// One line: `HH:MM author: text`, in local time.
    pub fn render(&self, message: &ChatMessage) -> String {
        let time = message.created_at.with_timezone(&Local).format("%H:%M");
        format!(
            "{} {}: {}",
            style(time).dim(),
            self.author(message),
            message.text
        )
    }

    /// Render `message` unless it was rendered before.
    pub fn render_new(&mut self, message: &ChatMessage) -> Option<String> {
        if self.shown_ids.contains(&message.id) {
            return None;
        }
        let seen = self
            .shown
            .iter()
            .any(|shown| message.is_duplicate_of(shown, self.window));
        self.mark_shown(message);
        (!seen).then(|| self.render(message))
    }

    /// Render every not-yet-shown entry of `timeline`, in order.
    pub fn render_unseen(&mut self, timeline: &[ChatMessage]) -> Vec<String> {
        timeline.iter().filter_map(|m| self.render_new(m)).collect()
    }

    /// Render the whole timeline again and mark it all as shown.
    pub fn render_all(&mut self, timeline: &[ChatMessage]) -> Vec<String> {
        let mut lines = Vec::with_capacity(timeline.len());
        for message in timeline {
            self.mark_shown(message);
            lines.push(self.render(message));
        }
        lines
    }
}

/// A short, styled connection notice.
pub fn state_notice(state: ConnectionState) -> String {
    match state {
        ConnectionState::Connecting => style("connecting...").dim().to_string(),
        ConnectionState::Open => style("connected").green().to_string(),
        ConnectionState::Closed => style("disconnected").yellow().to_string(),
    }
}

/// Notice for a rejected send. The line stays in input history, so it can be
/// recalled with the up arrow.
pub fn send_failure_notice(err: &SendError) -> String {
    format!(
        "{} Not sent: {err}. {}",
        style("!").yellow().bold(),
        style("Press \u{2191} to retry.").dim()
    )
}

/// Prompt reflecting whether sends are currently possible.
pub fn prompt_for(state: ConnectionState) -> String {
    if state.is_open() {
        format!("  {} ", style("You >").green().bold())
    } else {
        format!("  {} ", style("offline >").dim())
    }
}
