//! Slash command parsing for the chat loop.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    /// Show connection state and timeline size.
    Status,
    /// Reprint the whole timeline.
    Timeline,
    Clear,
    Quit,
    Unknown(String),
}

/// Parse user input as a slash command; `None` for ordinary messages.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/status" => Some(ChatCommand::Status),
        "/timeline" | "/history" => Some(ChatCommand::Timeline),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/quit" | "/exit" | "/q" => Some(ChatCommand::Quit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Help text listing all available commands.
pub fn help_text() -> String {
    let rows = [
        ("/help", "Show this help message"),
        ("/status", "Show connection status"),
        ("/timeline", "Reprint the conversation"),
        ("/clear", "Clear the screen"),
        ("/quit", "Leave the room"),
    ];

    let mut out = format!("\n  {}\n\n", style("Available commands:").bold());
    for (name, description) in rows {
        out.push_str(&format!("  {:<10} {}\n", style(name).cyan(), description));
    }
    out.push_str(&format!(
        "\n  {}\n",
        style("Messages typed while offline are not sent; retype them once reconnected.").dim()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/h"), Some(ChatCommand::Help));
        assert_eq!(parse("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse("  /Q  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn test_parse_status_and_timeline() {
        assert_eq!(parse("/status"), Some(ChatCommand::Status));
        assert_eq!(parse("/timeline"), Some(ChatCommand::Timeline));
        assert_eq!(parse("/history extra"), Some(ChatCommand::Timeline));
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("hello world"), None);
        assert_eq!(parse("see /help"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/foo bar"), Some(ChatCommand::Unknown("/foo".to_string())));
    }

    #[test]
    fn test_help_lists_commands() {
        let text = help_text();
        for name in ["/help", "/status", "/timeline", "/quit"] {
            assert!(text.contains(name), "missing {name}");
        }
    }
}
