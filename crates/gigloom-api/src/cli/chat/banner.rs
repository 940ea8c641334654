//! Welcome banner display for chat sessions.

use console::style;
use gigloom_types::chat::RoomId;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(room: &RoomId, user_name: &str, server: &str) {
    println!();
    println!("  {} {}", style("#").cyan().bold(), style(format!("Room {room}")).cyan().bold());
    println!("  {}  {}", style("Signed in as:").bold(), user_name);
    println!("  {}  {}", style("Server:").bold(), style(server).dim());
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
