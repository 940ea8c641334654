//! Room commands: list conversations, print a room's history.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use gigloom_core::chat::Timeline;
use gigloom_core::repository::{AccountDirectory, HistoryStore};
use gigloom_types::chat::RoomId;

use crate::cli::chat::renderer::MessageRenderer;
use crate::cli::chat::spinner;
use crate::state::AppState;

/// List the signed-in user's conversations.
pub async fn list_rooms(state: &AppState, json: bool) -> Result<()> {
    let credential = state.credential()?;
    let rooms = state.rest.list_rooms(&credential).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rooms)?);
        return Ok(());
    }

    if rooms.is_empty() {
        println!();
        println!(
            "  {} No conversations yet. Contact a seller from a gig to start one.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Room").fg(Color::White),
        Cell::new("With").fg(Color::White),
        Cell::new("Last message").fg(Color::White),
        Cell::new("When").fg(Color::White),
    ]);

    for room in &rooms {
        table.add_row(vec![
            Cell::new(room.room_id.as_str()).fg(Color::Cyan),
            Cell::new(&room.other_person_name),
            Cell::new(room.last_message.as_deref().unwrap_or("-")),
            Cell::new(room.last_message_time.as_deref().unwrap_or("")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} conversation{}  {}",
        style(rooms.len()).bold(),
        if rooms.len() == 1 { "" } else { "s" },
        style("open one with: gloom chat <room>").dim()
    );
    println!();

    Ok(())
}

/// Print a room's history once and exit.
pub async fn show_history(state: &AppState, room: RoomId, json: bool) -> Result<()> {
    let credential = state.credential()?;

    let progress = (!json).then(|| spinner("loading messages...")).transpose()?;
    let fetched = state.rest.fetch_messages(&room, &credential).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let mut timeline = Timeline::new(state.config.duplicate_window());
    timeline.merge_history(fetched?);

    if json {
        println!("{}", serde_json::to_string_pretty(timeline.entries())?);
        return Ok(());
    }

    if timeline.is_empty() {
        println!();
        println!("  {} No messages in room {} yet.", style("i").blue().bold(), room);
        println!();
        return Ok(());
    }

    // Own messages can only be labelled when the profile lookup succeeds.
    let me = state.rest.fetch_profile(&credential).await.ok().map(|p| p.id);
    let renderer = MessageRenderer::new(me, state.config.duplicate_window());

    println!();
    for message in timeline.entries() {
        println!("  {}", renderer.render(message));
    }
    println!();
    println!(
        "  {} message{}",
        style(timeline.len()).bold(),
        if timeline.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
