//! Account commands: whoami, complete.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;
use gigloom_core::repository::AccountDirectory;
use gigloom_types::chat::RoomId;

use crate::state::AppState;

/// Show the signed-in account.
pub async fn whoami(state: &AppState, json: bool) -> Result<()> {
    let credential = state.credential()?;
    let profile = state.rest.fetch_profile(&credential).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&profile.name).cyan().bold());
    println!("  {}  {}", style("Id:").bold(), profile.id);
    if let Some(phone) = &profile.phone_number {
        println!("  {}  {}", style("Phone:").bold(), phone);
    }
    println!("  {}  {}", style("Server:").bold(), style(state.rest.base_url()).dim());
    println!(
        "  {}  {}",
        style("Config:").bold(),
        style(state.data_dir.join("config.toml").display()).dim()
    );
    println!();

    Ok(())
}

/// Close a room once the service is complete.
pub async fn complete_room(state: &AppState, room: RoomId, force: bool, json: bool) -> Result<()> {
    let credential = state.credential()?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Mark the service in room {} as complete and close the chat?",
                style(&room).bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.rest.close_room(&room, &credential).await?;
    tracing::info!(room = %room, "room closed");

    if json {
        println!("{}", serde_json::json!({"closed": true, "room": room}));
    } else {
        println!(
            "  {} Service completed, room {} closed.",
            style("✓").green().bold(),
            style(&room).bold()
        );
    }

    Ok(())
}
