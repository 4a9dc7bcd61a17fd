use super::{connect, load_config};
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use rollover_config::PathManager;
use serde_json::json;

pub async fn list_playlists(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager, output)?;
    let orchestrator = connect(&config, &path_manager).await?;

    let playlists = orchestrator.source().list_playlists().await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to list playlists: {}", e))?;

    if !output.is_human() {
        let entries: Vec<_> = playlists
            .iter()
            .map(|p| json!({
                "rating_key": p.rating_key,
                "title": p.title,
                "type": p.playlist_type,
                "items": p.leaf_count,
                "managed": orchestrator.is_managed(p),
            }))
            .collect();
        output.json(&json!({ "playlists": entries }));
        return Ok(());
    }

    if output.is_quiet() {
        return Ok(());
    }

    if playlists.is_empty() {
        output.warn("The server has no playlists");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Playlist").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Type").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Items").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Managed").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for playlist in &playlists {
        table.add_row(vec![
            Cell::new(&playlist.title),
            Cell::new(&playlist.playlist_type),
            Cell::new(playlist.leaf_count.map(|n| n.to_string()).unwrap_or_default()),
            Cell::new(if orchestrator.is_managed(playlist) { "✓".green().to_string() } else { "✗".red().to_string() }),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);

    let managed = playlists.iter().filter(|p| orchestrator.is_managed(p)).count();
    output.info(format!(
        "{} of {} playlists carry the marker '{}'",
        managed,
        playlists.len(),
        config.rollover.managed_marker
    ));

    Ok(())
}
