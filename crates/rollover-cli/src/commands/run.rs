use super::{connect, load_config};
use crate::output::Output;
use color_eyre::Result;
use owo_colors::OwoColorize;
use rollover_config::PathManager;
use rollover_core::{PlaylistOutcome, PlaylistReport, RolloverResult};
use rollover_models::Episode;
use serde_json::json;

pub async fn run_rollover(dry_run: bool, force: bool, output: &Output) -> Result<()> {
    tracing::debug!(dry_run, force, "Run command started");

    let path_manager = PathManager::default();
    let config = load_config(&path_manager, output)?;

    let mut orchestrator = connect(&config, &path_manager).await?.with_dry_run(dry_run);
    if force {
        orchestrator = orchestrator.with_rewrite_unchanged(true);
    }

    let result = orchestrator.run().await
        .map_err(|e| color_eyre::eyre::eyre!("Rollover failed: {}", e))?;

    if output.is_human() {
        print_human(&result, dry_run, output);
    } else {
        output.json(&json!({
            "success": result.is_success(),
            "dry_run": dry_run,
            "started_at": result.started_at.to_rfc3339(),
            "duration_seconds": result.duration.as_secs_f64(),
            "rolled_over": result.rolled_over(),
            "failed": result.failed(),
            "playlists": result.playlists,
        }));
    }

    if !result.is_success() {
        return Err(color_eyre::eyre::eyre!(
            "{} of {} managed playlists failed",
            result.failed(),
            result.playlists.len()
        ));
    }

    Ok(())
}

fn print_human(result: &RolloverResult, dry_run: bool, output: &Output) {
    if result.playlists.is_empty() {
        output.warn("No managed playlists found");
        return;
    }

    for report in &result.playlists {
        print_report(report, output);
    }

    output.println("");
    let summary = format!(
        "{} playlists processed, {} episodes rolled over in {:.1}s",
        result.playlists.len(),
        result.rolled_over(),
        result.duration.as_secs_f64()
    );
    if dry_run {
        output.info(format!("Dry run: {}. Nothing was changed.", summary));
    } else if result.is_success() {
        output.success(summary);
    } else {
        output.warn(summary);
    }
}

fn print_report(report: &PlaylistReport, output: &Output) {
    match &report.outcome {
        PlaylistOutcome::Updated { episodes, rolled_over } => {
            output.success(format!("{} ({} rolled over)", report.title.bold(), rolled_over));
            print_episodes(episodes, output);
        }
        PlaylistOutcome::DryRun { episodes, rolled_over } => {
            output.info(format!("{} {} ({} would roll over)", "→".bright_blue(), report.title.bold(), rolled_over));
            print_episodes(episodes, output);
        }
        PlaylistOutcome::Unchanged { .. } => {
            output.println(format!("{} {}", "·".bright_black(), format!("{} (nothing watched)", report.title).bright_black()));
        }
        PlaylistOutcome::Failed { error } => {
            output.error(format!("{}: {}", report.title, error));
        }
    }
}

fn print_episodes(episodes: &[Episode], output: &Output) {
    for episode in episodes {
        output.println(format!("    {}", episode));
    }
}
