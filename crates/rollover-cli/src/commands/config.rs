use super::{load_credentials, prompts};
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use rollover_config::credentials::PLEX_TOKEN_ENV;
use rollover_config::{Config, PathManager};
use rollover_sources::plex::auth;
use serde_json::json;
use std::path::PathBuf;

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output),
        crate::ConfigCommands::Plex { token, server_url, server_id } => {
            configure_plex(token, server_url, server_id, output).await
        }
        crate::ConfigCommands::Rollover { lookahead_seasons, managed_marker, rewrite_unchanged } => {
            configure_rollover(lookahead_seasons, managed_marker, rewrite_unchanged, output)
        }
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Configuration will be created when you run 'plex-rollover config plex'.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let cred_store = load_credentials(&path_manager)?;

    let token_from_env = std::env::var(PLEX_TOKEN_ENV).map(|t| !t.trim().is_empty()).unwrap_or(false);
    let token = cred_store.resolve_plex_token().unwrap_or_default();
    let token_display = if full { token } else { mask_string(&token) };
    let token_source = if token_from_env { PLEX_TOKEN_ENV } else { "credentials file" };
    let scheduler = config.scheduler.clone().unwrap_or_else(rollover_config::default_scheduler_config);

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "plex": {
                "server_url": config.plex.server_url,
                "server_id": config.plex.server_id,
                "timeout_seconds": config.plex.timeout_seconds,
                "token": token_display,
                "token_source": token_source,
            },
            "rollover": {
                "lookahead_seasons": config.rollover.lookahead_seasons,
                "managed_marker": config.rollover.managed_marker,
                "rewrite_unchanged": config.rollover.rewrite_unchanged,
            },
            "scheduler": {
                "schedule": scheduler.schedule,
                "run_on_startup": scheduler.run_on_startup,
            },
        }));
        return Ok(());
    }

    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}", "Configuration".bright_cyan().bold());
    println!();

    let mut info_table = Table::new();
    info_table.set_header(vec![
        Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(config_file.display().to_string()),
    ]);
    print_table(info_table);

    print_section_table("Plex", vec![
        ("Server URL", or_placeholder(&config.plex.server_url, "<discover via plex.tv>")),
        ("Server ID", or_placeholder(&config.plex.server_id, "<ask the server>")),
        ("Timeout", format!("{}s", config.plex.timeout_seconds)),
        ("Token", format!("{} ({})", token_display, token_source)),
    ]);

    print_section_table("Rollover", vec![
        ("Lookahead Seasons", config.rollover.lookahead_seasons.to_string()),
        ("Managed Marker", config.rollover.managed_marker.clone()),
        ("Rewrite Unchanged", check_mark(config.rollover.rewrite_unchanged)),
    ]);

    print_section_table("Scheduler", vec![
        ("Schedule", scheduler.schedule.clone()),
        ("Run on Startup", check_mark(scheduler.run_on_startup)),
    ]);

    Ok(())
}

async fn configure_plex(
    token_arg: Option<String>,
    server_url_arg: Option<String>,
    server_id_arg: Option<String>,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager.ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let config_file = path_manager.config_file();
    let mut config = load_or_default(&config_file, output)?;
    let mut cred_store = load_credentials(&path_manager)?;
    let interactive = token_arg.is_none();

    print_section_header("Plex Setup", output);
    print_instruction_list(&[
        "Your Plex token can be found by inspecting network requests in Plex Web (X-Plex-Token)",
        "Leave the server URL empty to discover your server through plex.tv",
        "The server ID is fetched from the server when left empty",
    ], output);
    output.println("");

    let token = match token_arg {
        Some(t) => t.trim().to_string(),
        None => {
            let has_existing = cred_store.get_plex_token().is_some();
            loop {
                let input = prompts::prompt_secret("Plex API Token", !has_existing)?;
                if input.trim().is_empty() {
                    output.error("Token cannot be empty");
                    continue;
                }
                break input.trim().to_string();
            }
        }
    };
    if token.is_empty() {
        return Err(color_eyre::eyre::eyre!("Plex token is required"));
    }

    let server_url = match server_url_arg {
        Some(url) => url.trim().to_string(),
        None if interactive => {
            let existing = Some(config.plex.server_url.as_str()).filter(|s| !s.is_empty());
            prompts::prompt_string("Plex Server URL (optional, press Enter to discover)", existing)?
                .trim()
                .to_string()
        }
        None => config.plex.server_url.clone(),
    };
    let server_id = server_id_arg.map(|id| id.trim().to_string()).unwrap_or_else(|| config.plex.server_id.clone());

    let spinner = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Verifying token...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    match auth::verify_token(&token).await {
        Ok(true) => {
            spinner.finish_and_clear();
            output.success("Token verified successfully!");
        }
        Ok(false) => {
            spinner.finish_and_clear();
            output.warn("Token verification failed. The token may be invalid.");
            if !interactive || !prompts::prompt_yes_no("Continue anyway?", Some(false))? {
                return Err(color_eyre::eyre::eyre!("Token verification failed"));
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            output.warn(format!("Could not verify token: {}. Continuing anyway...", e));
        }
    }

    config.plex.server_url = server_url;
    config.plex.server_id = server_id;
    config.validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid Plex settings: {}", e))?;
    config.save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    cred_store.set_plex_token(token);
    cred_store.save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", path_manager.credentials_file().display(), e))?;

    output.println("");
    output.success("Plex configuration saved!");
    output.println(format!("  Server URL: {}", or_placeholder(&config.plex.server_url, "<discover via plex.tv>")));
    if !config.plex.server_id.is_empty() {
        output.println(format!("  Server ID: {}", config.plex.server_id));
    }

    Ok(())
}

fn configure_rollover(
    lookahead_seasons: Option<usize>,
    managed_marker: Option<String>,
    rewrite_unchanged: Option<bool>,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager.ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let config_file = path_manager.config_file();
    let mut config = load_or_default(&config_file, output)?;

    if lookahead_seasons.is_none() && managed_marker.is_none() && rewrite_unchanged.is_none() {
        print_section_header("Rollover Options", output);
        output.println("");

        config.rollover.lookahead_seasons = prompts::prompt_positive_number(
            "Seasons to search for the next episode",
            config.rollover.lookahead_seasons,
            output,
        )?;
        config.rollover.managed_marker = prompts::prompt_string(
            "Marker text in playlist descriptions",
            Some(config.rollover.managed_marker.as_str()),
        )?;
        config.rollover.rewrite_unchanged = prompts::prompt_yes_no(
            "Rewrite playlists even when nothing was watched?",
            Some(config.rollover.rewrite_unchanged),
        )?;
    } else {
        if let Some(seasons) = lookahead_seasons {
            config.rollover.lookahead_seasons = seasons;
        }
        if let Some(marker) = managed_marker {
            config.rollover.managed_marker = marker;
        }
        if let Some(rewrite) = rewrite_unchanged {
            config.rollover.rewrite_unchanged = rewrite;
        }
    }

    config.validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid rollover settings: {}", e))?;
    config.save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success("Rollover options saved!");
    output.println(format!("  Lookahead seasons: {}", config.rollover.lookahead_seasons));
    output.println(format!("  Managed marker: {}", config.rollover.managed_marker));
    output.println(format!("  Rewrite unchanged: {}", config.rollover.rewrite_unchanged));

    Ok(())
}

fn load_or_default(config_file: &PathBuf, output: &Output) -> Result<Config> {
    if config_file.exists() {
        return Config::load_from_file(config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e));
    }

    output.info("Configuration file not found. Creating default configuration...");
    Ok(Config {
        scheduler: Some(rollover_config::default_scheduler_config()),
        ..Config::default()
    })
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    format!(
        "{}***{}",
        chars[..2].iter().collect::<String>(),
        chars[chars.len() - 2..].iter().collect::<String>()
    )
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

fn check_mark(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

// Formatting helpers

fn print_table(mut table: Table) {
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);
    println!();
}

fn print_section_table(title: &str, rows: Vec<(&str, String)>) {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(format!("{} Configuration", title)).fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold)
    ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    print_table(table);
}

fn print_section_header(title: &str, output: &Output) {
    output.println("");
    output.println(format!("{}", title.bold().bright_cyan()));
    output.println(format!("{}", "─".repeat(title.len()).bright_cyan()));
}

fn print_instruction_list(items: &[&str], output: &Output) {
    for (idx, item) in items.iter().enumerate() {
        output.println(format!("  {}. {}", idx + 1, item));
    }
}
