use clap::{ArgAction, Parser, Subcommand};
use commands::{config, daemon, playlists, run};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "plex-rollover")]
#[command(about = "Plex Rollover - Keep your episode playlists one step ahead")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll over all managed playlists once
    #[command(long_about = "Replace every watched episode in the managed playlists with the next episode of the same show. Playlists are processed one after another; a playlist that fails is reported and left unmodified while the others continue.")]
    Run {
        /// Compute and print the new playlists without modifying them
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,

        /// Rewrite playlists even when nothing in them was watched
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// List playlists on the server and whether they are managed
    Playlists,
    /// Run as daemon with internal scheduler
    #[command(long_about = "Run Plex Rollover in the foreground and roll over managed playlists according to the configured cron schedule. A pass runs on startup unless --no-startup-run is given. Stop with Ctrl-C or SIGTERM; a running pass finishes before exit.")]
    Daemon {
        /// Cron schedule expression with seconds field (e.g., '0 0 */6 * * *' for every 6 hours)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the rollover pass on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,
    },
    /// Configure credentials and settings
    #[command(long_about = "Manage configuration and credentials for Plex Rollover. Use subcommands to view settings, set up the Plex connection, or change rollover behavior.")]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    #[command(long_about = "Display the current configuration. The Plex token is masked. Use --full to show it.")]
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure Plex (token-based authentication)
    #[command(long_about = "Configure the Plex token and, optionally, the server URL and machine identifier. Without a server URL the server is discovered through plex.tv. You can find your Plex token by inspecting network requests in Plex Web (X-Plex-Token).")]
    Plex {
        /// Plex API Token (if not provided, will prompt)
        #[arg(long)]
        token: Option<String>,

        /// Plex Server URL (optional, e.g. http://192.168.1.10:32400)
        #[arg(long)]
        server_url: Option<String>,

        /// Server machine identifier (optional, fetched from the server when empty)
        #[arg(long)]
        server_id: Option<String>,
    },

    /// Configure rollover behavior
    Rollover {
        /// Number of seasons with unwatched episodes to search for the next episode
        #[arg(long)]
        lookahead_seasons: Option<usize>,

        /// Text in a playlist's description that opts it into rollover
        #[arg(long)]
        managed_marker: Option<String>,

        /// Rewrite playlists even when nothing in them was watched
        #[arg(long)]
        rewrite_unchanged: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Daemon logs go to a daily rolling file instead of stderr
    let log_file = match cli.command {
        Commands::Daemon { .. } => Some(rollover_config::PathManager::default().daemon_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Run { dry_run, force } => run::run_rollover(dry_run, force, &output).await,
        Commands::Playlists => playlists::list_playlists(&output).await,
        Commands::Daemon {
            schedule,
            no_startup_run,
        } => daemon::run_daemon(schedule, no_startup_run, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
    }
}
