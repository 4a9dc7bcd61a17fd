pub mod config;
pub mod daemon;
pub mod playlists;
pub mod prompts;
pub mod run;

use crate::output::Output;
use color_eyre::Result;
use rollover_config::{Config, CredentialStore, PathManager};
use rollover_core::RolloverOrchestrator;

/// Load the configuration file, or defaults when none exists yet
pub fn load_config(path_manager: &PathManager, output: &Output) -> Result<Config> {
    let config_file = path_manager.config_file();
    if !config_file.exists() {
        output.warn(format!(
            "Configuration file not found at {}, using defaults. Run 'plex-rollover config plex' to create one.",
            config_file.display()
        ));
        return Ok(Config::default());
    }

    Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))
}

pub fn load_credentials(path_manager: &PathManager) -> Result<CredentialStore> {
    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    Ok(cred_store)
}

/// Connect to the configured server and build an orchestrator from the config
pub async fn connect(config: &Config, path_manager: &PathManager) -> Result<RolloverOrchestrator> {
    let cred_store = load_credentials(path_manager)?;
    let source = rollover_sources::create_source(config, &cred_store).await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to connect to Plex: {}", e))?;

    Ok(RolloverOrchestrator::from_config(source, config))
}
