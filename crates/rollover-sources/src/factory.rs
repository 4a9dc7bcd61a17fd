//! Source construction from configuration
//!
//! Keeps the CLI unaware of which server implementation backs the rollover run.

use anyhow::Result;
use rollover_config::{Config, CredentialStore};
use crate::plex::PlexClient;
use crate::PlaylistSource;

/// Validate the configuration and connect to the configured media server
pub async fn create_source(
    config: &Config,
    credentials: &CredentialStore,
) -> Result<Box<dyn PlaylistSource>> {
    config.validate()?;

    let token = credentials.resolve_plex_token()
        .ok_or_else(|| anyhow::anyhow!("Plex token not found in credentials or PLEX_TOKEN. Run 'plex-rollover config plex' first"))?;

    let client = PlexClient::from_config(config, &token).await?;
    Ok(Box::new(client))
}
