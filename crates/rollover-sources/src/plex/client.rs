use crate::plex::api::PlexHttpClient;
use crate::traits::PlaylistSource;
use crate::SourceError;
use anyhow::Result;
use async_trait::async_trait;
use rollover_config::Config;
use rollover_models::{EpisodeRecord, PlaylistSummary, SeasonRef};
use std::time::Duration;
use tracing::{debug, info};

/// A connected Plex Media Server: base URL and machine identifier are settled up front so
/// every playlist call can be issued without further discovery.
pub struct PlexClient {
    api: PlexHttpClient,
    server_url: String,
    machine_identifier: String,
}

impl PlexClient {
    pub fn new(api: PlexHttpClient, server_url: String, machine_identifier: String) -> Self {
        Self {
            api,
            server_url: server_url.trim_end_matches('/').to_string(),
            machine_identifier,
        }
    }

    pub async fn from_config(config: &Config, token: &str) -> Result<Self> {
        let api = PlexHttpClient::new(token, Duration::from_secs(config.plex.timeout_seconds))?;
        Self::connect(api, config.server_url(), config.server_id()).await
    }

    /// Settle server URL and machine identifier.
    ///
    /// Without a configured URL the first server advertised by plex.tv is used (its identifier
    /// comes along with it); without a configured identifier the server's `/identity` is read.
    pub async fn connect(api: PlexHttpClient, server_url: Option<String>, server_id: Option<String>) -> Result<Self> {
        let (server_url, discovered_id) = match server_url {
            Some(url) => {
                debug!("Plex: Using configured server URL: {}", url);
                (url, None)
            }
            None => {
                debug!("Plex: No configured server URL, discovering servers...");
                let servers = api.get_servers().await?;
                let server = servers
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("No Plex servers available for this token"))?;
                info!(server = %server.name, url = %server.url, "Using discovered Plex server");
                let id = Some(server.identifier).filter(|id| !id.is_empty());
                (server.url, id)
            }
        };

        let machine_identifier = match server_id.or(discovered_id) {
            Some(id) => id,
            None => {
                let id = api.get_machine_identifier(server_url.trim_end_matches('/')).await?;
                debug!("Plex: Server machine identifier is {}", id);
                id
            }
        };

        Ok(Self::new(api, server_url, machine_identifier))
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn machine_identifier(&self) -> &str {
        &self.machine_identifier
    }
}

#[async_trait]
impl PlaylistSource for PlexClient {
    fn source_name(&self) -> &str {
        "Plex"
    }

    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>, SourceError> {
        self.api.get_playlists(&self.server_url).await
    }

    async fn list_playlist_items(&self, playlist_key: &str) -> Result<Vec<EpisodeRecord>, SourceError> {
        self.api.get_playlist_items(&self.server_url, playlist_key).await
    }

    async fn list_unwatched_seasons(&self, show_key: &str, limit: usize) -> Result<Vec<SeasonRef>, SourceError> {
        self.api.get_unwatched_seasons(&self.server_url, show_key, limit).await
    }

    async fn list_unwatched_episodes(&self, season_key: &str, limit: usize) -> Result<Vec<EpisodeRecord>, SourceError> {
        self.api.get_unwatched_episodes(&self.server_url, season_key, limit).await
    }

    async fn clear_playlist(&self, playlist_key: &str) -> Result<(), SourceError> {
        debug!(playlist = playlist_key, "Plex: clearing playlist");
        self.api.clear_playlist(&self.server_url, playlist_key).await
    }

    async fn add_to_playlist(&self, playlist_key: &str, episode_key: &str) -> Result<(), SourceError> {
        debug!(playlist = playlist_key, episode = episode_key, "Plex: adding playlist item");
        self.api
            .add_to_playlist(&self.server_url, &self.machine_identifier, playlist_key, episode_key)
            .await
    }
}
