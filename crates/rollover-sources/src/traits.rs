use async_trait::async_trait;
use rollover_models::{EpisodeRecord, PlaylistSummary, SeasonRef};
use crate::SourceError;

/// Read/write access to a media server's playlists and viewing state.
///
/// Every call reflects the server's current view counts; implementations must not cache
/// watch state between calls.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    // Source metadata
    fn source_name(&self) -> &str;

    // Playlists
    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>, SourceError>;
    async fn list_playlist_items(&self, playlist_key: &str) -> Result<Vec<EpisodeRecord>, SourceError>;

    // Viewing state
    /// Seasons of `show_key` that still have unwatched episodes, in server order, at most `limit`
    async fn list_unwatched_seasons(&self, show_key: &str, limit: usize) -> Result<Vec<SeasonRef>, SourceError>;
    /// Unwatched episodes of `season_key`, earliest-positioned first, at most `limit`
    async fn list_unwatched_episodes(&self, season_key: &str, limit: usize) -> Result<Vec<EpisodeRecord>, SourceError>;

    // Playlist modification
    async fn clear_playlist(&self, playlist_key: &str) -> Result<(), SourceError>;
    async fn add_to_playlist(&self, playlist_key: &str, episode_key: &str) -> Result<(), SourceError>;
}
