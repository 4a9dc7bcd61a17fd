use crate::error::RolloverError;
use rollover_models::{Episode, PlaylistSummary};
use rollover_sources::PlaylistSource;
use tracing::{error, info, warn};

/// Replace a playlist's contents with `episodes`, in order.
///
/// Plex only offers a destructive clear followed by single-item additions. When an addition
/// fails the playlist is cleared again and `previous` (the keys read before reconciliation)
/// is put back, so a failed run leaves the playlist as it was rather than truncated.
pub async fn replace_playlist(
    source: &dyn PlaylistSource,
    playlist: &PlaylistSummary,
    episodes: &[Episode],
    previous: &[String],
) -> Result<(), RolloverError> {
    info!("Clearing playlist {}", playlist.title);
    source.clear_playlist(&playlist.rating_key).await?;

    for (added, episode) in episodes.iter().enumerate() {
        info!("- Adding {}", episode);
        if let Err(e) = source.add_to_playlist(&playlist.rating_key, &episode.rating_key).await {
            warn!(
                playlist = %playlist.title,
                episode = %episode.rating_key,
                error = %e,
                "Adding playlist item failed, restoring previous contents"
            );
            let restored = restore(source, playlist, previous).await;
            return Err(RolloverError::ReplaceFailed {
                playlist: playlist.title.clone(),
                added,
                restored,
                source: Box::new(e.into()),
            });
        }
    }

    Ok(())
}

async fn restore(source: &dyn PlaylistSource, playlist: &PlaylistSummary, previous: &[String]) -> bool {
    if let Err(e) = source.clear_playlist(&playlist.rating_key).await {
        error!(playlist = %playlist.title, error = %e, "Restore failed: could not clear playlist");
        return false;
    }

    for key in previous {
        if let Err(e) = source.add_to_playlist(&playlist.rating_key, key).await {
            error!(
                playlist = %playlist.title,
                episode = %key,
                error = %e,
                "Restore failed: playlist left partially filled"
            );
            return false;
        }
    }

    info!(playlist = %playlist.title, items = previous.len(), "Restored previous playlist contents");
    true
}
