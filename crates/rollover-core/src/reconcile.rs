use crate::error::RolloverError;
use crate::resolver::NextEpisodeResolver;
use rollover_models::{Episode, EpisodeRecord};
use serde::Serialize;
use tracing::{debug, info};

/// The reconciled slots of one playlist, in playlist order
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub episodes: Vec<Episode>,
    /// Slots whose watched episode was replaced
    pub rolled_over: usize,
}

impl Reconciliation {
    pub fn is_unchanged(&self) -> bool {
        self.rolled_over == 0
    }
}

/// Replaces every watched slot of a playlist with the next episode of the same show.
pub struct PlaylistReconciler<'a> {
    resolver: NextEpisodeResolver<'a>,
}

impl<'a> PlaylistReconciler<'a> {
    pub fn new(resolver: NextEpisodeResolver<'a>) -> Self {
        Self { resolver }
    }

    pub async fn reconcile(&self, items: &[EpisodeRecord]) -> Result<Reconciliation, RolloverError> {
        let mut episodes = Vec::with_capacity(items.len());
        let mut rolled_over = 0;

        for item in items {
            if item.is_watched() {
                info!("- Finished: {}", item.describe());
                episodes.push(self.next_for(item).await?);
                rolled_over += 1;
            } else {
                let episode = item.to_episode().ok_or_else(|| {
                    RolloverError::DataUnavailable(format!(
                        "playlist item '{}' ({}) has no original air date",
                        item.title, item.rating_key
                    ))
                })?;
                debug!("- Keeping: {}", item.describe());
                episodes.push(episode);
            }
        }

        Ok(Reconciliation {
            episodes,
            rolled_over,
        })
    }

    async fn next_for(&self, item: &EpisodeRecord) -> Result<Episode, RolloverError> {
        let show_key = item.show_key.as_deref().ok_or_else(|| {
            RolloverError::DataUnavailable(format!(
                "watched item '{}' ({}) has no show reference",
                item.title, item.rating_key
            ))
        })?;

        self.resolver
            .resolve_next(show_key)
            .await
            .map_err(|e| match e {
                RolloverError::NoUpcomingEpisode { show_key, .. } => RolloverError::NoUpcomingEpisode {
                    show_key,
                    show_title: item.show_title.clone(),
                },
                other => other,
            })
    }
}
