use crate::error::RolloverError;
use crate::filter::{managed_playlists, PlaylistFilter, SummaryMarker};
use crate::reconcile::PlaylistReconciler;
use crate::resolver::NextEpisodeResolver;
use crate::update::replace_playlist;
use chrono::{DateTime, Utc};
use rollover_config::{Config, DEFAULT_LOOKAHEAD_SEASONS, DEFAULT_MANAGED_MARKER};
use rollover_models::{Episode, PlaylistSummary};
use rollover_sources::PlaylistSource;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

#[derive(Debug, Clone, Serialize)]
pub struct RolloverOptions {
    pub lookahead_seasons: usize,
    /// Compute and report, never write
    pub dry_run: bool,
    /// Rewrite playlists even when no slot changed
    pub rewrite_unchanged: bool,
}

impl Default for RolloverOptions {
    fn default() -> Self {
        Self {
            lookahead_seasons: DEFAULT_LOOKAHEAD_SEASONS,
            dry_run: false,
            rewrite_unchanged: false,
        }
    }
}

impl RolloverOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            lookahead_seasons: config.rollover.lookahead_seasons,
            dry_run: false,
            rewrite_unchanged: config.rollover.rewrite_unchanged,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlaylistOutcome {
    Updated { episodes: Vec<Episode>, rolled_over: usize },
    Unchanged { episodes: Vec<Episode> },
    DryRun { episodes: Vec<Episode>, rolled_over: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistReport {
    pub rating_key: String,
    pub title: String,
    #[serde(flatten)]
    pub outcome: PlaylistOutcome,
}

impl PlaylistReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PlaylistOutcome::Failed { .. })
    }
}

pub struct RolloverResult {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub playlists: Vec<PlaylistReport>,
}

impl RolloverResult {
    pub fn failed(&self) -> usize {
        self.playlists.iter().filter(|p| p.is_failed()).count()
    }

    pub fn updated(&self) -> usize {
        self.playlists
            .iter()
            .filter(|p| matches!(p.outcome, PlaylistOutcome::Updated { .. }))
            .count()
    }

    pub fn rolled_over(&self) -> usize {
        self.playlists
            .iter()
            .map(|p| match p.outcome {
                PlaylistOutcome::Updated { rolled_over, .. } | PlaylistOutcome::DryRun { rolled_over, .. } => rolled_over,
                _ => 0,
            })
            .sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Drives one rollover pass: every managed playlist is reconciled and then persisted before
/// the next one is looked at. A failing playlist is logged and reported; the others still run.
pub struct RolloverOrchestrator {
    source: Box<dyn PlaylistSource>,
    filter: Box<dyn PlaylistFilter>,
    options: RolloverOptions,
}

impl RolloverOrchestrator {
    pub fn new(source: Box<dyn PlaylistSource>, options: RolloverOptions) -> Self {
        Self {
            source,
            filter: Box::new(SummaryMarker::new(DEFAULT_MANAGED_MARKER)),
            options,
        }
    }

    pub fn from_config(source: Box<dyn PlaylistSource>, config: &Config) -> Self {
        Self::new(source, RolloverOptions::from_config(config))
            .with_filter(Box::new(SummaryMarker::new(config.rollover.managed_marker.clone())))
    }

    pub fn with_filter(mut self, filter: Box<dyn PlaylistFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    pub fn with_rewrite_unchanged(mut self, rewrite: bool) -> Self {
        self.options.rewrite_unchanged = rewrite;
        self
    }

    pub fn options(&self) -> &RolloverOptions {
        &self.options
    }

    pub fn source(&self) -> &dyn PlaylistSource {
        self.source.as_ref()
    }

    pub fn is_managed(&self, playlist: &PlaylistSummary) -> bool {
        self.filter.is_managed(playlist)
    }

    pub async fn managed_playlists(&self) -> Result<Vec<PlaylistSummary>, RolloverError> {
        let playlists = self.source.list_playlists().await?;
        Ok(managed_playlists(&playlists, self.filter.as_ref()).cloned().collect())
    }

    pub async fn run(&self) -> Result<RolloverResult, RolloverError> {
        let started_at = Utc::now();
        let start = Instant::now();

        let playlists = self.managed_playlists().await?;
        info!(
            operation = "rollover_start",
            source = self.source.source_name(),
            playlists = playlists.len(),
            dry_run = self.options.dry_run,
            "Starting rollover"
        );

        let mut reports = Vec::with_capacity(playlists.len());
        for playlist in &playlists {
            info!("Playlist name: {}", playlist.title);
            let outcome = match self.rollover_playlist(playlist).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        operation = "rollover_playlist_error",
                        playlist = %playlist.title,
                        error = %e,
                        "Playlist rollover failed"
                    );
                    PlaylistOutcome::Failed { error: e.to_string() }
                }
            };
            reports.push(PlaylistReport {
                rating_key: playlist.rating_key.clone(),
                title: playlist.title.clone(),
                outcome,
            });
        }

        let result = RolloverResult {
            started_at,
            duration: start.elapsed(),
            playlists: reports,
        };
        info!(
            operation = "rollover_complete",
            playlists = result.playlists.len(),
            updated = result.updated(),
            failed = result.failed(),
            duration_ms = result.duration.as_millis() as u64,
            "Rollover finished"
        );
        Ok(result)
    }

    #[instrument(skip(self, playlist), fields(playlist = %playlist.title))]
    pub async fn rollover_playlist(&self, playlist: &PlaylistSummary) -> Result<PlaylistOutcome, RolloverError> {
        let items = self.source.list_playlist_items(&playlist.rating_key).await?;

        let resolver = NextEpisodeResolver::new(self.source.as_ref(), self.options.lookahead_seasons);
        let reconciliation = PlaylistReconciler::new(resolver).reconcile(&items).await?;

        for episode in &reconciliation.episodes {
            info!("- {}", episode);
        }

        if self.options.dry_run {
            info!(rolled_over = reconciliation.rolled_over, "Dry run, playlist not modified");
            return Ok(PlaylistOutcome::DryRun {
                episodes: reconciliation.episodes,
                rolled_over: reconciliation.rolled_over,
            });
        }

        if reconciliation.is_unchanged() && !self.options.rewrite_unchanged {
            info!("Nothing watched, playlist left as is");
            return Ok(PlaylistOutcome::Unchanged {
                episodes: reconciliation.episodes,
            });
        }

        let previous: Vec<String> = items.iter().map(|i| i.rating_key.clone()).collect();
        replace_playlist(self.source.as_ref(), playlist, &reconciliation.episodes, &previous).await?;

        Ok(PlaylistOutcome::Updated {
            episodes: reconciliation.episodes,
            rolled_over: reconciliation.rolled_over,
        })
    }
}
