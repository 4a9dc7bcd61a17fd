pub mod error;
pub mod filter;
pub mod reconcile;
pub mod resolver;
pub mod rollover;
pub mod update;

#[cfg(test)]
mod fixture;

pub use error::RolloverError;
pub use filter::{managed_playlists, PlaylistFilter, SummaryMarker};
pub use reconcile::{PlaylistReconciler, Reconciliation};
pub use resolver::NextEpisodeResolver;
pub use rollover::{PlaylistOutcome, PlaylistReport, RolloverOptions, RolloverOrchestrator, RolloverResult};
pub use update::replace_playlist;
