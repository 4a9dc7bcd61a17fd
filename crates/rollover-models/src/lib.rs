pub mod episode;
pub mod playlist;
pub mod season;

pub use episode::{Episode, EpisodeRecord};
pub use playlist::PlaylistSummary;
pub use season::SeasonRef;
