pub mod traits;
pub mod factory;
pub mod plex;
pub mod error;

pub use traits::PlaylistSource;
pub use factory::create_source;
pub use error::SourceError;
pub use plex::{PlexClient, PlexHttpClient};
