use rollover_sources::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RolloverError {
    /// No unwatched episode in the lookahead window of the show
    #[error("no upcoming episode for show {}", show_label(.show_key, .show_title))]
    NoUpcomingEpisode {
        show_key: String,
        show_title: Option<String>,
    },

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("transport failure: {0}")]
    TransportFailure(#[source] SourceError),

    /// Persisting the reconciled list failed after the playlist was cleared
    #[error(
        "replacing playlist '{playlist}' failed after {added} item(s): {source} ({})",
        restore_note(.restored)
    )]
    ReplaceFailed {
        playlist: String,
        added: usize,
        restored: bool,
        #[source]
        source: Box<RolloverError>,
    },
}

fn show_label(show_key: &str, show_title: &Option<String>) -> String {
    match show_title {
        Some(title) => format!("'{}' ({})", title, show_key),
        None => show_key.to_string(),
    }
}

fn restore_note(restored: &bool) -> &'static str {
    if *restored {
        "previous contents restored"
    } else {
        "playlist left partially filled"
    }
}

impl From<SourceError> for RolloverError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::DataUnavailable(message) => RolloverError::DataUnavailable(message),
            other => RolloverError::TransportFailure(other),
        }
    }
}
