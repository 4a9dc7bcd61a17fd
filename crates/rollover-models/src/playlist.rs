use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub rating_key: String,
    pub title: String,
    /// Free-text description; managed playlists carry a marker in here
    pub summary: String,
    pub playlist_type: String,
    pub leaf_count: Option<u32>,
}
