use rollover_models::PlaylistSummary;

/// Decides whether a playlist is opted into automated rollover.
pub trait PlaylistFilter: Send + Sync {
    fn is_managed(&self, playlist: &PlaylistSummary) -> bool;
}

/// Managed when the playlist description contains a marker, e.g. `[managed]`
#[derive(Debug, Clone)]
pub struct SummaryMarker {
    marker: String,
}

impl SummaryMarker {
    pub fn new(marker: impl Into<String>) -> Self {
        Self { marker: marker.into() }
    }
}

impl PlaylistFilter for SummaryMarker {
    fn is_managed(&self, playlist: &PlaylistSummary) -> bool {
        !self.marker.is_empty() && playlist.summary.contains(&self.marker)
    }
}

impl<F> PlaylistFilter for F
where
    F: Fn(&PlaylistSummary) -> bool + Send + Sync,
{
    fn is_managed(&self, playlist: &PlaylistSummary) -> bool {
        self(playlist)
    }
}

pub fn managed_playlists<'a>(
    playlists: &'a [PlaylistSummary],
    filter: &'a dyn PlaylistFilter,
) -> impl Iterator<Item = &'a PlaylistSummary> + 'a {
    playlists.iter().filter(move |p| filter.is_managed(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(key: &str, summary: &str) -> PlaylistSummary {
        PlaylistSummary {
            rating_key: key.to_string(),
            title: format!("Playlist {}", key),
            summary: summary.to_string(),
            playlist_type: "video".to_string(),
            leaf_count: None,
        }
    }

    #[test]
    fn test_summary_marker() {
        let filter = SummaryMarker::new("[managed]");
        assert!(filter.is_managed(&playlist("1", "[managed]")));
        assert!(filter.is_managed(&playlist("2", "Weeknight shows [managed] keep short")));
        assert!(!filter.is_managed(&playlist("3", "managed")));
        assert!(!filter.is_managed(&playlist("4", "")));
    }

    #[test]
    fn test_empty_marker_matches_nothing() {
        let filter = SummaryMarker::new("");
        assert!(!filter.is_managed(&playlist("1", "anything")));
    }

    #[test]
    fn test_closure_filter() {
        let filter = |p: &PlaylistSummary| p.playlist_type == "video" && p.title.ends_with('2');
        assert!(!filter.is_managed(&playlist("1", "")));
        assert!(filter.is_managed(&playlist("2", "")));
    }

    #[test]
    fn test_managed_playlists_keeps_order() {
        let playlists = vec![
            playlist("1", "[managed]"),
            playlist("2", "other"),
            playlist("3", "x [managed]"),
        ];
        let filter = SummaryMarker::new("[managed]");
        let keys: Vec<&str> = managed_playlists(&playlists, &filter)
            .map(|p| p.rating_key.as_str())
            .collect();
        assert_eq!(keys, vec!["1", "3"]);
    }
}
