use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An episode slot value: what ends up in a playlist after reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    pub rating_key: String,
    pub originally_available_at: NaiveDate,
}

impl Episode {
    pub fn new(title: impl Into<String>, rating_key: impl Into<String>, originally_available_at: NaiveDate) -> Self {
        Self {
            title: title.into(),
            rating_key: rating_key.into(),
            originally_available_at,
        }
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' (rating_key={})",
            self.originally_available_at, self.title, self.rating_key
        )
    }
}

/// An episode as reported by the server, with its viewing state and show lineage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeRecord {
    pub rating_key: String,
    pub title: String,
    /// Plex `grandparentRatingKey`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub originally_available_at: Option<NaiveDate>,
    #[serde(default)]
    pub view_count: u32,
}

impl EpisodeRecord {
    pub fn is_watched(&self) -> bool {
        self.view_count > 0
    }

    /// The slot value for this record, or `None` when the server gave no air date.
    pub fn to_episode(&self) -> Option<Episode> {
        self.originally_available_at
            .map(|date| Episode::new(self.title.clone(), self.rating_key.clone(), date))
    }

    /// `Show:Season:Title (EP n)`, the form used in run logs
    pub fn describe(&self) -> String {
        let episode = self
            .index
            .map(|i| format!(" (EP{})", i))
            .unwrap_or_default();
        format!(
            "{}:{}:{}{}",
            self.show_title.as_deref().unwrap_or("?"),
            self.season_title.as_deref().unwrap_or("?"),
            self.title,
            episode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(view_count: u32, date: Option<NaiveDate>) -> EpisodeRecord {
        EpisodeRecord {
            rating_key: "101".to_string(),
            title: "Pilot".to_string(),
            show_key: Some("7".to_string()),
            show_title: Some("Severance".to_string()),
            season_title: Some("Season 1".to_string()),
            index: Some(1),
            originally_available_at: date,
            view_count,
        }
    }

    #[test]
    fn test_is_watched() {
        assert!(!record(0, None).is_watched());
        assert!(record(1, None).is_watched());
        assert!(record(4, None).is_watched());
    }

    #[test]
    fn test_to_episode_requires_air_date() {
        assert!(record(0, None).to_episode().is_none());

        let date = NaiveDate::from_ymd_opt(2022, 2, 18).unwrap();
        let episode = record(0, Some(date)).to_episode().unwrap();
        assert_eq!(episode.title, "Pilot");
        assert_eq!(episode.rating_key, "101");
        assert_eq!(episode.originally_available_at, date);
    }

    #[test]
    fn test_describe() {
        assert_eq!(record(1, None).describe(), "Severance:Season 1:Pilot (EP1)");

        let mut bare = record(1, None);
        bare.show_title = None;
        bare.season_title = None;
        bare.index = None;
        assert_eq!(bare.describe(), "?:?:Pilot");
    }

    #[test]
    fn test_view_count_defaults_to_zero() {
        let json = r#"{"rating_key":"5","title":"Fresh"}"#;
        let record: EpisodeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.view_count, 0);
        assert!(!record.is_watched());
    }
}
