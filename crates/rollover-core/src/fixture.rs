//! In-memory `PlaylistSource` for tests: holds shows, seasons and playlists, records every
//! call in order, and fails on request. Clones share recorded calls and playlist contents.

use async_trait::async_trait;
use chrono::NaiveDate;
use rollover_models::{EpisodeRecord, PlaylistSummary, SeasonRef};
use rollover_sources::error::StatusCode;
use rollover_sources::{PlaylistSource, SourceError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListPlaylists,
    ListItems(String),
    UnwatchedSeasons(String, usize),
    UnwatchedEpisodes(String, usize),
    Clear(String),
    Add(String, String),
}

#[derive(Default, Clone)]
pub struct FixtureSource {
    playlists: Vec<PlaylistSummary>,
    shows: HashMap<String, Vec<(SeasonRef, Vec<EpisodeRecord>)>>,
    contents: Arc<Mutex<HashMap<String, Vec<EpisodeRecord>>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    /// Seasons the server lists as unwatched but that yield no episode
    stale_seasons: HashSet<String>,
    /// Seasons whose unwatched query returns watched episodes too
    leaky_seasons: HashSet<String>,
    failing_adds: Arc<Mutex<HashMap<String, usize>>>,
    failing_item_lists: HashSet<String>,
    failing_show_lookups: HashSet<String>,
    failing_season_lookups: HashSet<String>,
    fail_clear: bool,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn episode(key: &str, show_key: &str, air_date: NaiveDate, view_count: u32) -> EpisodeRecord {
    EpisodeRecord {
        rating_key: key.to_string(),
        title: format!("Episode {}", key),
        show_key: Some(show_key.to_string()),
        show_title: Some(format!("Show {}", show_key)),
        season_title: None,
        index: None,
        originally_available_at: Some(air_date),
        view_count,
    }
}

pub fn season(key: &str, title: &str, index: u32) -> SeasonRef {
    SeasonRef {
        rating_key: key.to_string(),
        title: title.to_string(),
        index: Some(index),
    }
}

pub fn playlist(key: &str, title: &str, summary: &str) -> PlaylistSummary {
    PlaylistSummary {
        rating_key: key.to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        playlist_type: "video".to_string(),
        leaf_count: None,
    }
}

fn server_error(context: &str) -> SourceError {
    SourceError::Status {
        context: context.to_string(),
        status: StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlist(mut self, summary: PlaylistSummary, items: Vec<EpisodeRecord>) -> Self {
        self.contents
            .lock()
            .unwrap()
            .insert(summary.rating_key.clone(), items);
        self.playlists.push(summary);
        self
    }

    pub fn with_show(mut self, show_key: &str, seasons: Vec<(SeasonRef, Vec<EpisodeRecord>)>) -> Self {
        self.shows.insert(show_key.to_string(), seasons);
        self
    }

    pub fn with_stale_season(mut self, season_key: &str) -> Self {
        self.stale_seasons.insert(season_key.to_string());
        self
    }

    pub fn with_leaky_season(mut self, season_key: &str) -> Self {
        self.leaky_seasons.insert(season_key.to_string());
        self
    }

    /// The next `times` additions of `episode_key` fail
    pub fn failing_add(self, episode_key: &str, times: usize) -> Self {
        self.failing_adds
            .lock()
            .unwrap()
            .insert(episode_key.to_string(), times);
        self
    }

    pub fn failing_items(mut self, playlist_key: &str) -> Self {
        self.failing_item_lists.insert(playlist_key.to_string());
        self
    }

    /// Listing the unwatched seasons of `show_key` fails
    pub fn failing_seasons(mut self, show_key: &str) -> Self {
        self.failing_show_lookups.insert(show_key.to_string());
        self
    }

    /// Listing the unwatched episodes of `season_key` fails
    pub fn failing_episodes(mut self, season_key: &str) -> Self {
        self.failing_season_lookups.insert(season_key.to_string());
        self
    }

    pub fn failing_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that modify playlists, in order
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Clear(_) | Call::Add(_, _)))
            .collect()
    }

    pub fn contents(&self, playlist_key: &str) -> Vec<String> {
        self.contents
            .lock()
            .unwrap()
            .get(playlist_key)
            .map(|items| items.iter().map(|i| i.rating_key.clone()).collect())
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn find_episode(&self, key: &str) -> Option<EpisodeRecord> {
        let in_shows = self
            .shows
            .values()
            .flat_map(|seasons| seasons.iter().flat_map(|(_, eps)| eps.iter()))
            .find(|e| e.rating_key == key)
            .cloned();
        in_shows.or_else(|| {
            self.contents
                .lock()
                .unwrap()
                .values()
                .flat_map(|items| items.iter())
                .find(|e| e.rating_key == key)
                .cloned()
        })
    }

    fn season_episodes(&self, season_key: &str) -> Vec<EpisodeRecord> {
        self.shows
            .values()
            .flat_map(|seasons| seasons.iter())
            .find(|(s, _)| s.rating_key == season_key)
            .map(|(_, eps)| eps.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PlaylistSource for FixtureSource {
    fn source_name(&self) -> &str {
        "Fixture"
    }

    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>, SourceError> {
        self.record(Call::ListPlaylists);
        Ok(self.playlists.clone())
    }

    async fn list_playlist_items(&self, playlist_key: &str) -> Result<Vec<EpisodeRecord>, SourceError> {
        self.record(Call::ListItems(playlist_key.to_string()));
        if self.failing_item_lists.contains(playlist_key) {
            return Err(server_error("Failed to get playlist items"));
        }
        Ok(self
            .contents
            .lock()
            .unwrap()
            .get(playlist_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_unwatched_seasons(&self, show_key: &str, limit: usize) -> Result<Vec<SeasonRef>, SourceError> {
        self.record(Call::UnwatchedSeasons(show_key.to_string(), limit));
        if self.failing_show_lookups.contains(show_key) {
            return Err(server_error("Failed to get unwatched seasons"));
        }
        let seasons = self.shows.get(show_key).cloned().unwrap_or_default();
        Ok(seasons
            .into_iter()
            .filter(|(s, eps)| {
                self.stale_seasons.contains(&s.rating_key) || eps.iter().any(|e| !e.is_watched())
            })
            .map(|(s, _)| s)
            .take(limit)
            .collect())
    }

    async fn list_unwatched_episodes(&self, season_key: &str, limit: usize) -> Result<Vec<EpisodeRecord>, SourceError> {
        self.record(Call::UnwatchedEpisodes(season_key.to_string(), limit));
        if self.failing_season_lookups.contains(season_key) {
            return Err(server_error("Failed to get unwatched episodes"));
        }
        if self.stale_seasons.contains(season_key) {
            return Ok(Vec::new());
        }
        let leaky = self.leaky_seasons.contains(season_key);
        Ok(self
            .season_episodes(season_key)
            .into_iter()
            .filter(|e| leaky || !e.is_watched())
            .take(limit)
            .collect())
    }

    async fn clear_playlist(&self, playlist_key: &str) -> Result<(), SourceError> {
        self.record(Call::Clear(playlist_key.to_string()));
        if self.fail_clear {
            return Err(server_error("Failed to clear playlist"));
        }
        self.contents
            .lock()
            .unwrap()
            .insert(playlist_key.to_string(), Vec::new());
        Ok(())
    }

    async fn add_to_playlist(&self, playlist_key: &str, episode_key: &str) -> Result<(), SourceError> {
        self.record(Call::Add(playlist_key.to_string(), episode_key.to_string()));
        {
            let mut failing = self.failing_adds.lock().unwrap();
            if let Some(remaining) = failing.get_mut(episode_key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(server_error("Failed to add item to playlist"));
                }
            }
        }
        let record = self.find_episode(episode_key).unwrap_or_else(|| EpisodeRecord {
            rating_key: episode_key.to_string(),
            title: String::new(),
            show_key: None,
            show_title: None,
            season_title: None,
            index: None,
            originally_available_at: None,
            view_count: 0,
        });
        self.contents
            .lock()
            .unwrap()
            .entry(playlist_key.to_string())
            .or_default()
            .push(record);
        Ok(())
    }
}
