use crate::error::RolloverError;
use rollover_models::Episode;
use rollover_sources::PlaylistSource;
use tracing::{debug, warn};

/// Finds the next episode to watch for a show.
///
/// Looks at the first unwatched episode of each of the first `lookahead_seasons` seasons that
/// still have unwatched content, then picks the one that aired earliest. Specials usually sort
/// first by season index while airing between regular episodes, so position alone would put
/// them in the wrong place; the air date does not.
pub struct NextEpisodeResolver<'a> {
    source: &'a dyn PlaylistSource,
    lookahead_seasons: usize,
}

impl<'a> NextEpisodeResolver<'a> {
    pub fn new(source: &'a dyn PlaylistSource, lookahead_seasons: usize) -> Self {
        Self {
            source,
            lookahead_seasons,
        }
    }

    pub async fn resolve_next(&self, show_key: &str) -> Result<Episode, RolloverError> {
        let seasons = self
            .source
            .list_unwatched_seasons(show_key, self.lookahead_seasons)
            .await?;

        let mut candidates = Vec::with_capacity(self.lookahead_seasons);
        for season in seasons.iter().take(self.lookahead_seasons) {
            let first = self
                .source
                .list_unwatched_episodes(&season.rating_key, 1)
                .await?
                .into_iter()
                .next();

            let Some(record) = first else {
                warn!(
                    show_key,
                    season = %season.title,
                    "Season reported unwatched content but returned no episode"
                );
                continue;
            };

            if record.is_watched() {
                warn!(
                    show_key,
                    season = %season.title,
                    episode = %record.rating_key,
                    "Skipping candidate that is already watched"
                );
                continue;
            }

            let episode = record.to_episode().ok_or_else(|| {
                RolloverError::DataUnavailable(format!(
                    "episode '{}' ({}) has no original air date",
                    record.title, record.rating_key
                ))
            })?;
            debug!(show_key, season = %season.title, candidate = %episode, "Next-episode candidate");
            candidates.push(episode);
        }

        // Stable: equal dates keep the server's season order
        candidates.sort_by_key(|e| e.originally_available_at);

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| RolloverError::NoUpcomingEpisode {
                show_key: show_key.to_string(),
                show_title: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{date, episode, season, Call, FixtureSource};

    #[tokio::test]
    async fn test_next_episode_in_single_season() {
        let source = FixtureSource::new().with_show(
            "S",
            vec![(
                season("s1", "Season 1", 1),
                vec![
                    episode("e1", "S", date(2024, 1, 1), 1),
                    episode("e2", "S", date(2024, 1, 8), 0),
                    episode("e3", "S", date(2024, 1, 15), 0),
                ],
            )],
        );
        let resolver = NextEpisodeResolver::new(&source, 2);

        let next = resolver.resolve_next("S").await.unwrap();
        assert_eq!(next.rating_key, "e2");
        assert_eq!(next.originally_available_at, date(2024, 1, 8));
    }

    #[tokio::test]
    async fn test_air_date_beats_season_order() {
        // Specials sort first by index but the season 2 episode aired earlier
        let source = FixtureSource::new().with_show(
            "S",
            vec![
                (season("s0", "Specials", 0), vec![episode("sp1", "S", date(2024, 5, 1), 0)]),
                (season("s2", "Season 2", 2), vec![episode("e21", "S", date(2024, 3, 1), 0)]),
            ],
        );
        let resolver = NextEpisodeResolver::new(&source, 2);

        let next = resolver.resolve_next("S").await.unwrap();
        assert_eq!(next.rating_key, "e21");
    }

    #[tokio::test]
    async fn test_special_that_aired_first_wins() {
        let source = FixtureSource::new().with_show(
            "S",
            vec![
                (season("s0", "Specials", 0), vec![episode("sp1", "S", date(2024, 2, 1), 0)]),
                (season("s2", "Season 2", 2), vec![episode("e21", "S", date(2024, 3, 1), 0)]),
            ],
        );
        let resolver = NextEpisodeResolver::new(&source, 2);

        assert_eq!(resolver.resolve_next("S").await.unwrap().rating_key, "sp1");
    }

    #[tokio::test]
    async fn test_equal_air_dates_keep_season_order() {
        let source = FixtureSource::new().with_show(
            "S",
            vec![
                (season("s1", "Season 1", 1), vec![episode("a", "S", date(2024, 3, 1), 0)]),
                (season("s2", "Season 2", 2), vec![episode("b", "S", date(2024, 3, 1), 0)]),
            ],
        );
        let resolver = NextEpisodeResolver::new(&source, 2);

        assert_eq!(resolver.resolve_next("S").await.unwrap().rating_key, "a");
    }

    #[tokio::test]
    async fn test_fully_watched_seasons_are_skipped() {
        let source = FixtureSource::new().with_show(
            "S",
            vec![
                (season("s1", "Season 1", 1), vec![episode("e11", "S", date(2023, 1, 1), 1)]),
                (season("s2", "Season 2", 2), vec![episode("e21", "S", date(2024, 1, 1), 1)]),
                (season("s3", "Season 3", 3), vec![episode("e31", "S", date(2025, 1, 1), 0)]),
            ],
        );
        let resolver = NextEpisodeResolver::new(&source, 2);

        // The window starts at the first season with unwatched content
        assert_eq!(resolver.resolve_next("S").await.unwrap().rating_key, "e31");
    }

    #[tokio::test]
    async fn test_lookahead_bound() {
        // Two stale seasons fill the window; the real next episode lies beyond it
        let source = FixtureSource::new()
            .with_show(
                "S",
                vec![
                    (season("s1", "Season 1", 1), vec![episode("e11", "S", date(2023, 1, 1), 1)]),
                    (season("s2", "Season 2", 2), vec![episode("e21", "S", date(2024, 1, 1), 1)]),
                    (season("s3", "Season 3", 3), vec![episode("e31", "S", date(2025, 1, 1), 0)]),
                ],
            )
            .with_stale_season("s1")
            .with_stale_season("s2");
        let resolver = NextEpisodeResolver::new(&source, 2);

        let err = resolver.resolve_next("S").await.unwrap_err();
        assert!(matches!(err, RolloverError::NoUpcomingEpisode { ref show_key, .. } if show_key == "S"));

        // A wider window reaches it
        let wide = NextEpisodeResolver::new(&source, 3);
        assert_eq!(wide.resolve_next("S").await.unwrap().rating_key, "e31");
    }

    #[tokio::test]
    async fn test_no_unwatched_content() {
        let source = FixtureSource::new().with_show(
            "S",
            vec![(season("s1", "Season 1", 1), vec![episode("e11", "S", date(2023, 1, 1), 3)])],
        );
        let resolver = NextEpisodeResolver::new(&source, 2);

        let err = resolver.resolve_next("S").await.unwrap_err();
        assert!(matches!(err, RolloverError::NoUpcomingEpisode { .. }));
    }

    #[tokio::test]
    async fn test_never_offers_watched_episode() {
        let source = FixtureSource::new()
            .with_show(
                "S",
                vec![
                    (
                        season("s1", "Season 1", 1),
                        vec![
                            episode("e11", "S", date(2023, 1, 1), 2),
                            episode("e12", "S", date(2023, 1, 8), 0),
                        ],
                    ),
                    (season("s2", "Season 2", 2), vec![episode("e21", "S", date(2024, 1, 1), 0)]),
                ],
            )
            .with_leaky_season("s1");
        let resolver = NextEpisodeResolver::new(&source, 2);

        let next = resolver.resolve_next("S").await.unwrap();
        assert_eq!(next.rating_key, "e21");
    }

    #[tokio::test]
    async fn test_candidate_without_air_date_is_data_unavailable() {
        let mut undated = episode("e11", "S", date(2023, 1, 1), 0);
        undated.originally_available_at = None;
        let source = FixtureSource::new()
            .with_show("S", vec![(season("s1", "Season 1", 1), vec![undated])]);
        let resolver = NextEpisodeResolver::new(&source, 2);

        let err = resolver.resolve_next("S").await.unwrap_err();
        assert!(matches!(err, RolloverError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_season_listing_failure_is_transport_failure() {
        let source = FixtureSource::new()
            .with_show("S", vec![(season("s1", "Season 1", 1), vec![episode("e11", "S", date(2023, 1, 1), 0)])])
            .failing_seasons("S");
        let resolver = NextEpisodeResolver::new(&source, 2);

        let err = resolver.resolve_next("S").await.unwrap_err();
        assert!(matches!(err, RolloverError::TransportFailure(_)));
    }

    #[tokio::test]
    async fn test_episode_listing_failure_is_transport_failure() {
        let source = FixtureSource::new()
            .with_show(
                "S",
                vec![
                    (season("s1", "Season 1", 1), vec![episode("e11", "S", date(2023, 1, 1), 0)]),
                    (season("s2", "Season 2", 2), vec![episode("e21", "S", date(2024, 1, 1), 0)]),
                ],
            )
            .failing_episodes("s2");
        let resolver = NextEpisodeResolver::new(&source, 2);

        // A later season failing is not papered over by an earlier candidate
        let err = resolver.resolve_next("S").await.unwrap_err();
        assert!(matches!(err, RolloverError::TransportFailure(_)));
    }

    #[tokio::test]
    async fn test_queries_one_episode_per_season() {
        let source = FixtureSource::new().with_show(
            "S",
            vec![
                (season("s1", "Season 1", 1), vec![episode("e11", "S", date(2023, 1, 1), 0)]),
                (season("s2", "Season 2", 2), vec![episode("e21", "S", date(2024, 1, 1), 0)]),
                (season("s3", "Season 3", 3), vec![episode("e31", "S", date(2025, 1, 1), 0)]),
            ],
        );
        let resolver = NextEpisodeResolver::new(&source, 2);
        resolver.resolve_next("S").await.unwrap();

        assert_eq!(
            source.calls(),
            vec![
                Call::UnwatchedSeasons("S".to_string(), 2),
                Call::UnwatchedEpisodes("s1".to_string(), 1),
                Call::UnwatchedEpisodes("s2".to_string(), 1),
            ]
        );
    }
}
