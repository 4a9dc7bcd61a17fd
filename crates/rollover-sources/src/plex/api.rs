use crate::SourceError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use rollover_models::{EpisodeRecord, PlaylistSummary, SeasonRef};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

pub const PLEX_TV_BASE_URL: &str = "https://plex.tv";
const CLIENT_IDENTIFIER: &str = "plex-rollover";

#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub url: String,
    pub name: String,
    pub identifier: String,
}

#[derive(Debug, Deserialize)]
struct MediaContainer {
    #[serde(rename = "Metadata")]
    metadata: Option<Vec<Value>>,
    #[serde(rename = "machineIdentifier")]
    machine_identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlexResponse {
    #[serde(rename = "MediaContainer")]
    media_container: MediaContainer,
}

/// Thin HTTP layer over the Plex Media Server and plex.tv APIs.
///
/// Server-scoped calls take the server base URL explicitly so the same client can be used
/// before the server is known (discovery through plex.tv).
pub struct PlexHttpClient {
    client: Client,
    plex_tv_base_url: String,
}

impl PlexHttpClient {
    pub fn new(token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-token"),
                    reqwest::header::HeaderValue::from_str(token)
                        .context("Invalid token format")?,
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-client-identifier"),
                    reqwest::header::HeaderValue::from_static(CLIENT_IDENTIFIER),
                );
                headers
            })
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            plex_tv_base_url: PLEX_TV_BASE_URL.to_string(),
        })
    }

    /// Point plex.tv calls somewhere else (tests)
    pub fn with_plex_tv_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.plex_tv_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<reqwest::Response, SourceError> {
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::request(context, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                context: context.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn get_json(&self, url: &str, context: &str) -> Result<Value, SourceError> {
        trace!("Plex GET {}", url);
        let response = self.send(self.client.get(url), context).await?;
        response
            .json()
            .await
            .map_err(|e| SourceError::data(format!("{}: unreadable response body: {}", context, e)))
    }

    async fn get_container(&self, url: &str, context: &str) -> Result<MediaContainer, SourceError> {
        let json = self.get_json(url, context).await?;
        let response: PlexResponse = serde_json::from_value(json)
            .map_err(|e| SourceError::data(format!("{}: missing MediaContainer: {}", context, e)))?;
        Ok(response.media_container)
    }

    /// `MediaContainer.Metadata`; Plex leaves the array out entirely when it is empty
    async fn get_metadata(&self, url: &str, context: &str) -> Result<Vec<Value>, SourceError> {
        let container = self.get_container(url, context).await?;
        let metadata = container.metadata.unwrap_or_default();
        debug!("{}: {} entries", context, metadata.len());
        Ok(metadata)
    }

    pub async fn authenticate(&self) -> Result<(), SourceError> {
        let url = format!("{}/api/v2/user", self.plex_tv_base_url);
        self.send(self.client.get(&url), "Failed to authenticate with Plex").await?;
        debug!("Plex authentication successful");
        Ok(())
    }

    pub async fn get_servers(&self) -> Result<Vec<ServerInfo>, SourceError> {
        let url = format!("{}/api/v2/resources?includeHttps=1", self.plex_tv_base_url);
        let json = self.get_json(&url, "Failed to get Plex servers").await?;

        let mut servers = Vec::new();
        let resources = json.as_array().cloned().unwrap_or_default();
        debug!("Plex server discovery: Found {} resources", resources.len());

        for resource in &resources {
            let provides = resource.get("provides").and_then(|p| p.as_str());
            let product = resource.get("product").and_then(|p| p.as_str());

            let is_server = provides.map(|p| p.contains("server")).unwrap_or(false)
                || product.map(|p| p == "Plex Media Server").unwrap_or(false);
            if !is_server {
                continue;
            }

            let name = resource
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or("Unknown")
                .to_string();
            let identifier = resource
                .get("clientIdentifier")
                .and_then(|i| i.as_str())
                .unwrap_or("")
                .to_string();

            // Prefer local connections, then any connection
            let mut local_uri = None;
            let mut any_uri = None;
            if let Some(connections) = resource.get("connections").and_then(|c| c.as_array()) {
                for conn in connections {
                    if let Some(uri) = conn.get("uri").and_then(|u| u.as_str()) {
                        let is_local = conn.get("local").and_then(|l| l.as_bool()).unwrap_or(false);
                        if is_local && local_uri.is_none() {
                            local_uri = Some(uri.to_string());
                        } else if any_uri.is_none() {
                            any_uri = Some(uri.to_string());
                        }
                    }
                }
            }

            if let Some(uri) = local_uri.or(any_uri) {
                debug!("Plex server discovery: Found server '{}' at {}", name, uri);
                servers.push(ServerInfo {
                    url: uri,
                    name,
                    identifier,
                });
            }
        }

        debug!("Plex server discovery: Found {} servers", servers.len());
        Ok(servers)
    }

    pub async fn get_machine_identifier(&self, server_url: &str) -> Result<String, SourceError> {
        let url = format!("{}/identity", server_url);
        let container = self.get_container(&url, "Failed to get server identity").await?;
        container
            .machine_identifier
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SourceError::data("Server identity has no machineIdentifier"))
    }

    pub async fn get_playlists(&self, server_url: &str) -> Result<Vec<PlaylistSummary>, SourceError> {
        let url = format!("{}/playlists", server_url);
        let metadata = self.get_metadata(&url, "Failed to get playlists").await?;
        metadata.iter().map(parse_playlist).collect()
    }

    pub async fn get_playlist_items(&self, server_url: &str, playlist_key: &str) -> Result<Vec<EpisodeRecord>, SourceError> {
        let url = format!("{}/playlists/{}/items", server_url, playlist_key);
        let metadata = self.get_metadata(&url, "Failed to get playlist items").await?;
        metadata.iter().map(parse_episode).collect()
    }

    async fn get_unwatched_children(
        &self,
        server_url: &str,
        parent_key: &str,
        limit: usize,
        context: &str,
    ) -> Result<Vec<Value>, SourceError> {
        let url = format!(
            "{}/library/metadata/{}/children?unwatched=1&X-Plex-Container-Start=0&X-Plex-Container-Size={}",
            server_url, parent_key, limit
        );
        let mut metadata = self.get_metadata(&url, context).await?;
        // Servers have been seen ignoring the container size
        metadata.truncate(limit);
        Ok(metadata)
    }

    pub async fn get_unwatched_seasons(&self, server_url: &str, show_key: &str, limit: usize) -> Result<Vec<SeasonRef>, SourceError> {
        let metadata = self
            .get_unwatched_children(server_url, show_key, limit, "Failed to get unwatched seasons")
            .await?;
        metadata.iter().map(parse_season).collect()
    }

    pub async fn get_unwatched_episodes(&self, server_url: &str, season_key: &str, limit: usize) -> Result<Vec<EpisodeRecord>, SourceError> {
        let metadata = self
            .get_unwatched_children(server_url, season_key, limit, "Failed to get unwatched episodes")
            .await?;
        metadata.iter().map(parse_episode).collect()
    }

    pub async fn clear_playlist(&self, server_url: &str, playlist_key: &str) -> Result<(), SourceError> {
        let url = format!("{}/playlists/{}/items", server_url, playlist_key);
        self.send(self.client.delete(&url), "Failed to clear playlist").await?;
        Ok(())
    }

    pub async fn add_to_playlist(
        &self,
        server_url: &str,
        machine_identifier: &str,
        playlist_key: &str,
        episode_key: &str,
    ) -> Result<(), SourceError> {
        let uri = format!(
            "server://{}/com.plexapp.plugins.library/library/metadata/{}",
            machine_identifier, episode_key
        );
        let url = format!(
            "{}/playlists/{}/items?uri={}",
            server_url,
            playlist_key,
            urlencoding::encode(&uri)
        );
        self.send(self.client.put(&url), "Failed to add item to playlist").await?;
        Ok(())
    }
}

/// Plex sends rating keys as strings, but numbers show up on some endpoints
fn value_as_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_u32(value: Option<&Value>) -> Option<u32> {
    value.and_then(|v| v.as_u64()).and_then(|v| u32::try_from(v).ok())
}

/// Saturates instead of wrapping so an oversized count still reads as watched
fn view_count(value: Option<&Value>) -> u32 {
    value
        .and_then(|v| v.as_u64())
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

fn value_as_str(value: Option<&Value>) -> Option<String> {
    value.and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// `originallyAvailableAt` is `YYYY-MM-DD`; tolerate a trailing time part
fn parse_air_date(value: Option<&Value>) -> Option<NaiveDate> {
    let raw = value?.as_str()?;
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn required_key(item: &Value, kind: &str) -> Result<String, SourceError> {
    value_as_string(item.get("ratingKey")).ok_or_else(|| {
        let title = item.get("title").and_then(|t| t.as_str()).unwrap_or("unknown");
        SourceError::data(format!("{} '{}' has no ratingKey", kind, title))
    })
}

pub(crate) fn parse_playlist(item: &Value) -> Result<PlaylistSummary, SourceError> {
    Ok(PlaylistSummary {
        rating_key: required_key(item, "Playlist")?,
        title: value_as_str(item.get("title")).unwrap_or_default(),
        summary: value_as_str(item.get("summary")).unwrap_or_default(),
        playlist_type: value_as_str(item.get("playlistType")).unwrap_or_default(),
        leaf_count: value_as_u32(item.get("leafCount")),
    })
}

pub(crate) fn parse_season(item: &Value) -> Result<SeasonRef, SourceError> {
    Ok(SeasonRef {
        rating_key: required_key(item, "Season")?,
        title: value_as_str(item.get("title")).unwrap_or_default(),
        index: value_as_u32(item.get("index")),
    })
}

pub(crate) fn parse_episode(item: &Value) -> Result<EpisodeRecord, SourceError> {
    Ok(EpisodeRecord {
        rating_key: required_key(item, "Episode")?,
        title: value_as_str(item.get("title")).unwrap_or_default(),
        show_key: value_as_string(item.get("grandparentRatingKey")),
        show_title: value_as_str(item.get("grandparentTitle")),
        season_title: value_as_str(item.get("parentTitle")),
        index: value_as_u32(item.get("index")),
        originally_available_at: parse_air_date(item.get("originallyAvailableAt")),
        view_count: view_count(item.get("viewCount")),
    })
}
