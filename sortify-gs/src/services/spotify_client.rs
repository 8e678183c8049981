//! Spotify Web API client
//!
//! Implements [`MusicService`] over HTTPS with a bearer token obtained
//! elsewhere (the authorization flow is not handled here). Requests are
//! throttled client-side and large id lists are split to the endpoint limits.

use super::music_service::{MusicService, PlaylistSummary, ServiceError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

const USER_AGENT: &str = concat!("sortify/", env!("CARGO_PKG_VERSION"));

/// Page size for playlist listing
const PLAYLIST_PAGE_SIZE: usize = 50;

/// Most ids accepted by the audio-features and add-items endpoints
const MAX_IDS_PER_REQUEST: usize = 100;

/// Client settings
#[derive(Clone)]
pub struct SpotifyClientConfig {
    /// API root, e.g. `https://api.spotify.com/v1`
    pub base_url: String,
    /// OAuth bearer token
    pub access_token: String,
    /// Whether created playlists are public
    pub public_playlists: bool,
    /// Client-side request budget
    pub requests_per_second: u32,
}

impl SpotifyClientConfig {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            public_playlists: true,
            requests_per_second: 10,
        }
    }
}

impl std::fmt::Debug for SpotifyClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClientConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("public_playlists", &self.public_playlists)
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AudioFeaturesResponse {
    audio_features: Vec<Value>,
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    base_url: String,
    access_token: String,
    public_playlists: bool,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    user_id: OnceCell<String>,
}

/// Map a non-success status to a [`ServiceError`]
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 => Err(ServiceError::Unauthorized),
        429 => {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            Err(ServiceError::RateLimited(retry_after))
        }
        code => {
            let body = response.text().await.unwrap_or_default();
            Err(ServiceError::Api(code, body))
        }
    }
}

/// Spotify track URI for a bare track id
pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{}", track_id)
}

impl SpotifyClient {
    pub fn new(config: SpotifyClientConfig) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = governor::RateLimiter::direct(governor::Quota::per_second(per_second));

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token,
            public_playlists: config.public_playlists,
            rate_limiter,
            user_id: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        self.rate_limiter.until_ready().await;

        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ServiceError> {
        self.rate_limiter.until_ready().await;

        let url = self.url(path);
        debug!(url = %url, "POST");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }

    /// Id of the token's user, fetched once
    pub async fn current_user_id(&self) -> Result<&str, ServiceError> {
        let id = self
            .user_id
            .get_or_try_init(|| async {
                let me: IdOnly = self.get_json("/me", &[]).await?;
                debug!(user_id = %me.id, "Resolved current user");
                Ok::<_, ServiceError>(me.id)
            })
            .await?;
        Ok(id.as_str())
    }
}

#[async_trait]
impl MusicService for SpotifyClient {
    async fn list_user_playlists(&self) -> Result<Vec<PlaylistSummary>, ServiceError> {
        let user_id = self.current_user_id().await?.to_string();
        let path = format!("/users/{}/playlists", user_id);

        let mut playlists = Vec::new();
        let mut offset = 0;
        loop {
            let page: Paging<PlaylistSummary> = self
                .get_json(
                    &path,
                    &[
                        ("limit", PLAYLIST_PAGE_SIZE.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;

            if page.items.is_empty() {
                break;
            }
            offset += page.items.len();
            playlists.extend(page.items);
        }

        debug!(count = playlists.len(), "Listed user playlists");
        Ok(playlists)
    }

    async fn create_playlist(&self, name: &str) -> Result<String, ServiceError> {
        let user_id = self.current_user_id().await?.to_string();
        let body = json!({
            "name": name,
            "public": self.public_playlists,
            "collaborative": false,
            "description": "",
        });

        let created: IdOnly = self
            .post_json(&format!("/users/{}/playlists", user_id), &body)
            .await?;
        Ok(created.id)
    }

    async fn add_items_to_playlist(
        &self,
        playlist_id: &str,
        item_ids: &[String],
    ) -> Result<(), ServiceError> {
        let path = format!("/playlists/{}/tracks", playlist_id);
        for chunk in item_ids.chunks(MAX_IDS_PER_REQUEST) {
            let uris: Vec<String> = chunk.iter().map(|id| track_uri(id)).collect();
            let _snapshot: Value = self.post_json(&path, &json!({ "uris": uris })).await?;
        }
        Ok(())
    }

    async fn fetch_saved_tracks(&self, offset: usize, limit: usize) -> Result<Vec<Value>, ServiceError> {
        let page: Paging<Value> = self
            .get_json(
                "/me/tracks",
                &[("limit", limit.to_string()), ("offset", offset.to_string())],
            )
            .await?;
        Ok(page.items)
    }

    async fn fetch_audio_features(&self, track_ids: &[String]) -> Result<Vec<Value>, ServiceError> {
        let mut features = Vec::with_capacity(track_ids.len());
        for chunk in track_ids.chunks(MAX_IDS_PER_REQUEST) {
            let response: AudioFeaturesResponse = self
                .get_json("/audio-features", &[("ids", chunk.join(","))])
                .await?;

            if response.audio_features.len() != chunk.len() {
                return Err(ServiceError::Parse(format!(
                    "requested audio features for {} tracks, got {}",
                    chunk.len(),
                    response.audio_features.len()
                )));
            }
            features.extend(response.audio_features);
        }
        Ok(features)
    }
}
