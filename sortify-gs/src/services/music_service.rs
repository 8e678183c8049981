//! Music-service capability used by the sorter
//!
//! The sorter only needs a handful of library and playlist operations. They are
//! expressed as a trait so that the HTTP client and test doubles are
//! interchangeable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Music-service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Access token missing, expired or lacking scopes
    #[error("Unauthorized: the access token was rejected")]
    Unauthorized,

    /// Too many requests; seconds to wait if the service said
    #[error("Rate limited by the music service (retry after {0:?}s)")]
    RateLimited(Option<u64>),

    /// Service returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Playlist name and id as listed for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub name: String,
    pub id: String,
}

impl PlaylistSummary {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Library and playlist operations of a music service
#[async_trait]
pub trait MusicService: Send + Sync {
    /// All playlists of the current user
    async fn list_user_playlists(&self) -> Result<Vec<PlaylistSummary>, ServiceError>;

    /// Create a playlist and return its id
    async fn create_playlist(&self, name: &str) -> Result<String, ServiceError>;

    /// Append tracks to a playlist
    async fn add_items_to_playlist(
        &self,
        playlist_id: &str,
        item_ids: &[String],
    ) -> Result<(), ServiceError>;

    /// One page of saved-track entries; empty when past the end of the library
    async fn fetch_saved_tracks(&self, offset: usize, limit: usize) -> Result<Vec<Value>, ServiceError>;

    /// Audio-feature responses, index-aligned with `track_ids`
    async fn fetch_audio_features(&self, track_ids: &[String]) -> Result<Vec<Value>, ServiceError>;
}
