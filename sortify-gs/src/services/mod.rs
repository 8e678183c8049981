//! Music-service integration
//!
//! - [`MusicService`]: the operations the sorter needs
//! - [`SpotifyClient`]: HTTP implementation for the Spotify Web API

pub mod music_service;
pub mod spotify_client;

pub use music_service::{MusicService, PlaylistSummary, ServiceError};
pub use spotify_client::{SpotifyClient, SpotifyClientConfig};
