//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (enums, UI state, etc.)
//! - `catalog`: Wire documents served by the REST backend
//! - `error`: Typed errors for the API layer
//! - `queue`: Pure queue-navigation rules
//! - `playback`: Playback store and its command enum
//! - `content`: Content view data (song lists, playlists, queue view)
//! - `cache`: Liked songs cache for fast lookup
//! - `api_client`: REST client for the catalog backend
//! - `app_model`: Main application model with state management methods

mod api_client;
mod app_model;
mod cache;
mod catalog;
mod content;
mod error;
mod playback;
mod queue;
mod types;

// Re-export all public types for convenient access
pub use types::{ActiveSection, LibraryItem, PlaylistItem, RepeatMode, SelectedItem, UiState};

pub use catalog::{
    Album, Artist, Genre, NewUser, Playlist, Song, User, UserPreferences,
    RECENTLY_PLAYED_LIMIT,
};

pub use error::ApiError;

pub use queue::{on_track_end, EndOfTrack};

pub use playback::{PlaybackCommand, PlaybackState, DEFAULT_VOLUME};

pub use content::{ContentState, ContentView, PlaylistDetail};

pub use cache::LikedSongsCache;

pub use api_client::ApiClient;

pub use app_model::AppModel;
