//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and manages playback operations.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Playback control methods
//! - `navigation`: Library/playlist/search navigation
//! - `playlists`: Playlist create/delete and membership edits
//! - `player_events`: Audio backend event listener

mod input;
mod navigation;
mod playback;
mod player_events;
mod playlists;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::AudioBackend;
use crate::model::{ApiError, AppModel};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) audio_backend: Arc<Mutex<Option<AudioBackend>>>,
    event_listener_started: Arc<Mutex<bool>>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        audio_backend: Arc<Mutex<Option<AudioBackend>>>,
    ) -> Self {
        Self {
            model,
            audio_backend,
            event_listener_started: Arc::new(Mutex::new(false)),
        }
    }

    /// Try to start the player event listener if backend is ready and not already started
    pub(crate) async fn try_start_event_listener(&self) {
        let mut started = self.event_listener_started.lock().await;
        if *started {
            return;
        }

        let backend_guard = self.audio_backend.lock().await;
        if let Some(backend) = backend_guard.as_ref() {
            if let Some(event_channel) = backend.take_event_channel().await {
                *started = true;
                drop(backend_guard);
                drop(started);
                self.start_player_event_listener(event_channel);
            }
        }
    }

    pub(crate) fn format_error(error: &ApiError) -> String {
        match error {
            ApiError::Credentials(message) => message.clone(),
            ApiError::DuplicateSong => error.to_string(),
            ApiError::NotFound => {
                "Not found. The library may have changed; try reloading the view.".to_string()
            }
            ApiError::Request(e) if e.is_timeout() => {
                "The music server took too long to respond. Please try again.".to_string()
            }
            ApiError::Request(e) if e.is_connect() => {
                "Cannot reach the music server. Is it running?".to_string()
            }
            ApiError::Status { status: 429, .. } => {
                "Rate limited. Please wait a moment.".to_string()
            }
            ApiError::Status { status, .. } if *status >= 500 => {
                "The music server hit an error. Please try again.".to_string()
            }
            _ => format!("Error: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_pass_through_verbatim() {
        let err = ApiError::Credentials("Invalid password".to_string());
        assert_eq!(AppController::format_error(&err), "Invalid password");
    }

    #[test]
    fn duplicate_song_keeps_its_message() {
        assert_eq!(
            AppController::format_error(&ApiError::DuplicateSong),
            "Song is already in this playlist"
        );
    }

    #[test]
    fn server_errors_get_a_friendly_message() {
        let err = ApiError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(
            AppController::format_error(&err),
            "The music server hit an error. Please try again."
        );
    }
}
