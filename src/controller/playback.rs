//! Playback control methods

use crate::model::{ActiveSection, PlaybackCommand, Song};

use super::AppController;

/// Step size for the keyboard volume keys.
const VOLUME_STEP: f64 = 0.05;
/// Seconds jumped by the seek keys.
const SEEK_STEP_SECS: f64 = 5.0;

impl AppController {
    /// Begin playing a song, optionally inside a queue context. This is the
    /// only path that records play history; skips and natural advances do
    /// not count as an explicit play.
    pub async fn play_song(&self, song: Song, queue: Option<Vec<Song>>, index: Option<usize>) {
        tracing::info!(song_id = %song.id, title = %song.title, "Playing song");

        let model = self.model.lock().await;
        model
            .dispatch(PlaybackCommand::Start {
                song: song.clone(),
                queue,
                index,
            })
            .await;
        let api = model.get_api_client().await;
        let user_id = model.get_user_id().await;
        drop(model);

        self.load_and_play(&song).await;

        // Record history without holding up playback; failures are logged
        // and never surfaced
        if let (Some(api), Some(user_id)) = (api, user_id) {
            let song_id = song.id.clone();
            tokio::spawn(async move {
                if let Err(e) = api.add_to_recently_played(&user_id, &song_id).await {
                    tracing::warn!(error = %e, song_id, "Failed to record recently played");
                }
            });
        }
    }

    pub async fn toggle_playback(&self) {
        let model = self.model.lock().await;
        let state = model.get_playback().await;
        tracing::debug!(is_playing = state.is_playing, "Toggling playback");

        if state.current_song.is_none() {
            tracing::debug!("Nothing to toggle, no current song");
            return;
        }

        if state.is_playing {
            model.dispatch(PlaybackCommand::Pause).await;
            drop(model);
            let backend_guard = self.audio_backend.lock().await;
            if let Some(backend) = backend_guard.as_ref() {
                backend.pause();
            }
        } else {
            model.dispatch(PlaybackCommand::Resume).await;
            drop(model);
            let backend_guard = self.audio_backend.lock().await;
            if let Some(backend) = backend_guard.as_ref() {
                backend.play();
            }
        }
    }

    pub async fn next_song(&self) {
        tracing::debug!("Skipping to next song");
        let model = self.model.lock().await;
        let state = model.dispatch(PlaybackCommand::Advance).await;
        drop(model);

        if let Some(song) = state.current_song {
            self.load_and_play(&song).await;
        }
    }

    pub async fn previous_song(&self) {
        tracing::debug!("Skipping to previous song");
        let model = self.model.lock().await;
        let state = model.dispatch(PlaybackCommand::Retreat).await;
        drop(model);

        if let Some(song) = state.current_song {
            self.load_and_play(&song).await;
        }
    }

    pub async fn seek_to(&self, position_secs: f64) {
        let model = self.model.lock().await;
        model.dispatch(PlaybackCommand::SetTime(position_secs)).await;
        drop(model);

        let backend_guard = self.audio_backend.lock().await;
        if let Some(backend) = backend_guard.as_ref() {
            backend.seek(position_secs);
        }
    }

    pub async fn seek_forward(&self) {
        let state = { self.model.lock().await.get_playback().await };
        if state.current_song.is_some() {
            self.seek_to(state.current_time + SEEK_STEP_SECS).await;
        }
    }

    pub async fn seek_backward(&self) {
        let state = { self.model.lock().await.get_playback().await };
        if state.current_song.is_some() {
            self.seek_to((state.current_time - SEEK_STEP_SECS).max(0.0)).await;
        }
    }

    pub async fn set_volume(&self, level: f64) {
        let model = self.model.lock().await;
        model.dispatch(PlaybackCommand::SetVolume(level)).await;
        drop(model);
        self.sync_output_volume().await;
    }

    pub async fn volume_up(&self) {
        let state = { self.model.lock().await.get_playback().await };
        self.set_volume(state.volume + VOLUME_STEP).await;
    }

    pub async fn volume_down(&self) {
        let state = { self.model.lock().await.get_playback().await };
        self.set_volume(state.volume - VOLUME_STEP).await;
    }

    pub async fn toggle_mute(&self) {
        let model = self.model.lock().await;
        model.dispatch(PlaybackCommand::ToggleMute).await;
        drop(model);
        self.sync_output_volume().await;
    }

    pub async fn toggle_shuffle(&self) {
        let model = self.model.lock().await;
        let state = model.dispatch(PlaybackCommand::ToggleShuffle).await;
        tracing::debug!(shuffle = state.shuffle, "Shuffle toggled");
    }

    pub async fn cycle_repeat(&self) {
        let model = self.model.lock().await;
        let state = model.dispatch(PlaybackCommand::CycleRepeat).await;
        tracing::debug!(repeat = state.repeat.label(), "Repeat mode cycled");
    }

    pub async fn toggle_liked_song(&self) {
        let model = self.model.lock().await;
        let Some(song) = model.get_selected_song().await else {
            return;
        };

        let liked = model.liked_songs.toggle(&song.id).await;
        model.update_song_liked_status(&song.id, liked).await;
        let cache = model.liked_songs.clone();
        drop(model);

        let status = if liked { "added to" } else { "removed from" };
        tracing::info!(song_id = %song.id, status, "Song liked status toggled");

        tokio::spawn(async move {
            if let Err(e) = cache.save_to_disk().await {
                tracing::warn!(error = %e, "Failed to persist liked songs");
            }
        });
    }

    /// Show the playback queue in the main panel.
    pub async fn show_queue(&self) {
        let model = self.model.lock().await;
        let state = model.get_playback().await;
        model.set_queue_view(state.queue, state.current_index).await;
        model.set_active_section(ActiveSection::MainContent).await;
    }

    /// Push the current source and desired transport state to the audio
    /// layer. Reports the standard play failure when no output exists.
    pub(crate) async fn load_and_play(&self, song: &Song) {
        let model = self.model.lock().await;
        let api = model.get_api_client().await;
        drop(model);

        let url = match &api {
            Some(api) => api.resolve_url(&song.audio_url),
            None => song.audio_url.clone(),
        };

        let backend_guard = self.audio_backend.lock().await;
        if let Some(backend) = backend_guard.as_ref() {
            backend.load(url);
            backend.play();
        } else {
            drop(backend_guard);
            tracing::warn!("Play requested with no audio backend");
            self.report_playback_error("Playback failed. Please try again.").await;
        }
    }

    pub(crate) async fn sync_output_volume(&self) {
        let state = { self.model.lock().await.get_playback().await };
        let backend_guard = self.audio_backend.lock().await;
        if let Some(backend) = backend_guard.as_ref() {
            backend.set_output_volume(state.effective_volume());
        }
    }

    /// Record a playback error in the store and flash it in the UI.
    pub(crate) async fn report_playback_error(&self, message: &str) {
        let model = self.model.lock().await;
        model
            .dispatch(PlaybackCommand::SetError(message.to_string()))
            .await;
        model.set_error(message.to_string()).await;
    }
}
