//! Player event listener for audio backend events

use tokio::sync::mpsc::UnboundedReceiver;

use crate::audio::PlayerEvent;
use crate::model::{EndOfTrack, PlaybackCommand, on_track_end};

use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut event_channel: UnboundedReceiver<PlayerEvent>) {
        let model = self.model.clone();
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                let model_guard = model.lock().await;

                if model_guard.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }

                match event {
                    PlayerEvent::Loading => {
                        tracing::debug!("PlayerEvent::Loading");
                        model_guard.dispatch(PlaybackCommand::SetLoading(true)).await;
                    }
                    PlayerEvent::MetadataReady { duration_secs } => {
                        // Decoder duration when known, catalog duration otherwise
                        let state = model_guard.get_playback().await;
                        let duration = duration_secs
                            .or_else(|| state.current_song.as_ref().map(|s| s.duration))
                            .unwrap_or(0.0);
                        tracing::debug!(duration, "PlayerEvent::MetadataReady");
                        model_guard
                            .dispatch(PlaybackCommand::SetDuration(duration))
                            .await;
                        model_guard.dispatch(PlaybackCommand::SetLoading(false)).await;
                    }
                    PlayerEvent::TimeUpdate { position_secs } => {
                        tracing::trace!(position_secs, "PlayerEvent::TimeUpdate");
                        model_guard
                            .dispatch(PlaybackCommand::SetTime(position_secs))
                            .await;
                    }
                    PlayerEvent::EndOfTrack => {
                        let state = model_guard.get_playback().await;
                        match on_track_end(state.repeat, state.current_index, state.queue.len()) {
                            EndOfTrack::RestartCurrent => {
                                tracing::debug!("Track ended, repeating current");
                                model_guard.dispatch(PlaybackCommand::SetTime(0.0)).await;
                                drop(model_guard);
                                let backend_guard = controller.audio_backend.lock().await;
                                if let Some(backend) = backend_guard.as_ref() {
                                    backend.restart();
                                }
                                continue;
                            }
                            EndOfTrack::Advance => {
                                tracing::debug!("Track ended, advancing queue");
                                let state =
                                    model_guard.dispatch(PlaybackCommand::Advance).await;
                                drop(model_guard);
                                if let Some(song) = state.current_song {
                                    controller.load_and_play(&song).await;
                                }
                                continue;
                            }
                            EndOfTrack::Finish => {
                                tracing::debug!("Queue finished, pausing");
                                model_guard.dispatch(PlaybackCommand::Pause).await;
                            }
                        }
                    }
                    PlayerEvent::PlayRejected => {
                        tracing::warn!("PlayerEvent::PlayRejected");
                        drop(model_guard);
                        controller
                            .report_playback_error("Playback failed. Please try again.")
                            .await;
                        continue;
                    }
                    PlayerEvent::LoadFailed { reason } => {
                        tracing::error!(%reason, "PlayerEvent::LoadFailed");
                        drop(model_guard);
                        controller
                            .report_playback_error("Failed to load audio. Please try again.")
                            .await;
                        continue;
                    }
                }
            }
        });
    }
}
