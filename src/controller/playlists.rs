//! Playlist management controller methods (create, delete, membership)

use crate::model::ContentView;

use super::AppController;

impl AppController {
    /// Create a playlist from the name typed into the input overlay.
    /// Whitespace-only names are dropped without a round trip.
    pub async fn create_playlist_from_input(&self) {
        let model = self.model.lock().await;
        let name = model.take_playlist_input().await;
        let name = name.trim().to_string();
        if name.is_empty() {
            return;
        }

        let api = model.get_api_client().await;
        let user_id = model.get_user_id().await;
        drop(model);

        if let (Some(api), Some(user_id)) = (api, user_id) {
            match api.create_playlist(&name, None, &user_id).await {
                Ok(playlist) => {
                    tracing::info!(
                        playlist_id = %playlist.id,
                        name = %playlist.name,
                        "Playlist created"
                    );
                    self.load_user_playlists().await;
                }
                Err(e) => {
                    let model = self.model.lock().await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn delete_selected_playlist(&self) {
        let model = self.model.lock().await;
        let playlist = match model.get_selected_playlist().await {
            Some(item) => item,
            None => return,
        };
        let api = model.get_api_client().await;
        drop(model);

        if let Some(api) = api {
            match api.delete_playlist(&playlist.id).await {
                Ok(()) => {
                    tracing::info!(playlist_id = %playlist.id, "Playlist deleted");
                    let model = self.model.lock().await;
                    // Drop the detail view if the deleted playlist is open
                    let state = model.get_content_state().await;
                    if let ContentView::PlaylistDetail { detail, .. } = &state.view {
                        if detail.playlist.id == playlist.id {
                            model.navigate_back().await;
                        }
                    }
                    drop(model);
                    self.load_user_playlists().await;
                }
                Err(e) => {
                    let model = self.model.lock().await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    /// Add the picker's song to the highlighted playlist. A duplicate add is
    /// rejected by the client and surfaces as a normal error message.
    pub async fn add_picked_song_to_playlist(&self) {
        let model = self.model.lock().await;
        let (playlist, song_id) = match model.get_picker_target().await {
            Some(target) => target,
            None => {
                model.close_playlist_picker().await;
                return;
            }
        };
        model.close_playlist_picker().await;

        let api = model.get_api_client().await;
        drop(model);

        if let Some(api) = api {
            match api.add_song_to_playlist(&playlist.id, &song_id).await {
                Ok(_) => {
                    tracing::info!(
                        playlist_id = %playlist.id,
                        song_id,
                        "Song added to playlist"
                    );
                    self.refresh_open_playlist(&playlist.id).await;
                }
                Err(e) => {
                    let model = self.model.lock().await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn remove_selected_playlist_song(&self) {
        let model = self.model.lock().await;
        let (playlist_id, song_id) = match model.get_selected_playlist_song().await {
            Some(target) => target,
            None => return,
        };
        let api = model.get_api_client().await;
        drop(model);

        if let Some(api) = api {
            match api.remove_song_from_playlist(&playlist_id, &song_id).await {
                Ok(_) => {
                    tracing::info!(playlist_id, song_id, "Song removed from playlist");
                    self.refresh_open_playlist(&playlist_id).await;
                }
                Err(e) => {
                    let model = self.model.lock().await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    /// Re-fetch the detail view when the changed playlist is the one open.
    async fn refresh_open_playlist(&self, playlist_id: &str) {
        let model = self.model.lock().await;
        let state = model.get_content_state().await;
        let is_open = matches!(
            &state.view,
            ContentView::PlaylistDetail { detail, .. } if detail.playlist.id == playlist_id
        );
        drop(model);

        if is_open {
            self.open_playlist(playlist_id).await;
        }
    }
}
