//! Navigation-related controller methods (library, playlists, search)

use crate::model::{ActiveSection, SelectedItem, Song};

use super::AppController;

impl AppController {
    pub async fn perform_search(&self, query: &str) {
        tracing::debug!(query, "Performing search");
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(api) = &model.api {
            match api.search_songs(query).await {
                Ok(mut songs) => {
                    tracing::info!(query, results = songs.len(), "Search completed");
                    model.mark_songs_liked(&mut songs).await;
                    model
                        .set_root_song_list(format!("Search: {}", query), songs)
                        .await;
                    // Switch to MainContent section to show results
                    model.set_active_section(ActiveSection::MainContent).await;
                }
                Err(e) => {
                    tracing::error!(query, error = %e, "Search failed");
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn load_user_playlists(&self) {
        let model = self.model.lock().await;
        let user_id = match model.get_user_id().await {
            Some(id) => id,
            None => return,
        };

        if let Some(api) = &model.api {
            match api.get_playlist_items(&user_id).await {
                Ok(playlists) => {
                    model.set_playlists(playlists).await;
                }
                Err(e) => {
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn open_playlist(&self, playlist_id: &str) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(api) = &model.api {
            match api.get_playlist_detail(playlist_id).await {
                Ok(mut detail) => {
                    model.mark_songs_liked(&mut detail.songs).await;
                    model.set_playlist_detail(detail).await;
                    // Switch to MainContent section to show playlist details
                    model.set_active_section(ActiveSection::MainContent).await;
                }
                Err(e) => {
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn open_library_item(&self, index: usize) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(api) = &model.api {
            let result = match index {
                0 => {
                    // All songs
                    match api.get_songs_with_details().await {
                        Ok(mut songs) => {
                            model.mark_songs_liked(&mut songs).await;
                            model
                                .set_root_song_list("All songs".to_string(), songs)
                                .await;
                            Ok(())
                        }
                        Err(e) => Err(e),
                    }
                }
                1 => match api.get_artists().await {
                    Ok(artists) => {
                        model.set_artists(artists).await;
                        Ok(())
                    }
                    Err(e) => Err(e),
                },
                2 => match api.get_albums().await {
                    Ok(albums) => {
                        model.set_albums(albums).await;
                        Ok(())
                    }
                    Err(e) => Err(e),
                },
                3 => match api.get_genres().await {
                    Ok(genres) => {
                        model.set_genres(genres).await;
                        Ok(())
                    }
                    Err(e) => Err(e),
                },
                4 => {
                    // Liked songs are tracked locally, so filter the catalog
                    // against the cache instead of asking the backend.
                    match api.get_songs_with_details().await {
                        Ok(songs) => {
                            let liked_ids = model.liked_songs.snapshot().await;
                            let mut songs: Vec<Song> = songs
                                .into_iter()
                                .filter(|s| liked_ids.contains(&s.id))
                                .collect();
                            for song in songs.iter_mut() {
                                song.liked = true;
                            }
                            model
                                .set_root_song_list("Liked songs".to_string(), songs)
                                .await;
                            Ok(())
                        }
                        Err(e) => Err(e),
                    }
                }
                5 => {
                    // Recently played
                    let user_id = model.get_user_id().await.unwrap_or_default();
                    match api.get_recently_played(&user_id).await {
                        Ok(mut songs) => {
                            model.mark_songs_liked(&mut songs).await;
                            model
                                .set_root_song_list("Recently played".to_string(), songs)
                                .await;
                            Ok(())
                        }
                        Err(e) => Err(e),
                    }
                }
                _ => {
                    model.set_content_loading(false).await;
                    return;
                }
            };

            if let Err(e) = result {
                model.set_content_loading(false).await;
                let error_msg = Self::format_error(&e);
                model.set_error(error_msg).await;
            } else {
                // Switch to MainContent section to show results
                model.set_active_section(ActiveSection::MainContent).await;
            }
        }
    }

    pub async fn open_artist(&self, artist_id: &str, name: &str) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(api) = &model.api {
            match api.get_songs_by_artist(artist_id).await {
                Ok(mut songs) => {
                    model.mark_songs_liked(&mut songs).await;
                    model.push_song_list(name.to_string(), songs).await;
                }
                Err(e) => {
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn open_album(&self, album_id: &str, title: &str) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(api) = &model.api {
            match api.get_songs_by_album(album_id).await {
                Ok(mut songs) => {
                    model.mark_songs_liked(&mut songs).await;
                    model.push_song_list(title.to_string(), songs).await;
                }
                Err(e) => {
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn open_genre(&self, name: &str) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(api) = &model.api {
            match api.get_songs_by_genre(name).await {
                Ok(mut songs) => {
                    model.mark_songs_liked(&mut songs).await;
                    model
                        .push_song_list(format!("Genre: {}", name), songs)
                        .await;
                }
                Err(e) => {
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn handle_selected_item(&self, item: SelectedItem) {
        match item {
            SelectedItem::Song { index } => {
                let model = self.model.lock().await;
                let songs = model.get_visible_songs().await;
                drop(model);

                if let Some(song) = songs.get(index).cloned() {
                    // The visible list becomes the play queue.
                    self.play_song(song, Some(songs), Some(index)).await;
                }
            }
            SelectedItem::Artist { id, name } => {
                self.open_artist(&id, &name).await;
            }
            SelectedItem::Album { id, name } => {
                self.open_album(&id, &name).await;
            }
            SelectedItem::Genre { name } => {
                self.open_genre(&name).await;
            }
        }
    }
}
