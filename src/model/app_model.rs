//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::auth::Session;

use super::api_client::ApiClient;
use super::cache::LikedSongsCache;
use super::catalog::{Album, Artist, Genre, Song};
use super::content::{ContentState, ContentView, PlaylistDetail};
use super::playback::{PlaybackCommand, PlaybackState};
use super::types::{ActiveSection, PlaylistItem, SelectedItem, UiState};

/// Main application model containing all state
pub struct AppModel {
    pub api: Option<ApiClient>,
    session: Arc<Mutex<Option<Session>>>,
    playback: Arc<Mutex<PlaybackState>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub should_quit: Arc<Mutex<bool>>,
    pub liked_songs: LikedSongsCache,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            api: None,
            session: Arc::new(Mutex::new(None)),
            playback: Arc::new(Mutex::new(PlaybackState::default())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
            liked_songs: LikedSongsCache::new(),
        }
    }

    pub fn set_api_client(&mut self, client: ApiClient) {
        self.api = Some(client);
    }

    pub async fn get_api_client(&self) -> Option<ApiClient> {
        self.api.clone()
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub async fn set_session(&self, session: Session) {
        let mut state = self.ui_state.lock().await;
        state.user_name = Some(session.user.username.clone());
        drop(state);
        *self.session.lock().await = Some(session);
    }

    pub async fn get_session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    pub async fn get_user_id(&self) -> Option<String> {
        self.session.lock().await.as_ref().map(|s| s.user.id.clone())
    }

    // ========================================================================
    // Playback State
    // ========================================================================

    /// Run one command through the playback store and return the new state.
    pub async fn dispatch(&self, command: PlaybackCommand) -> PlaybackState {
        let mut playback = self.playback.lock().await;
        playback.apply(command);
        playback.clone()
    }

    pub async fn get_playback(&self) -> PlaybackState {
        self.playback.lock().await.clone()
    }

    pub async fn is_playing(&self) -> bool {
        self.playback.lock().await.is_playing
    }

    pub async fn current_song(&self) -> Option<Song> {
        self.playback.lock().await.current_song.clone()
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Library => {
                if state.library_selected > 0 {
                    state.library_selected -= 1;
                }
            }
            ActiveSection::Playlists => {
                if state.playlist_selected > 0 {
                    state.playlist_selected -= 1;
                }
            }
            _ => {}
        }
    }

    pub async fn move_selection_down(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Library => {
                if state.library_selected < state.library_items.len().saturating_sub(1) {
                    state.library_selected += 1;
                }
            }
            ActiveSection::Playlists => {
                if state.playlist_selected < state.playlists.len().saturating_sub(1) {
                    state.playlist_selected += 1;
                }
            }
            _ => {}
        }
    }

    pub async fn append_to_search(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.pop();
    }

    pub async fn clear_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.clear();
    }

    pub async fn get_search_query(&self) -> String {
        self.ui_state.lock().await.search_query.clone()
    }

    pub async fn set_playlists(&self, playlists: Vec<PlaylistItem>) {
        let mut state = self.ui_state.lock().await;
        if state.playlist_selected >= playlists.len() {
            state.playlist_selected = playlists.len().saturating_sub(1);
        }
        state.playlists = playlists;
    }

    pub async fn get_selected_playlist(&self) -> Option<PlaylistItem> {
        let state = self.ui_state.lock().await;
        state.playlists.get(state.playlist_selected).cloned()
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > 5 {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    // ========================================================================
    // Overlays
    // ========================================================================

    pub async fn open_playlist_picker(&self, song_id: String) {
        let mut state = self.ui_state.lock().await;
        state.picker_song_id = Some(song_id);
        state.picker_selected = 0;
        state.show_playlist_picker = true;
    }

    pub async fn close_playlist_picker(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_playlist_picker = false;
        state.picker_song_id = None;
    }

    pub async fn is_playlist_picker_open(&self) -> bool {
        self.ui_state.lock().await.show_playlist_picker
    }

    pub async fn picker_move_up(&self) {
        let mut state = self.ui_state.lock().await;
        if state.picker_selected > 0 {
            state.picker_selected -= 1;
        }
    }

    pub async fn picker_move_down(&self) {
        let mut state = self.ui_state.lock().await;
        if state.picker_selected < state.playlists.len().saturating_sub(1) {
            state.picker_selected += 1;
        }
    }

    /// The playlist and song the picker would commit right now.
    pub async fn get_picker_target(&self) -> Option<(PlaylistItem, String)> {
        let state = self.ui_state.lock().await;
        let playlist = state.playlists.get(state.picker_selected).cloned()?;
        let song_id = state.picker_song_id.clone()?;
        Some((playlist, song_id))
    }

    pub async fn open_playlist_input(&self) {
        let mut state = self.ui_state.lock().await;
        state.playlist_name_input.clear();
        state.show_playlist_input = true;
    }

    pub async fn close_playlist_input(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_playlist_input = false;
        state.playlist_name_input.clear();
    }

    pub async fn is_playlist_input_open(&self) -> bool {
        self.ui_state.lock().await.show_playlist_input
    }

    pub async fn push_input_char(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.playlist_name_input.push(c);
    }

    pub async fn backspace_input(&self) {
        let mut state = self.ui_state.lock().await;
        state.playlist_name_input.pop();
    }

    /// Close the input overlay and hand back whatever was typed.
    pub async fn take_playlist_input(&self) -> String {
        let mut state = self.ui_state.lock().await;
        state.show_playlist_input = false;
        std::mem::take(&mut state.playlist_name_input)
    }

    pub async fn show_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    // ========================================================================
    // Content State
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_content_loading(&self, loading: bool) {
        let mut state = self.content_state.lock().await;
        state.is_loading = loading;
    }

    /// Replace the main panel with a top-level song list (search results or
    /// a library view). Drops any drill-down history.
    pub async fn set_root_song_list(&self, title: String, songs: Vec<Song>) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::SongList {
            title,
            songs,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    /// Drill down into a song list, remembering the current view.
    pub async fn push_song_list(&self, title: String, songs: Vec<Song>) {
        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = ContentView::SongList {
            title,
            songs,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_artists(&self, artists: Vec<Artist>) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::Artists {
            artists,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_albums(&self, albums: Vec<Album>) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::Albums {
            albums,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_genres(&self, genres: Vec<Genre>) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::Genres {
            genres,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_playlist_detail(&self, detail: PlaylistDetail) {
        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty | ContentView::PlaylistDetail { .. }) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = ContentView::PlaylistDetail {
            detail,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_queue_view(&self, songs: Vec<Song>, playing_index: usize) {
        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty | ContentView::Queue { .. }) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = ContentView::Queue {
            songs,
            playing_index,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn navigate_back(&self) -> bool {
        let mut state = self.content_state.lock().await;
        if let Some(previous_view) = state.navigation_stack.pop() {
            state.view = previous_view;
            true
        } else {
            state.view = ContentView::Empty;
            false
        }
    }

    pub async fn content_move_up(&self) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::SongList { selected_index, .. }
            | ContentView::Artists { selected_index, .. }
            | ContentView::Albums { selected_index, .. }
            | ContentView::Genres { selected_index, .. }
            | ContentView::PlaylistDetail { selected_index, .. }
            | ContentView::Queue { selected_index, .. } => {
                if *selected_index > 0 {
                    *selected_index -= 1;
                }
            }
            ContentView::Empty => {}
        }
    }

    pub async fn content_move_down(&self) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::SongList { songs, selected_index, .. } => {
                if *selected_index < songs.len().saturating_sub(1) {
                    *selected_index += 1;
                }
            }
            ContentView::Artists { artists, selected_index } => {
                if *selected_index < artists.len().saturating_sub(1) {
                    *selected_index += 1;
                }
            }
            ContentView::Albums { albums, selected_index } => {
                if *selected_index < albums.len().saturating_sub(1) {
                    *selected_index += 1;
                }
            }
            ContentView::Genres { genres, selected_index } => {
                if *selected_index < genres.len().saturating_sub(1) {
                    *selected_index += 1;
                }
            }
            ContentView::PlaylistDetail { detail, selected_index } => {
                if *selected_index < detail.songs.len().saturating_sub(1) {
                    *selected_index += 1;
                }
            }
            ContentView::Queue { songs, selected_index, .. } => {
                if *selected_index < songs.len().saturating_sub(1) {
                    *selected_index += 1;
                }
            }
            ContentView::Empty => {}
        }
    }

    pub async fn get_selected_content_item(&self) -> Option<SelectedItem> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::SongList { songs, selected_index, .. } => {
                songs.get(*selected_index).map(|_| SelectedItem::Song {
                    index: *selected_index,
                })
            }
            ContentView::Artists { artists, selected_index } => artists
                .get(*selected_index)
                .map(|a| SelectedItem::Artist { id: a.id.clone(), name: a.name.clone() }),
            ContentView::Albums { albums, selected_index } => albums
                .get(*selected_index)
                .map(|a| SelectedItem::Album { id: a.id.clone(), name: a.title.clone() }),
            ContentView::Genres { genres, selected_index } => genres
                .get(*selected_index)
                .map(|g| SelectedItem::Genre { name: g.name.clone() }),
            ContentView::PlaylistDetail { detail, selected_index } => {
                detail.songs.get(*selected_index).map(|_| SelectedItem::Song {
                    index: *selected_index,
                })
            }
            ContentView::Queue { songs, selected_index, .. } => {
                songs.get(*selected_index).map(|_| SelectedItem::Song {
                    index: *selected_index,
                })
            }
            ContentView::Empty => None,
        }
    }

    /// The song list the current view shows, for building a play queue.
    pub async fn get_visible_songs(&self) -> Vec<Song> {
        let state = self.content_state.lock().await;
        state.view.songs().map(|s| s.to_vec()).unwrap_or_default()
    }

    pub async fn get_selected_song(&self) -> Option<Song> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::SongList { songs, selected_index, .. } => {
                songs.get(*selected_index).cloned()
            }
            ContentView::PlaylistDetail { detail, selected_index } => {
                detail.songs.get(*selected_index).cloned()
            }
            ContentView::Queue { songs, selected_index, .. } => {
                songs.get(*selected_index).cloned()
            }
            _ => None,
        }
    }

    /// Selected song together with its playlist, when a playlist detail view
    /// is showing. Used for removal.
    pub async fn get_selected_playlist_song(&self) -> Option<(String, String)> {
        let state = self.content_state.lock().await;
        if let ContentView::PlaylistDetail { detail, selected_index } = &state.view {
            detail
                .songs
                .get(*selected_index)
                .map(|s| (detail.playlist.id.clone(), s.id.clone()))
        } else {
            None
        }
    }

    pub async fn mark_songs_liked(&self, songs: &mut [Song]) {
        for song in songs.iter_mut() {
            song.liked = self.liked_songs.is_liked(&song.id).await;
        }
    }

    pub async fn update_song_liked_status(&self, song_id: &str, liked: bool) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::SongList { songs, .. } | ContentView::Queue { songs, .. } => {
                if let Some(song) = songs.iter_mut().find(|s| s.id == song_id) {
                    song.liked = liked;
                }
            }
            ContentView::PlaylistDetail { detail, .. } => {
                if let Some(song) = detail.songs.iter_mut().find(|s| s.id == song_id) {
                    song.liked = liked;
                }
            }
            _ => {}
        }
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::Song;

    fn song(id: &str) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {}", id),
            artist_id: "a1".to_string(),
            album_id: "al1".to_string(),
            genre: None,
            duration: 120.0,
            audio_url: format!("/audio/{}.mp3", id),
            cover_url: None,
            artist_name: None,
            album_name: None,
            liked: false,
        }
    }

    #[tokio::test]
    async fn drill_down_and_back_restores_previous_view() {
        let model = AppModel::new();
        model
            .set_root_song_list("All songs".to_string(), vec![song("s1")])
            .await;
        model
            .push_song_list("Artist songs".to_string(), vec![song("s2")])
            .await;

        assert!(model.navigate_back().await);

        let state = model.get_content_state().await;
        match state.view {
            ContentView::SongList { title, .. } => assert_eq!(title, "All songs"),
            other => panic!("unexpected view: {:?}", other),
        }

        // Stack exhausted: falls back to the empty view
        assert!(!model.navigate_back().await);
        assert!(matches!(
            model.get_content_state().await.view,
            ContentView::Empty
        ));
    }

    #[tokio::test]
    async fn root_views_drop_drill_down_history() {
        let model = AppModel::new();
        model
            .set_root_song_list("All songs".to_string(), vec![song("s1")])
            .await;
        model
            .push_song_list("Artist songs".to_string(), vec![song("s2")])
            .await;

        model.set_root_song_list("Search".to_string(), vec![]).await;

        assert!(!model.navigate_back().await);
    }

    #[tokio::test]
    async fn content_selection_stays_in_bounds() {
        let model = AppModel::new();
        model
            .set_root_song_list(
                "All songs".to_string(),
                vec![song("s1"), song("s2")],
            )
            .await;

        model.content_move_up().await;
        model.content_move_down().await;
        model.content_move_down().await;
        model.content_move_down().await;

        match model.get_content_state().await.view {
            ContentView::SongList { selected_index, .. } => assert_eq!(selected_index, 1),
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn selected_item_resolves_per_view() {
        let model = AppModel::new();
        model
            .set_artists(vec![Artist {
                id: "a1".to_string(),
                name: "The Artist".to_string(),
                genre: None,
                image_url: None,
            }])
            .await;

        match model.get_selected_content_item().await {
            Some(SelectedItem::Artist { id, name }) => {
                assert_eq!(id, "a1");
                assert_eq!(name, "The Artist");
            }
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[tokio::test]
    async fn old_errors_are_cleared() {
        let model = AppModel::new();
        model.set_error("Playback failed. Please try again.".to_string()).await;

        // Fresh errors survive the sweep
        model.auto_clear_old_errors().await;
        assert!(model.has_error().await);

        // Backdate past the auto-dismiss window
        {
            let mut state = model.ui_state.lock().await;
            state.error_timestamp =
                Some(Instant::now() - std::time::Duration::from_secs(6));
        }
        model.auto_clear_old_errors().await;
        assert!(!model.has_error().await);
    }
}
