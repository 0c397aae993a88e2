//! Content view state for the main panel: song lists, catalog indexes,
//! playlist details and the queue view

use super::catalog::{Album, Artist, Genre, Playlist, Song};

/// Playlist detail view data: the document plus its resolved songs in
/// playlist order.
#[derive(Clone, Debug)]
pub struct PlaylistDetail {
    pub playlist: Playlist,
    pub songs: Vec<Song>,
}

/// Represents the current view in the main content area
#[derive(Clone, Debug, Default)]
pub enum ContentView {
    #[default]
    Empty,
    /// Any flat list of songs: the full catalog, search results, an
    /// artist/album/genre drill-down, liked songs or play history.
    SongList {
        title: String,
        songs: Vec<Song>,
        selected_index: usize,
    },
    Artists {
        artists: Vec<Artist>,
        selected_index: usize,
    },
    Albums {
        albums: Vec<Album>,
        selected_index: usize,
    },
    Genres {
        genres: Vec<Genre>,
        selected_index: usize,
    },
    PlaylistDetail {
        detail: PlaylistDetail,
        selected_index: usize,
    },
    /// Snapshot of the playback queue with the playing position marked.
    Queue {
        songs: Vec<Song>,
        playing_index: usize,
        selected_index: usize,
    },
}

impl ContentView {
    /// The visible song list, when this view shows one.
    pub fn songs(&self) -> Option<&[Song]> {
        match self {
            ContentView::SongList { songs, .. } => Some(songs),
            ContentView::PlaylistDetail { detail, .. } => Some(&detail.songs),
            ContentView::Queue { songs, .. } => Some(songs),
            _ => None,
        }
    }
}

/// State for the main content area
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub navigation_stack: Vec<ContentView>,
    pub is_loading: bool,
}
