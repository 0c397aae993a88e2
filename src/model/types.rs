//! Core type definitions for the application

use std::time::Instant;

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Library,
    Playlists,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Library,
            ActiveSection::Library => ActiveSection::Playlists,
            ActiveSection::Playlists => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::Library => ActiveSection::Search,
            ActiveSection::Playlists => ActiveSection::Library,
            ActiveSection::MainContent => ActiveSection::Playlists,
        }
    }
}

/// An item in the Library section
#[derive(Clone, Debug)]
pub struct LibraryItem {
    pub name: String,
}

/// A user's playlist (for sidebar display)
#[derive(Clone, Debug)]
pub struct PlaylistItem {
    pub id: String,
    pub name: String,
}

/// Repeat mode for the playback queue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatMode {
    Off,
    Queue,
    Track,
}

impl RepeatMode {
    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Off => "Off",
            RepeatMode::Queue => "Queue",
            RepeatMode::Track => "Track",
        }
    }
}

/// Represents a selected item for action handling
#[derive(Clone, Debug)]
pub enum SelectedItem {
    /// Index into the song list of the active content view.
    Song { index: usize },
    Artist { id: String, name: String },
    Album { id: String, name: String },
    /// Songs are filtered by genre name, so the resource id is not carried.
    Genre { name: String },
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub library_items: Vec<LibraryItem>,
    pub library_selected: usize,
    pub playlists: Vec<PlaylistItem>,
    pub playlist_selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_playlist_picker: bool,
    pub picker_song_id: Option<String>,
    pub picker_selected: usize,
    pub show_playlist_input: bool,
    pub playlist_name_input: String,
    pub show_help_popup: bool,
    pub user_name: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Search,
            search_query: String::new(),
            library_items: vec![
                LibraryItem { name: "All songs".to_string() },
                LibraryItem { name: "Artists".to_string() },
                LibraryItem { name: "Albums".to_string() },
                LibraryItem { name: "Genres".to_string() },
                LibraryItem { name: "Liked songs".to_string() },
                LibraryItem { name: "Recently played".to_string() },
            ],
            library_selected: 0,
            playlists: vec![], // Loaded from the backend after sign-in
            playlist_selected: 0,
            error_message: None,
            error_timestamp: None,
            show_playlist_picker: false,
            picker_song_id: None,
            picker_selected: 0,
            show_playlist_input: false,
            playlist_name_input: String::new(),
            show_help_popup: false,
            user_name: None,
        }
    }
}
