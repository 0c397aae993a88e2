//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, sidebar)
//! - `content`: Main content area rendering
//! - `progress`: Progress bar rendering
//! - `overlays`: Modal overlays (error, playlist picker, name prompt, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, PlaybackState, UiState};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        playback: &PlaybackState,
        ui_state: &UiState,
        content_state: &ContentState,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + user
                Constraint::Min(0),    // Main content (sidebar + content)
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        // Top bar: Search + User
        layout::render_top_bar(frame, chunks[0], ui_state);

        // Middle: Sidebar (Library + Playlists) and Main Content
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Sidebar (Library + Playlists)
                Constraint::Percentage(70), // Main content
            ])
            .split(chunks[1]);

        // Sidebar: Library and Playlists stacked vertically
        layout::render_sidebar(frame, main_chunks[0], ui_state);

        // Main content area
        let current_playing_id = playback.current_song.as_ref().map(|s| s.id.as_str());
        content::render_main_content(
            frame,
            main_chunks[1],
            ui_state,
            content_state,
            current_playing_id,
        );

        // Bottom: Progress bar with song info and controls
        progress::render_progress_bar(frame, chunks[2], playback);

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        // Add-to-playlist picker overlay (if open)
        if ui_state.show_playlist_picker {
            overlays::render_playlist_picker(frame, ui_state);
        }

        // New-playlist name prompt (if open)
        if ui_state.show_playlist_input {
            overlays::render_playlist_input(frame, ui_state);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
