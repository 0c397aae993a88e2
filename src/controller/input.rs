//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, PlaybackCommand};

use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    model.clear_error().await;
                    model.dispatch(PlaybackCommand::ClearError).await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => {
                    model.hide_help_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Handle the add-to-playlist picker modal
        if model.is_playlist_picker_open().await {
            return match key.code {
                KeyCode::Up => {
                    model.picker_move_up().await;
                    Ok(())
                }
                KeyCode::Down => {
                    model.picker_move_down().await;
                    Ok(())
                }
                KeyCode::Enter => {
                    drop(model);
                    self.add_picked_song_to_playlist().await;
                    Ok(())
                }
                KeyCode::Esc | KeyCode::Char('a') | KeyCode::Char('A') => {
                    model.close_playlist_picker().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Handle the new-playlist name prompt
        if model.is_playlist_input_open().await {
            return match key.code {
                KeyCode::Enter => {
                    drop(model);
                    self.create_playlist_from_input().await;
                    Ok(())
                }
                KeyCode::Esc => {
                    model.close_playlist_input().await;
                    Ok(())
                }
                KeyCode::Backspace => {
                    model.backspace_input().await;
                    Ok(())
                }
                KeyCode::Char(c) => {
                    model.push_input_char(c).await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        let ui_state = model.get_ui_state().await;

        // Handle search input when in search section
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        model.cycle_section_backward().await;
                    } else {
                        model.cycle_section_forward().await;
                    }
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = ui_state.search_query.clone();
                    drop(model);
                    if !query.is_empty() {
                        self.perform_search(&query).await;
                    }
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.clear_search().await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    // Q still quits even in search mode when Ctrl is pressed
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                        return Ok(());
                    }
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Handle MainContent section navigation
        if ui_state.active_section == ActiveSection::MainContent {
            match key.code {
                KeyCode::Up => {
                    model.content_move_up().await;
                    return Ok(());
                }
                KeyCode::Down => {
                    model.content_move_down().await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    if let Some(item) = selected {
                        self.handle_selected_item(item).await;
                    }
                    return Ok(());
                }
                KeyCode::Backspace | KeyCode::Esc => {
                    model.navigate_back().await;
                    return Ok(());
                }
                KeyCode::Char('x') | KeyCode::Char('X') => {
                    drop(model);
                    self.toggle_liked_song().await;
                    return Ok(());
                }
                KeyCode::Char('a') | KeyCode::Char('A') => {
                    // Pick a playlist for the selected song
                    if let Some(song) = model.get_selected_song().await {
                        model.open_playlist_picker(song.id).await;
                    }
                    return Ok(());
                }
                KeyCode::Delete => {
                    drop(model);
                    self.remove_selected_playlist_song().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    model.cycle_section_backward().await;
                } else {
                    model.cycle_section_forward().await;
                }
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                model.move_selection_down().await;
            }
            KeyCode::Enter => {
                // Handle Enter based on active section
                let ui_state = model.get_ui_state().await;
                match ui_state.active_section {
                    ActiveSection::Library => {
                        // Open selected library item
                        let selected = ui_state.library_selected;
                        drop(model);
                        self.open_library_item(selected).await;
                        return Ok(());
                    }
                    ActiveSection::Playlists => {
                        // Open selected playlist
                        if let Some(playlist) = model.get_selected_playlist().await {
                            drop(model);
                            self.open_playlist(&playlist.id).await;
                            return Ok(());
                        }
                    }
                    _ => {}
                }
            }
            KeyCode::Delete => {
                if model.get_ui_state().await.active_section == ActiveSection::Playlists {
                    drop(model);
                    self.delete_selected_playlist().await;
                    return Ok(());
                }
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            // Next song
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_song().await;
            }
            // Previous song
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_song().await;
            }
            // Toggle shuffle
            KeyCode::Char('s') | KeyCode::Char('S') => {
                drop(model);
                self.toggle_shuffle().await;
            }
            // Cycle repeat mode
            KeyCode::Char('r') | KeyCode::Char('R') => {
                drop(model);
                self.cycle_repeat().await;
            }
            // Volume up
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.volume_up().await;
            }
            // Volume down
            KeyCode::Char('-') => {
                drop(model);
                self.volume_down().await;
            }
            // Toggle mute
            KeyCode::Char('m') | KeyCode::Char('M') => {
                drop(model);
                self.toggle_mute().await;
            }
            // Seek backward
            KeyCode::Char(',') => {
                drop(model);
                self.seek_backward().await;
            }
            // Seek forward
            KeyCode::Char('.') => {
                drop(model);
                self.seek_forward().await;
            }
            // New playlist
            KeyCode::Char('c') | KeyCode::Char('C') => {
                model.open_playlist_input().await;
            }
            // Focus search
            KeyCode::Char('g') | KeyCode::Char('G') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            // Sign out: forget the cached session and exit. The next start
            // goes back through the sign-in prompt.
            KeyCode::Char('l') | KeyCode::Char('L')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                crate::auth::clear_session();
                model.set_should_quit(true).await;
            }
            // Focus playlists
            KeyCode::Char('l') | KeyCode::Char('L') => {
                model.set_active_section(ActiveSection::Playlists).await;
            }
            // Show queue
            KeyCode::Char('u') | KeyCode::Char('U') => {
                drop(model);
                self.show_queue().await;
            }
            // Show help popup
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}
