//! Main content area rendering (song lists, catalog lists, playlist detail, queue)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{
    ActiveSection, Album, Artist, ContentState, ContentView, Genre, PlaylistDetail, Song, UiState,
};

use super::utils::{calculate_num_width, format_time, render_scrollable_list, truncate_string};

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    current_playing_id: Option<&str>,
) {
    let is_focused = ui_state.active_section == ActiveSection::MainContent;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if content_state.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Content ")
                    .border_style(border_style),
            );
        frame.render_widget(loading, area);
        return;
    }

    match &content_state.view {
        ContentView::Empty => {
            let content = Paragraph::new("Type in search and press Enter to find music\n\nUse Tab to navigate between sections\nUse ↑/↓ to select items\nPress Enter to open")
                .style(Style::default().fg(Color::DarkGray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .padding(Padding::horizontal(1))
                        .border_style(border_style),
                );
            frame.render_widget(content, area);
        }
        ContentView::SongList { title, songs, selected_index } => {
            render_song_list(
                frame,
                area,
                title,
                songs,
                *selected_index,
                is_focused,
                current_playing_id,
            );
        }
        ContentView::Artists { artists, selected_index } => {
            render_artists(frame, area, artists, *selected_index, is_focused);
        }
        ContentView::Albums { albums, selected_index } => {
            render_albums(frame, area, albums, *selected_index, is_focused);
        }
        ContentView::Genres { genres, selected_index } => {
            render_genres(frame, area, genres, *selected_index, is_focused);
        }
        ContentView::PlaylistDetail { detail, selected_index } => {
            render_playlist_detail(
                frame,
                area,
                detail,
                *selected_index,
                is_focused,
                current_playing_id,
            );
        }
        ContentView::Queue { songs, playing_index, selected_index } => {
            render_queue(
                frame,
                area,
                songs,
                *playing_index,
                *selected_index,
                is_focused,
                current_playing_id,
            );
        }
    }
}

fn render_song_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    songs: &[Song],
    selected_index: usize,
    is_focused: bool,
    current_playing_id: Option<&str>,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if songs.is_empty() {
        let empty = Paragraph::new("  No songs found")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", title))
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let items = render_song_items(
        songs,
        selected_index,
        is_focused,
        current_playing_id,
        content_width,
        songs.len(),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, selected_index + 1, block);
}

fn render_artists(
    frame: &mut Frame,
    area: Rect,
    artists: &[Artist],
    selected_index: usize,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if artists.is_empty() {
        let empty = Paragraph::new("  No artists found")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Artists ")
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(artists.len());
    let fixed_width = 1 + num_width + 3 + 3;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let name_width = (remaining_width * 55) / 100;
    let genre_width = remaining_width.saturating_sub(name_width);

    let mut items = vec![
        ListItem::new(format!(
            " {:<num_w$}   {:<name_w$}   {:<genre_w$}",
            "#",
            "Artist",
            "Genre",
            num_w = num_width,
            name_w = name_width,
            genre_w = genre_width
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];

    let artist_items: Vec<ListItem> = artists
        .iter()
        .enumerate()
        .map(|(i, artist)| {
            let style = if i == selected_index && is_focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if i == selected_index {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let name_str = truncate_string(&artist.name, name_width);
            let genre_str = match &artist.genre {
                Some(genre) => truncate_string(genre, genre_width),
                None => format!("{:<width$}", "-", width = genre_width),
            };

            ListItem::new(format!(
                " {:<num_w$}   {}   {}",
                i + 1,
                name_str,
                genre_str,
                num_w = num_width
            ))
            .style(style)
        })
        .collect();

    items.extend(artist_items);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Artists ")
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, selected_index + 1, block);
}

fn render_albums(
    frame: &mut Frame,
    area: Rect,
    albums: &[Album],
    selected_index: usize,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if albums.is_empty() {
        let empty = Paragraph::new("  No albums found")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Albums ")
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(albums.len());
    let year_width = 4;
    let fixed_width = 1 + num_width + 3 + 3 + year_width;
    let name_width = content_width.saturating_sub(fixed_width);

    let mut items = vec![
        ListItem::new(format!(
            " {:<num_w$}   {:<name_w$}   {:>year_w$}",
            "#",
            "Album",
            "Year",
            num_w = num_width,
            name_w = name_width,
            year_w = year_width
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];

    let album_items: Vec<ListItem> = albums
        .iter()
        .enumerate()
        .map(|(i, album)| {
            let style = if i == selected_index && is_focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if i == selected_index {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let name_str = truncate_string(&album.title, name_width);
            let year_str = match album.year {
                Some(year) => year.to_string(),
                None => "-".to_string(),
            };

            ListItem::new(format!(
                " {:<num_w$}   {}   {:>year_w$}",
                i + 1,
                name_str,
                year_str,
                num_w = num_width,
                year_w = year_width
            ))
            .style(style)
        })
        .collect();

    items.extend(album_items);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Albums ")
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, selected_index + 1, block);
}

fn render_genres(
    frame: &mut Frame,
    area: Rect,
    genres: &[Genre],
    selected_index: usize,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if genres.is_empty() {
        let empty = Paragraph::new("  No genres found")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Genres ")
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = genres
        .iter()
        .enumerate()
        .map(|(i, genre)| {
            let style = if i == selected_index && is_focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if i == selected_index {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("🎶 {}", genre.name)).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Genres ")
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, selected_index, block);
}

fn render_playlist_detail(
    frame: &mut Frame,
    area: Rect,
    detail: &PlaylistDetail,
    selected_index: usize,
    is_focused: bool,
    current_playing_id: Option<&str>,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Songs
        ])
        .split(area);

    let header_title = match detail.playlist.description.as_deref() {
        Some(description) if !description.is_empty() => {
            format!("📻 {} - {}", detail.playlist.name, description)
        }
        _ => format!("📻 {}", detail.playlist.name),
    };
    let header_text = format!(
        "{}\n {} songs | Enter: Play from selected | Delete: Remove song",
        header_title,
        detail.songs.len()
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .padding(Padding::horizontal(1))
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    frame.render_widget(header, chunks[0]);

    let content_width = chunks[1].width.saturating_sub(4) as usize;
    let mut song_items = render_song_items(
        &detail.songs,
        selected_index,
        is_focused,
        current_playing_id,
        content_width,
        detail.songs.len(),
    );

    if detail.songs.is_empty() {
        song_items.push(
            ListItem::new("       Playlist is empty (A on a song to add it)")
                .style(Style::default().fg(Color::DarkGray)),
        );
    }

    let songs_block = Block::default()
        .borders(Borders::ALL)
        .title(" Songs ")
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, chunks[1], song_items, selected_index + 1, songs_block);
}

fn render_queue(
    frame: &mut Frame,
    area: Rect,
    songs: &[Song],
    playing_index: usize,
    selected_index: usize,
    is_focused: bool,
    current_playing_id: Option<&str>,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Currently playing
            Constraint::Min(0),    // Queue
        ])
        .split(area);

    let cp_text = match songs.get(playing_index) {
        Some(song) => {
            let liked = if song.liked { "💚 " } else { "" };
            format!(
                "{}{}  -  {} ({})",
                liked,
                song.title,
                song.display_artist(),
                song.display_album()
            )
        }
        None => "No song playing".to_string(),
    };
    let cp_widget = Paragraph::new(cp_text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .padding(Padding::horizontal(1))
                .borders(Borders::ALL)
                .title(" 🎵 Now Playing ")
                .border_style(border_style),
        );
    frame.render_widget(cp_widget, chunks[0]);

    let content_width = chunks[1].width.saturating_sub(4) as usize;
    let mut list_items = render_song_items(
        songs,
        selected_index,
        is_focused,
        current_playing_id,
        content_width,
        songs.len(),
    );

    if songs.is_empty() {
        list_items.push(
            ListItem::new("       Queue is empty").style(Style::default().fg(Color::DarkGray)),
        );
    }

    let queue_block = Block::default()
        .borders(Borders::ALL)
        .title(" Up Next ")
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, chunks[1], list_items, selected_index + 1, queue_block);
}

fn render_song_items(
    songs: &[Song],
    selected_index: usize,
    is_focused: bool,
    current_playing_id: Option<&str>,
    content_width: usize,
    total_count: usize,
) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(total_count);
    let liked_width = 2;
    let duration_width = 8;
    let fixed_width = 1 + num_width + 3 + liked_width + 3 + 3 + 3 + duration_width;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 55) / 100;
    let artist_width = remaining_width.saturating_sub(title_width);

    // Create header as first item
    let mut items: Vec<ListItem<'static>> = vec![
        ListItem::new(format!(
            " {:<num_width$}   {}   {:<title_width$}   {:<artist_width$}   {}",
            "#",
            "  ",
            "Title",
            "Artist",
            "Duration",
            num_width = num_width,
            title_width = title_width,
            artist_width = artist_width
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];

    let song_items: Vec<ListItem> = songs
        .iter()
        .enumerate()
        .map(|(i, song)| {
            let duration = format_time(song.duration);
            let is_playing = current_playing_id.map_or(false, |id| id == song.id);
            let style = if i == selected_index && is_focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if is_playing {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if i == selected_index {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let liked_indicator = if song.liked { "💚" } else { "  " };
            let playing_indicator = if is_playing { "▶" } else { " " };
            let song_num = format!(
                "{}{:<num_width$}",
                playing_indicator,
                i + 1,
                num_width = num_width
            );

            let title_str = truncate_string(&song.title, title_width);
            let artist_str = truncate_string(song.display_artist(), artist_width);

            ListItem::new(format!(
                "{}   {}   {}   {}   {}",
                song_num, liked_indicator, title_str, artist_str, duration
            ))
            .style(style)
        })
        .collect();

    items.extend(song_items);
    items
}
