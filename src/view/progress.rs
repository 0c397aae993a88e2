//! Progress bar rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::PlaybackState;

use super::utils::format_time;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackState) {
    let status_text = match &playback.current_song {
        None => " No song playing".to_string(),
        Some(song) if playback.is_loading => {
            format!(
                " ⏳ {} | {} ({})",
                song.title,
                song.display_artist(),
                song.display_album()
            )
        }
        Some(song) if playback.is_playing => {
            format!(
                " ▶ {} | {} ({})",
                song.title,
                song.display_artist(),
                song.display_album()
            )
        }
        Some(song) => {
            format!(
                "⏸  {} | {} ({})",
                song.title,
                song.display_artist(),
                song.display_album()
            )
        }
    };

    let shuffle_text = if playback.shuffle { "Shuffle: On" } else { "Shuffle: Off" };
    let repeat_text = format!("Repeat: {}", playback.repeat.label());
    let volume_text = if playback.is_muted {
        "Vol: muted".to_string()
    } else {
        format!("Vol: {}%", (playback.volume * 100.0).round() as u8)
    };

    let time_str = format!(
        "{} / {}",
        format_time(playback.current_time),
        format_time(playback.duration)
    );

    let mut progress_ratio = if playback.duration > 0.0 {
        (playback.current_time / playback.duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    if !progress_ratio.is_finite() {
        progress_ratio = 0.0;
    }

    let inner_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Length(3)])
        .split(area);

    let title = format!("{} ", status_text);
    let controls_info = format!(" {} | {} | {} ", shuffle_text, repeat_text, volume_text);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, inner_chunks[0]);
}
