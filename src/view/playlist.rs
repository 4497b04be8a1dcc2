//! Playlist rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{LoadStatus, PlaylistViewModel, UiState};
use super::utils::{calculate_num_width, format_duration, render_scrollable_list, truncate_string};

pub fn render_header(frame: &mut Frame, area: Rect, view: &PlaylistViewModel, ui_state: &UiState) {
    let position = format!(
        "{}/{}",
        (ui_state.playlist_selected + 1).min(ui_state.playlist_ids.len()),
        ui_state.playlist_ids.len()
    );

    let header_text = match &view.playlist {
        Some(playlist) => {
            let marker = if view.is_playing { "▶ " } else { "" };
            format!(
                "{}{} by {}\n {} tracks | playlist {}",
                marker, playlist.name, playlist.owner, playlist.total_tracks, position
            )
        }
        None if view.state.playlist_id.is_empty() => "No playlist selected".to_string(),
        None => format!("{}\n playlist {}", view.state.playlist_id, position),
    };

    let border_style = if view.is_playing {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .padding(Padding::horizontal(1))
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    frame.render_widget(header, area);
}

pub fn render_tracks(frame: &mut Frame, area: Rect, view: &PlaylistViewModel, selected_index: usize) {
    let tracks_block = Block::default()
        .borders(Borders::ALL)
        .title(" Tracks ")
        .padding(Padding::horizontal(1));

    let Some(page) = &view.tracks else {
        let text = if view.is_tracks_loading { "Loading tracks..." } else { "" };
        let placeholder = Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC))
            .block(tracks_block);
        frame.render_widget(placeholder, area);
        return;
    };

    let content_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(page.total as usize);
    let duration_width = 6;
    // " {num}   {title}   {artist}   {duration}"
    let remaining = content_width.saturating_sub(1 + num_width + 3 + 3 + 3 + duration_width);
    let title_width = (remaining * 55) / 100;
    let artist_width = remaining.saturating_sub(title_width);

    let mut items: Vec<ListItem> = page
        .items
        .iter()
        .enumerate()
        .map(|(i, track)| {
            // Numbered by playlist index, gaps mark unlisted entries
            let style = if i == selected_index {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(
                " {:>num$}   {}   {}   {:>dur$}",
                track.position + 1,
                truncate_string(&track.name, title_width),
                truncate_string(&track.artist, artist_width),
                format_duration(track.duration_ms),
                num = num_width,
                dur = duration_width,
            ))
            .style(style)
        })
        .collect();

    if page.has_more() {
        items.push(
            ListItem::new(format!(
                "       {} more tracks not shown",
                page.remaining()
            ))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)),
        );
    }

    render_scrollable_list(frame, area, items, selected_index, tracks_block);
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, view: &PlaylistViewModel) {
    let (text, style) = match view.state.status {
        LoadStatus::Error => (
            format!("Error: {}", view.state.error.as_deref().unwrap_or("unknown")),
            Style::default().fg(Color::Red),
        ),
        _ if view.is_loading => ("Loading playlist...".to_string(), Style::default().fg(Color::Yellow)),
        _ if view.is_tracks_loading => ("Loading tracks...".to_string(), Style::default().fg(Color::Yellow)),
        _ => (
            "←/→ playlist | ↑/↓ track | Enter play | Space play/pause | q quit".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let status = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).padding(Padding::horizontal(1)));
    frame.render_widget(status, area);
}
