//! View module - UI rendering
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `playlist`: Playlist header, track list and status bar

mod utils;
mod playlist;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{PlaylistViewModel, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, view: &PlaylistViewModel, ui_state: &UiState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Playlist header
                Constraint::Min(0),    // Tracks
                Constraint::Length(3), // Status bar
            ])
            .split(frame.area());

        playlist::render_header(frame, chunks[0], view, ui_state);
        playlist::render_tracks(frame, chunks[1], view, ui_state.track_selected);
        playlist::render_status_bar(frame, chunks[2], view);
    }
}
