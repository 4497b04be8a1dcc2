//! Core type definitions for the playlist view

use super::content::{Playlist, TrackPage};

/// Lifecycle of the most recent playlist load attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Pending,
    Loading,
    Success,
    Error,
}

/// Local state owned by the playlist view store.
///
/// `error` is `Some` exactly when `status` is [`LoadStatus::Error`]; the
/// transition helpers below are the only way the store changes either field.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ViewState {
    pub playlist_id: String,
    pub status: LoadStatus,
    pub error: Option<String>,
}

impl ViewState {
    pub fn start_loading(&mut self) {
        self.status = LoadStatus::Loading;
        self.error = None;
    }

    pub fn succeed(&mut self) {
        self.status = LoadStatus::Success;
        self.error = None;
    }

    pub fn fail(&mut self, error: String) {
        self.status = LoadStatus::Error;
        self.error = Some(error);
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }
}

/// Context URI Spotify uses to scope playback to a playlist
pub fn playlist_context_uri(playlist_id: &str) -> String {
    format!("spotify:playlist:{}", playlist_id)
}

/// Everything the playlist view renders, read off the view store's streams
#[derive(Clone, Debug, Default)]
pub struct PlaylistViewModel {
    pub state: ViewState,
    pub playlist: Option<Playlist>,
    pub tracks: Option<TrackPage>,
    pub is_loading: bool,
    pub is_tracks_loading: bool,
    pub is_playing: bool,
}

/// UI state for the terminal front end
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub playlist_ids: Vec<String>,
    pub playlist_selected: usize,
    pub track_selected: usize,
    pub should_quit: bool,
}

impl UiState {
    pub fn new(playlist_ids: Vec<String>) -> Self {
        Self {
            playlist_ids,
            ..Default::default()
        }
    }

    pub fn current_playlist_id(&self) -> Option<&str> {
        self.playlist_ids.get(self.playlist_selected).map(String::as_str)
    }

    pub fn next_playlist(&mut self) {
        if !self.playlist_ids.is_empty() {
            self.playlist_selected = (self.playlist_selected + 1) % self.playlist_ids.len();
            self.track_selected = 0;
        }
    }

    pub fn prev_playlist(&mut self) {
        if !self.playlist_ids.is_empty() {
            self.playlist_selected = self
                .playlist_selected
                .checked_sub(1)
                .unwrap_or(self.playlist_ids.len() - 1);
            self.track_selected = 0;
        }
    }

    pub fn move_track_up(&mut self) {
        self.track_selected = self.track_selected.saturating_sub(1);
    }

    pub fn move_track_down(&mut self, track_count: usize) {
        if self.track_selected < track_count.saturating_sub(1) {
            self.track_selected += 1;
        }
    }
}
