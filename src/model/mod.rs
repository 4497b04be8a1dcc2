//! Model module - Application state and data types
//!
//! - `types`: view-local state and UI state
//! - `content`: playlist entities
//! - `store`: application store, actions and selectors
//! - `route`: route parameter source
//! - `playback`: observed playback state
//! - `api`: collaborator interfaces
//! - `spotify_client`: Spotify implementation of those interfaces

mod types;
mod content;
mod store;
mod route;
mod playback;
pub mod api;
mod spotify_client;

pub use types::{playlist_context_uri, LoadStatus, PlaylistViewModel, UiState, ViewState};

pub use content::{Playlist, TrackPage};

pub use store::{selectors, send_if_changed, Action, AppStore, RootState};

pub use route::{RouteParams, Router};

pub use playback::{PlaybackState, PlaybackStore};

pub use api::{PlayRequest, PlayerApi, PlaylistApi};

pub use spotify_client::SpotifyClient;
