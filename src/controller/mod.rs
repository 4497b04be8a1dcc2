//! Controller module - Application logic and event handling
//!
//! - `playlist_store`: the playlist view store
//! - `effects`: action-driven data loading
//! - `playback`: playback state polling
//! - `input`: key event handling

mod playlist_store;
mod effects;
mod playback;
mod input;

pub use playlist_store::PlaylistViewStore;
pub use effects::PlaylistTracksEffect;
pub use playback::spawn_playback_sync;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::model::{PlaylistViewModel, Router, UiState};

#[derive(Clone)]
pub struct AppController {
    pub(crate) view: PlaylistViewStore,
    pub(crate) router: Router,
    pub(crate) ui_state: Arc<Mutex<UiState>>,
}

impl AppController {
    pub fn new(view: PlaylistViewStore, router: Router, ui_state: UiState) -> Self {
        Self {
            view,
            router,
            ui_state: Arc::new(Mutex::new(ui_state)),
        }
    }

    /// Point the route at the playlist selected in the UI
    pub async fn open_selected_playlist(&self) {
        let ui_state = self.ui_state.lock().await;
        if let Some(playlist_id) = ui_state.current_playlist_id() {
            let previous = self.router.current();
            tracing::info!(
                playlist_id,
                previous = ?previous.as_ref().and_then(|route| route.playlist_id()),
                "Opening playlist"
            );
            self.router.navigate_to_playlist(playlist_id);
        }
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        self.ui_state.lock().await.should_quit
    }

    pub fn view_model(&self) -> PlaylistViewModel {
        self.view.view_model()
    }
}
