//! Side effects triggered by store actions

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::model::{Action, AppStore, PlaylistApi};

/// Fetches a playlist's tracks for every `LoadPlaylistTracks` action.
/// Track pages are never served from the store, each request refetches.
pub struct PlaylistTracksEffect;

impl PlaylistTracksEffect {
    /// Start listening. Runs until the returned task is aborted.
    pub fn spawn(store: AppStore, api: Arc<dyn PlaylistApi>) -> JoinHandle<()> {
        let mut actions = store.actions();

        tokio::spawn(async move {
            loop {
                match actions.recv().await {
                    Ok(Action::LoadPlaylistTracks { playlist_id }) => {
                        Self::load(store.clone(), api.clone(), playlist_id);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Tracks effect fell behind, actions dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn load(store: AppStore, api: Arc<dyn PlaylistApi>, playlist_id: String) {
        tokio::spawn(async move {
            tracing::debug!(playlist_id = %playlist_id, "Loading playlist tracks");
            match api.get_tracks(&playlist_id).await {
                Ok(page) => {
                    store.dispatch(Action::LoadPlaylistTracksSuccess { playlist_id, page });
                }
                Err(e) => {
                    tracing::error!(playlist_id = %playlist_id, error = %e, "Failed to load playlist tracks");
                    store.dispatch(Action::LoadPlaylistTracksFailure {
                        playlist_id,
                        error: e.to_string(),
                    });
                }
            }
        });
    }
}
