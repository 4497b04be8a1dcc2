//! Application-wide store: cached playlists and track pages, mutated only
//! through dispatched actions.
//!
//! Readers either take a [`AppStore::snapshot`] of the latest state or
//! [`AppStore::select`] a derived value, which is delivered through a
//! `watch` channel so new observers always see the current value first.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

use super::content::{Playlist, TrackPage};

const ACTION_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RootState {
    pub playlists: HashMap<String, Playlist>,
    pub playlist_tracks: HashMap<String, TrackPage>,
    pub tracks_loading: bool,
    pub tracks_error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    LoadPlaylistTracks { playlist_id: String },
    LoadPlaylistTracksSuccess { playlist_id: String, page: TrackPage },
    LoadPlaylistTracksFailure { playlist_id: String, error: String },
    LoadPlaylistSuccess { playlist: Playlist },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::LoadPlaylistTracks { .. } => "load_playlist_tracks",
            Action::LoadPlaylistTracksSuccess { .. } => "load_playlist_tracks_success",
            Action::LoadPlaylistTracksFailure { .. } => "load_playlist_tracks_failure",
            Action::LoadPlaylistSuccess { .. } => "load_playlist_success",
        }
    }
}

pub fn reduce(state: &mut RootState, action: &Action) {
    match action {
        Action::LoadPlaylistTracks { .. } => {
            state.tracks_loading = true;
            state.tracks_error = None;
        }
        Action::LoadPlaylistTracksSuccess { playlist_id, page } => {
            state.playlist_tracks.insert(playlist_id.clone(), page.clone());
            state.tracks_loading = false;
        }
        Action::LoadPlaylistTracksFailure { error, .. } => {
            state.tracks_loading = false;
            state.tracks_error = Some(error.clone());
        }
        Action::LoadPlaylistSuccess { playlist } => {
            state.playlists.insert(playlist.id.clone(), playlist.clone());
        }
    }
}

/// Replace the channel value with `next` and notify receivers, unless the
/// two are equal.
pub fn send_if_changed<T: PartialEq>(tx: &watch::Sender<T>, next: T) -> bool {
    tx.send_if_modified(|current| {
        if *current != next {
            *current = next;
            true
        } else {
            false
        }
    })
}

/// Named selectors over [`RootState`]
pub mod selectors {
    use std::collections::HashMap;

    use super::RootState;
    use crate::model::content::{Playlist, TrackPage};

    pub fn playlist_by_id(playlist_id: &str) -> impl Fn(&RootState) -> Option<Playlist> + Send + 'static {
        let playlist_id = playlist_id.to_string();
        move |state| state.playlists.get(&playlist_id).cloned()
    }

    pub fn tracks_by_id(playlist_id: &str) -> impl Fn(&RootState) -> Option<TrackPage> + Send + 'static {
        let playlist_id = playlist_id.to_string();
        move |state| state.playlist_tracks.get(&playlist_id).cloned()
    }

    pub fn tracks_loading(state: &RootState) -> bool {
        state.tracks_loading
    }

    pub fn playlists(state: &RootState) -> &HashMap<String, Playlist> {
        &state.playlists
    }
}

/// Handle to the shared store. Clones refer to the same state.
#[derive(Clone)]
pub struct AppStore {
    state: Arc<watch::Sender<RootState>>,
    actions: broadcast::Sender<Action>,
}

impl AppStore {
    pub fn new() -> Self {
        Self::with_state(RootState::default())
    }

    pub fn with_state(initial: RootState) -> Self {
        let (state, _) = watch::channel(initial);
        let (actions, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(state),
            actions,
        }
    }

    /// Apply `action` to the state, then hand it to any running effects.
    pub fn dispatch(&self, action: Action) {
        tracing::debug!(action = action.name(), "Dispatching action");
        self.state.send_modify(|state| reduce(state, &action));
        // No subscribed effect is not an error
        let _ = self.actions.send(action);
    }

    pub fn snapshot<T>(&self, selector: impl FnOnce(&RootState) -> T) -> T {
        selector(&self.state.borrow())
    }

    /// Derived stream of `selector` applied to the state. Emits only when
    /// the selected value changes; stops once every receiver is dropped.
    pub fn select<T, F>(&self, selector: F) -> watch::Receiver<T>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&RootState) -> T + Send + 'static,
    {
        let mut source = self.state.subscribe();
        let (tx, rx) = watch::channel(selector(&source.borrow_and_update()));

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = source.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tx.closed() => break,
                }
                let next = selector(&source.borrow_and_update());
                send_if_changed(&tx, next);
            }
        });

        rx
    }

    pub fn subscribe(&self) -> watch::Receiver<RootState> {
        self.state.subscribe()
    }

    pub fn actions(&self) -> broadcast::Receiver<Action> {
        self.actions.subscribe()
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(id: &str) -> Playlist {
        Playlist {
            id: id.to_string(),
            name: format!("Playlist {}", id),
            owner: "owner".to_string(),
            description: None,
            total_tracks: 0,
            uri: format!("spotify:playlist:{}", id),
        }
    }

    #[test]
    fn reducer_tracks_loading_lifecycle() {
        let mut state = RootState::default();

        reduce(&mut state, &Action::LoadPlaylistTracks { playlist_id: "abc".into() });
        assert!(state.tracks_loading);

        let page = TrackPage {
            playlist_id: "abc".into(),
            ..Default::default()
        };
        reduce(
            &mut state,
            &Action::LoadPlaylistTracksSuccess { playlist_id: "abc".into(), page: page.clone() },
        );
        assert!(!state.tracks_loading);
        assert_eq!(state.playlist_tracks.get("abc"), Some(&page));

        reduce(&mut state, &Action::LoadPlaylistTracks { playlist_id: "xyz".into() });
        reduce(
            &mut state,
            &Action::LoadPlaylistTracksFailure { playlist_id: "xyz".into(), error: "boom".into() },
        );
        assert!(!state.tracks_loading);
        assert_eq!(state.tracks_error.as_deref(), Some("boom"));
        assert!(!state.playlist_tracks.contains_key("xyz"));
    }

    #[test]
    fn reducer_caches_loaded_playlist_by_id() {
        let mut state = RootState::default();
        reduce(&mut state, &Action::LoadPlaylistSuccess { playlist: playlist("abc") });
        assert_eq!(state.playlists.get("abc"), Some(&playlist("abc")));
    }

    #[tokio::test]
    async fn snapshot_reads_latest_state() {
        let store = AppStore::new();
        assert!(!store.snapshot(|s| selectors::playlists(s).contains_key("abc")));

        store.dispatch(Action::LoadPlaylistSuccess { playlist: playlist("abc") });
        assert!(store.snapshot(|s| selectors::playlists(s).contains_key("abc")));
    }

    #[tokio::test]
    async fn select_replays_current_value() {
        let store = AppStore::new();
        store.dispatch(Action::LoadPlaylistSuccess { playlist: playlist("abc") });

        let rx = store.select(selectors::playlist_by_id("abc"));
        assert_eq!(*rx.borrow(), Some(playlist("abc")));

        let missing = store.select(selectors::playlist_by_id("xyz"));
        assert_eq!(*missing.borrow(), None);
    }

    #[tokio::test]
    async fn select_emits_only_on_change() {
        let store = AppStore::new();
        let mut loading = store.select(selectors::tracks_loading);
        assert!(!*loading.borrow_and_update());

        store.dispatch(Action::LoadPlaylistSuccess { playlist: playlist("abc") });
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert!(!loading.has_changed().unwrap());

        store.dispatch(Action::LoadPlaylistTracks { playlist_id: "abc".into() });
        loading.changed().await.unwrap();
        assert!(*loading.borrow_and_update());
    }

    #[tokio::test]
    async fn dispatched_actions_reach_subscribers() {
        let store = AppStore::new();
        let mut actions = store.actions();

        store.dispatch(Action::LoadPlaylistTracks { playlist_id: "abc".into() });

        let action = actions.recv().await.unwrap();
        assert_eq!(action, Action::LoadPlaylistTracks { playlist_id: "abc".into() });
    }
}
