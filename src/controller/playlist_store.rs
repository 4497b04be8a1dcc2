//! Playlist view store
//!
//! Follows the route's playlist id, loads the playlist into the application
//! store when it isn't cached yet, always requests its tracks, and exposes
//! the result as `watch` streams for the view. Playback commands are scoped
//! to the playlist's context URI.

use std::future::Future;
use std::sync::{Arc, Mutex, Weak};
use futures::future::{AbortHandle, Abortable};
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::{
    playlist_context_uri, selectors, send_if_changed, Action, AppStore, PlayRequest,
    PlaybackState, PlaybackStore, PlayerApi, Playlist, PlaylistApi, PlaylistViewModel,
    RootState, RouteParams, TrackPage, ViewState,
};

struct Outputs {
    playlist: watch::Sender<Option<Playlist>>,
    tracks: watch::Sender<Option<TrackPage>>,
    is_loading: watch::Sender<bool>,
    is_playing: watch::Sender<bool>,
}

struct Inner {
    state: Arc<watch::Sender<ViewState>>,
    outputs: Outputs,
    is_tracks_loading: watch::Receiver<bool>,
    playlist_api: Arc<dyn PlaylistApi>,
    player_api: Arc<dyn PlayerApi>,
    store: AppStore,
    playback: PlaybackStore,
    command: Mutex<Option<AbortHandle>>,
    // Dropping this stops the driver task
    _shutdown: watch::Sender<()>,
}

/// View-state container for the playlist page. Clones share one state.
#[derive(Clone)]
pub struct PlaylistViewStore {
    inner: Arc<Inner>,
}

impl PlaylistViewStore {
    /// Subscribe to `route_params` and start deriving outputs. Must be
    /// called from within a tokio runtime.
    pub fn new<R>(
        route_params: R,
        playlist_api: Arc<dyn PlaylistApi>,
        player_api: Arc<dyn PlayerApi>,
        store: AppStore,
        playback: PlaybackStore,
    ) -> Self
    where
        R: Stream<Item = RouteParams> + Send + Unpin + 'static,
    {
        let (state, view_rx) = watch::channel(ViewState::default());
        let (shutdown, shutdown_rx) = watch::channel(());

        let inner = Arc::new(Inner {
            state: Arc::new(state),
            outputs: Outputs {
                playlist: watch::channel(None).0,
                tracks: watch::channel(None).0,
                is_loading: watch::channel(false).0,
                is_playing: watch::channel(false).0,
            },
            is_tracks_loading: store.select(selectors::tracks_loading),
            playlist_api,
            player_api,
            store: store.clone(),
            playback: playback.clone(),
            command: Mutex::new(None),
            _shutdown: shutdown,
        });
        inner.refresh_outputs();

        tokio::spawn(drive(
            Arc::downgrade(&inner),
            route_params,
            store.subscribe(),
            playback.playback(),
            view_rx,
            shutdown_rx,
        ));

        Self { inner }
    }

    pub fn state(&self) -> watch::Receiver<ViewState> {
        self.inner.state.subscribe()
    }

    pub fn playlist(&self) -> watch::Receiver<Option<Playlist>> {
        self.inner.outputs.playlist.subscribe()
    }

    pub fn tracks(&self) -> watch::Receiver<Option<TrackPage>> {
        self.inner.outputs.tracks.subscribe()
    }

    /// True while this store's own playlist fetch is in flight
    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.inner.outputs.is_loading.subscribe()
    }

    /// Mirrors the application store's track loading flag
    pub fn is_tracks_loading(&self) -> watch::Receiver<bool> {
        self.inner.is_tracks_loading.clone()
    }

    pub fn is_playing(&self) -> watch::Receiver<bool> {
        self.inner.outputs.is_playing.subscribe()
    }

    pub fn playlist_id(&self) -> String {
        self.inner.state.borrow().playlist_id.clone()
    }

    pub fn context_uri(&self) -> String {
        playlist_context_uri(&self.playlist_id())
    }

    /// Current value of every output
    pub fn view_model(&self) -> PlaylistViewModel {
        PlaylistViewModel {
            state: self.state().borrow().clone(),
            playlist: self.playlist().borrow().clone(),
            tracks: self.tracks().borrow().clone(),
            is_loading: *self.is_loading().borrow(),
            is_tracks_loading: *self.is_tracks_loading().borrow(),
            is_playing: *self.is_playing().borrow(),
        }
    }

    /// Pause the playlist if `is_playing`, otherwise start it
    pub fn toggle_playback(&self, is_playing: bool) -> JoinHandle<()> {
        let context_uri = self.context_uri();
        let player = self.inner.player_api.clone();
        tracing::debug!(is_playing, context_uri = %context_uri, "Toggling playlist playback");

        self.spawn_command("toggle_playback", async move {
            player.toggle_play(is_playing, &context_uri).await
        })
    }

    /// Play the playlist starting from the track at `position`
    pub fn play_track_at_position(&self, position: u32) -> JoinHandle<()> {
        let request = PlayRequest {
            context_uri: self.context_uri(),
            position,
        };
        let player = self.inner.player_api.clone();
        tracing::debug!(context_uri = %request.context_uri, position, "Playing playlist track");

        self.spawn_command("play_track", async move { player.play(request).await })
    }

    /// Run `command`, superseding whichever command is still running.
    fn spawn_command<F>(&self, name: &'static str, command: F) -> JoinHandle<()>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let (abort, registration) = AbortHandle::new_pair();
        let previous = {
            let mut current = match self.inner.command.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            current.replace(abort)
        };
        if let Some(previous) = previous {
            previous.abort();
        }

        tokio::spawn(async move {
            match Abortable::new(command, registration).await {
                Ok(Ok(())) => tracing::info!(command = name, "Playback command completed"),
                Ok(Err(e)) => tracing::error!(command = name, error = %e, "Playback command failed"),
                Err(_) => tracing::debug!(command = name, "Playback command superseded"),
            }
        })
    }
}

impl Inner {
    fn on_route(&self, playlist_id: &str) {
        tracing::debug!(playlist_id, "Playlist route changed");
        self.state
            .send_modify(|state| state.playlist_id = playlist_id.to_string());
        self.load_playlist_if_absent(playlist_id);
        self.load_tracks(playlist_id);
    }

    /// Fetch the playlist unless the application store already has it.
    ///
    /// The presence check reads the store at call time, so two route events
    /// for the same uncached id both fetch.
    fn load_playlist_if_absent(&self, playlist_id: &str) {
        let cached = self
            .store
            .snapshot(|state| selectors::playlists(state).contains_key(playlist_id));
        if cached {
            tracing::debug!(playlist_id, "Playlist cached, skipping fetch");
            return;
        }

        self.state.send_modify(ViewState::start_loading);

        let playlist_id = playlist_id.to_string();
        let api = self.playlist_api.clone();
        let store = self.store.clone();
        let state = self.state.clone();

        tokio::spawn(async move {
            match api.get_by_id(&playlist_id).await {
                Ok(playlist) => {
                    tracing::info!(playlist_id = %playlist_id, name = %playlist.name, "Playlist loaded");
                    store.dispatch(Action::LoadPlaylistSuccess { playlist });
                    state.send_modify(ViewState::succeed);
                }
                Err(e) => {
                    tracing::error!(playlist_id = %playlist_id, error = %e, "Failed to load playlist");
                    state.send_modify(|state| state.fail(e.to_string()));
                }
            }
        });
    }

    fn load_tracks(&self, playlist_id: &str) {
        self.store.dispatch(Action::LoadPlaylistTracks {
            playlist_id: playlist_id.to_string(),
        });
    }

    /// Recompute every derived output for the current playlist id
    fn refresh_outputs(&self) {
        let (playlist_id, is_loading) = {
            let state = self.state.borrow();
            (state.playlist_id.clone(), state.is_loading())
        };

        let (playlist, tracks) = if playlist_id.is_empty() {
            (None, None)
        } else {
            self.store.snapshot(|state: &RootState| {
                (
                    selectors::playlist_by_id(&playlist_id)(state),
                    selectors::tracks_by_id(&playlist_id)(state),
                )
            })
        };

        let playback: PlaybackState = self.playback.current();
        let is_playing =
            playlist.is_some() && playback.is_playing_context(&playlist_context_uri(&playlist_id));

        send_if_changed(&self.outputs.playlist, playlist);
        send_if_changed(&self.outputs.tracks, tracks);
        send_if_changed(&self.outputs.is_loading, is_loading);
        send_if_changed(&self.outputs.is_playing, is_playing);
    }
}

/// Driver loop: reacts to route params in arrival order and re-derives the
/// outputs whenever the store, playback or local state changes.
async fn drive<R>(
    inner: Weak<Inner>,
    mut route_params: R,
    mut root: watch::Receiver<RootState>,
    mut playback: watch::Receiver<PlaybackState>,
    mut view: watch::Receiver<ViewState>,
    mut shutdown: watch::Receiver<()>,
) where
    R: Stream<Item = RouteParams> + Unpin,
{
    let mut route_open = true;

    loop {
        let mut route = None;
        tokio::select! {
            params = route_params.next(), if route_open => match params {
                Some(params) => route = Some(params),
                None => {
                    tracing::debug!("Route stream ended");
                    route_open = false;
                }
            },
            changed = root.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = playback.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = shutdown.changed() => break,
        }

        let Some(view_store) = inner.upgrade() else {
            break;
        };
        if let Some(playlist_id) = route.as_ref().and_then(RouteParams::playlist_id) {
            view_store.on_route(playlist_id);
        }
        view_store.refresh_outputs();
    }

    tracing::debug!("Playlist view store stopped");
}
