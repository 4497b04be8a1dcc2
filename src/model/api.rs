//! Collaborator interfaces consumed by the playlist view

use anyhow::Result;
use async_trait::async_trait;

use super::content::{Playlist, TrackPage};

/// Start playback of a context at a track position
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayRequest {
    pub context_uri: String,
    pub position: u32,
}

#[async_trait]
pub trait PlaylistApi: Send + Sync {
    async fn get_by_id(&self, playlist_id: &str) -> Result<Playlist>;
    async fn get_tracks(&self, playlist_id: &str) -> Result<TrackPage>;
}

#[async_trait]
pub trait PlayerApi: Send + Sync {
    /// Pause when `is_playing`, otherwise start playing `context_uri`
    async fn toggle_play(&self, is_playing: bool, context_uri: &str) -> Result<()>;
    async fn play(&self, request: PlayRequest) -> Result<()>;
}

/// In-memory collaborators for tests
#[cfg(test)]
pub mod fakes {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use tokio::sync::{watch, Notify};

    use super::{PlayRequest, PlayerApi, PlaylistApi, Result};
    use crate::model::content::{Playlist, PlaylistTrack, TrackPage};

    pub fn playlist(id: &str) -> Playlist {
        Playlist {
            id: id.to_string(),
            name: format!("Playlist {}", id),
            owner: "tester".to_string(),
            description: None,
            total_tracks: 1,
            uri: format!("spotify:playlist:{}", id),
        }
    }

    pub fn track_page(id: &str) -> TrackPage {
        TrackPage {
            playlist_id: id.to_string(),
            items: vec![PlaylistTrack {
                position: 0,
                id: format!("{}-1", id),
                name: "First".to_string(),
                artist: "Artist".to_string(),
                album: "Album".to_string(),
                duration_ms: 180_000,
                uri: format!("spotify:track:{}-1", id),
            }],
            offset: 0,
            fetched: 1,
            total: 1,
        }
    }

    /// Answers from a fixed table. Ids missing from the table succeed with
    /// a generated playlist. Fetches for gated ids wait for [`release`].
    ///
    /// [`release`]: FakePlaylistApi::release
    pub struct FakePlaylistApi {
        failures: HashMap<String, String>,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
        playlist_calls: watch::Sender<Vec<String>>,
        track_calls: watch::Sender<Vec<String>>,
    }

    impl FakePlaylistApi {
        pub fn new() -> Self {
            Self {
                failures: HashMap::new(),
                gates: Mutex::new(HashMap::new()),
                playlist_calls: watch::channel(Vec::new()).0,
                track_calls: watch::channel(Vec::new()).0,
            }
        }

        pub fn failing(mut self, playlist_id: &str, error: &str) -> Self {
            self.failures.insert(playlist_id.to_string(), error.to_string());
            self
        }

        pub fn gated(self, playlist_id: &str) -> Self {
            self.gates
                .lock()
                .unwrap()
                .insert(playlist_id.to_string(), Arc::new(Notify::new()));
            self
        }

        fn gate_for(&self, playlist_id: &str) -> Option<Arc<Notify>> {
            self.gates.lock().unwrap().get(playlist_id).cloned()
        }

        /// Let every pending and future fetch for `playlist_id` complete
        pub fn release(&self, playlist_id: &str) {
            let gate = self.gates.lock().unwrap().remove(playlist_id);
            if let Some(gate) = gate {
                gate.notify_waiters();
                gate.notify_one();
            }
        }

        pub fn playlist_calls(&self) -> watch::Receiver<Vec<String>> {
            self.playlist_calls.subscribe()
        }

        pub fn track_calls(&self) -> watch::Receiver<Vec<String>> {
            self.track_calls.subscribe()
        }
    }

    #[async_trait]
    impl PlaylistApi for FakePlaylistApi {
        async fn get_by_id(&self, playlist_id: &str) -> Result<Playlist> {
            self.playlist_calls.send_modify(|calls| calls.push(playlist_id.to_string()));
            if let Some(gate) = self.gate_for(playlist_id) {
                gate.notified().await;
            }
            match self.failures.get(playlist_id) {
                Some(error) => Err(anyhow!("{}", error)),
                None => Ok(playlist(playlist_id)),
            }
        }

        async fn get_tracks(&self, playlist_id: &str) -> Result<TrackPage> {
            self.track_calls.send_modify(|calls| calls.push(playlist_id.to_string()));
            match self.failures.get(playlist_id) {
                Some(error) => Err(anyhow!("{}", error)),
                None => Ok(track_page(playlist_id)),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum PlayerCall {
        TogglePlay { is_playing: bool, context_uri: String },
        Play(PlayRequest),
    }

    /// Records every call once it completes. A gated fake holds
    /// `toggle_play` until [`release_toggle`] is called.
    ///
    /// [`release_toggle`]: FakePlayerApi::release_toggle
    pub struct FakePlayerApi {
        calls: watch::Sender<Vec<PlayerCall>>,
        toggle_gate: Option<Arc<Notify>>,
        toggle_started: watch::Sender<bool>,
    }

    impl FakePlayerApi {
        pub fn new() -> Self {
            Self {
                calls: watch::channel(Vec::new()).0,
                toggle_gate: None,
                toggle_started: watch::channel(false).0,
            }
        }

        pub fn gated_toggle(mut self) -> Self {
            self.toggle_gate = Some(Arc::new(Notify::new()));
            self
        }

        pub fn release_toggle(&self) {
            if let Some(gate) = &self.toggle_gate {
                gate.notify_one();
            }
        }

        /// Flips to true once a `toggle_play` call is in flight
        pub fn toggle_started(&self) -> watch::Receiver<bool> {
            self.toggle_started.subscribe()
        }

        pub fn calls(&self) -> Vec<PlayerCall> {
            self.calls.borrow().clone()
        }

        pub fn watch_calls(&self) -> watch::Receiver<Vec<PlayerCall>> {
            self.calls.subscribe()
        }
    }

    #[async_trait]
    impl PlayerApi for FakePlayerApi {
        async fn toggle_play(&self, is_playing: bool, context_uri: &str) -> Result<()> {
            self.toggle_started.send_replace(true);
            if let Some(gate) = &self.toggle_gate {
                gate.notified().await;
            }
            self.calls.send_modify(|calls| {
                calls.push(PlayerCall::TogglePlay {
                    is_playing,
                    context_uri: context_uri.to_string(),
                })
            });
            Ok(())
        }

        async fn play(&self, request: PlayRequest) -> Result<()> {
            self.calls.send_modify(|calls| calls.push(PlayerCall::Play(request)));
            Ok(())
        }
    }
}
