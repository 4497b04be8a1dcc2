//! Playback state as reported by Spotify

use std::sync::Arc;
use rspotify::model::CurrentPlaybackContext;
use tokio::sync::watch;

use super::store::send_if_changed;

/// What is playing right now, reduced to what the views need
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub context_uri: Option<String>,
    pub is_playing: bool,
}

impl PlaybackState {
    pub fn from_playback(playback: &CurrentPlaybackContext) -> Self {
        Self {
            context_uri: playback.context.as_ref().map(|c| c.uri.clone()),
            is_playing: playback.is_playing,
        }
    }

    /// Playing, and playing from `context_uri`
    pub fn is_playing_context(&self, context_uri: &str) -> bool {
        self.is_playing && self.context_uri.as_deref() == Some(context_uri)
    }
}

/// Latest known playback state, observable through a `watch` channel
#[derive(Clone)]
pub struct PlaybackStore {
    state: Arc<watch::Sender<PlaybackState>>,
}

impl PlaybackStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(PlaybackState::default());
        Self {
            state: Arc::new(state),
        }
    }

    pub fn set(&self, next: PlaybackState) {
        let (context_uri, is_playing) = (next.context_uri.clone(), next.is_playing);
        if send_if_changed(&self.state, next) {
            tracing::debug!(context_uri = ?context_uri, is_playing, "Playback state changed");
        }
    }

    pub fn current(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    pub fn playback(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playing_context_requires_match_and_flag() {
        let uri = "spotify:playlist:abc";
        let playing = PlaybackState {
            context_uri: Some(uri.to_string()),
            is_playing: true,
        };
        assert!(playing.is_playing_context(uri));
        assert!(!playing.is_playing_context("spotify:playlist:xyz"));

        let paused = PlaybackState {
            is_playing: false,
            ..playing.clone()
        };
        assert!(!paused.is_playing_context(uri));

        assert!(!PlaybackState::default().is_playing_context(uri));
    }

    #[tokio::test]
    async fn set_notifies_only_on_change() {
        let store = PlaybackStore::new();
        let mut rx = store.playback();

        store.set(PlaybackState::default());
        assert!(!rx.has_changed().unwrap());

        let next = PlaybackState {
            context_uri: Some("spotify:playlist:abc".into()),
            is_playing: true,
        };
        store.set(next.clone());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), next);
        assert_eq!(store.current(), next);
    }
}
