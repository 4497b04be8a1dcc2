//! Keeps the playback store in sync with Spotify

use std::time::Duration;
use tokio::task::JoinHandle;

use crate::model::{PlaybackState, PlaybackStore, SpotifyClient};

pub const PLAYBACK_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll the current playback and publish it. Failed polls keep the last
/// known state.
pub fn spawn_playback_sync(spotify: SpotifyClient, playback: PlaybackStore) -> JoinHandle<()> {
    tracing::info!(interval_ms = PLAYBACK_POLL_INTERVAL.as_millis() as u64, "Starting playback sync");

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PLAYBACK_POLL_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match spotify.get_current_playback().await {
                Ok(Some(current)) => playback.set(PlaybackState::from_playback(&current)),
                // Nothing is playing on any device
                Ok(None) => playback.set(PlaybackState::default()),
                Err(e) => tracing::debug!(error = %e, "Failed to poll playback state"),
            }
        }
    })
}
