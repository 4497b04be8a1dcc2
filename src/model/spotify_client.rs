//! Spotify API client wrapper backing the playlist and player interfaces

use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use rspotify::{
    model::{CurrentPlaybackContext, FullPlaylist, Offset, PlayContextId, PlayableItem, PlaylistId, TrackId},
    prelude::*,
    AuthCodeSpotify,
};

use super::api::{PlayRequest, PlayerApi, PlaylistApi};
use super::content::{index_playable, Playlist, PlaylistTrack, TrackPage};

/// Spotify API client with token refresh support
#[derive(Clone)]
pub struct SpotifyClient {
    client: Arc<AuthCodeSpotify>,
    refresh_token: Arc<RwLock<String>>,
    token_expires_at: Arc<RwLock<Option<chrono::DateTime<chrono::Utc>>>>,
}

impl SpotifyClient {
    pub const PLAYLIST_PAGE_SIZE: usize = 100;

    pub fn new(
        client: AuthCodeSpotify,
        refresh_token: String,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            refresh_token: Arc::new(RwLock::new(refresh_token)),
            token_expires_at: Arc::new(RwLock::new(expires_at)),
        }
    }

    pub async fn token_needs_refresh(&self) -> bool {
        let expires_at = self.token_expires_at.read().await;
        if let Some(exp) = *expires_at {
            let remaining = exp - chrono::Utc::now();
            // Refresh if less than 5 minutes remaining
            remaining.num_seconds() < 300
        } else {
            false
        }
    }

    pub async fn refresh_token_if_needed(&self) -> Result<bool> {
        if !self.token_needs_refresh().await {
            return Ok(false);
        }

        let refresh_token = self.refresh_token.read().await.clone();
        tracing::info!("Token expiring soon, refreshing...");

        match crate::auth::refresh_access_token(&refresh_token).await {
            Ok(refreshed) => {
                let expires_at = refreshed.token.expires_at;
                *self.client.token.lock().await.map_err(|_| anyhow::anyhow!("Token lock poisoned"))? =
                    Some(refreshed.token);
                *self.refresh_token.write().await = refreshed.refresh_token;
                *self.token_expires_at.write().await = expires_at;

                tracing::info!("Token refreshed successfully");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to refresh token");
                Err(e)
            }
        }
    }

    pub async fn get_current_playback(&self) -> Result<Option<CurrentPlaybackContext>> {
        tracing::trace!("Fetching current playback state");
        let result = self.client.current_playback(None, None::<Vec<_>>).await?;
        if let Some(ref playback) = result {
            tracing::trace!(
                is_playing = playback.is_playing,
                device = ?playback.device.name,
                "Got playback state"
            );
        }
        Ok(result)
    }

    async fn get_device_id(&self) -> Option<String> {
        match self.client.device().await {
            Ok(devices) => {
                let device = devices.iter().find(|d| d.is_active);
                if let Some(device) = device {
                    tracing::debug!(device_name = %device.name, device_id = ?device.id, "Found active device");
                    return device.id.clone();
                }
                tracing::debug!(available_devices = devices.len(), "No active device found");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Failed to get devices list");
                None
            }
        }
    }

    fn convert_playlist(playlist: &FullPlaylist) -> Playlist {
        Playlist {
            id: playlist.id.id().to_string(),
            name: playlist.name.clone(),
            owner: playlist.owner.display_name.clone().unwrap_or_default(),
            description: playlist.description.clone().filter(|d| !d.is_empty()),
            total_tracks: playlist.tracks.total,
            uri: playlist.id.uri(),
        }
    }

    /// Local files have no id and no playable URI
    fn track_uri(id: Option<&TrackId<'_>>) -> String {
        id.map(|id| id.uri()).unwrap_or_default()
    }

    fn playlist_context(context_uri: &str) -> Result<PlayContextId<'_>> {
        Ok(PlayContextId::Playlist(PlaylistId::from_uri(context_uri)?))
    }
}

#[async_trait]
impl PlaylistApi for SpotifyClient {
    async fn get_by_id(&self, playlist_id: &str) -> Result<Playlist> {
        let id = PlaylistId::from_id(playlist_id)?;
        crate::log_api_request!("playlist", playlist_id);
        let result = self.client.playlist(id, None, None).await;
        crate::log_api_result!("playlist", result);
        Ok(Self::convert_playlist(&result?))
    }

    async fn get_tracks(&self, playlist_id: &str) -> Result<TrackPage> {
        let id = PlaylistId::from_id(playlist_id)?;
        crate::log_api_request!("playlist_items", playlist_id);

        let page = self
            .client
            .playlist_items_manual(id, None, None, Some(Self::PLAYLIST_PAGE_SIZE as u32), Some(0))
            .await?;

        let playable = page.items.iter().map(|item| match &item.track {
            Some(PlayableItem::Track(track)) => Some(track),
            _ => None,
        });
        let tracks: Vec<PlaylistTrack> = index_playable(page.offset, playable)
            .into_iter()
            .map(|(position, track)| PlaylistTrack {
                position,
                id: track.id.as_ref().map(|id| id.id().to_string()).unwrap_or_default(),
                uri: Self::track_uri(track.id.as_ref()),
                name: track.name.clone(),
                artist: track.artists.first().map(|a| a.name.clone()).unwrap_or_default(),
                album: track.album.name.clone(),
                duration_ms: track.duration.num_milliseconds() as u32,
            })
            .collect();

        tracing::info!(playlist_id, loaded = tracks.len(), total = page.total, "Loaded playlist tracks");

        Ok(TrackPage {
            playlist_id: playlist_id.to_string(),
            items: tracks,
            offset: page.offset as usize,
            fetched: page.items.len(),
            total: page.total,
        })
    }
}

#[async_trait]
impl PlayerApi for SpotifyClient {
    async fn toggle_play(&self, is_playing: bool, context_uri: &str) -> Result<()> {
        let device_id = self.get_device_id().await;
        if is_playing {
            tracing::debug!(device_id = ?device_id, "API: pause_playback");
            self.client.pause_playback(device_id.as_deref()).await?;
        } else {
            tracing::debug!(context_uri, device_id = ?device_id, "API: start_context_playback");
            self.client
                .start_context_playback(Self::playlist_context(context_uri)?, device_id.as_deref(), None, None)
                .await?;
        }
        Ok(())
    }

    async fn play(&self, request: PlayRequest) -> Result<()> {
        let device_id = self.get_device_id().await;
        tracing::debug!(
            context_uri = %request.context_uri,
            position = request.position,
            device_id = ?device_id,
            "API: start_context_playback at offset"
        );

        // rspotify sends the millisecond count of this Duration as the track index
        let offset = Offset::Position(chrono::Duration::milliseconds(request.position as i64));
        self.client
            .start_context_playback(
                Self::playlist_context(&request.context_uri)?,
                device_id.as_deref(),
                Some(offset),
                None,
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_tracks_have_no_uri() {
        assert_eq!(SpotifyClient::track_uri(None), "");

        let id = TrackId::from_id("4uLU6hMCjMI75M1A2tKUQC").unwrap();
        assert_eq!(SpotifyClient::track_uri(Some(&id)), "spotify:track:4uLU6hMCjMI75M1A2tKUQC");
    }
}
