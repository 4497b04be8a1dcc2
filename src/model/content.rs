//! Playlist entities held by the application store

/// Playlist metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub description: Option<String>,
    pub total_tracks: u32,
    pub uri: String,
}

/// A track inside a playlist
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistTrack {
    /// Index of the item in the full playlist, counting episodes and
    /// unavailable entries that are not listed
    pub position: u32,
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: u32,
    pub uri: String,
}

/// One page of a playlist's track listing
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TrackPage {
    pub playlist_id: String,
    pub items: Vec<PlaylistTrack>,
    pub offset: usize,
    /// Playlist entries this page covers, including unlisted ones
    pub fetched: usize,
    pub total: u32,
}

impl TrackPage {
    /// Playlist entries past the end of this page
    pub fn remaining(&self) -> usize {
        (self.total as usize).saturating_sub(self.offset + self.fetched)
    }

    pub fn has_more(&self) -> bool {
        self.remaining() > 0
    }
}

/// Pair each playable entry with its index in the playlist. Entries that
/// are `None` (episodes, unavailable tracks) still take up an index.
pub fn index_playable<T>(offset: u32, entries: impl IntoIterator<Item = Option<T>>) -> Vec<(u32, T)> {
    entries
        .into_iter()
        .zip(offset..)
        .filter_map(|(entry, position)| entry.map(|entry| (position, entry)))
        .collect()
}
