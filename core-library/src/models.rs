//! Domain models shared across the streaming-client core
//!
//! The [`Track`] shape defined here is the canonical representation every
//! other component consumes: the catalog adapter maps raw API payloads into
//! it, the playback engine queues it, and the playlist store persists it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a playlist.
///
/// Generated ids are UUIDs, but the type deliberately wraps an opaque string
/// so collections written by earlier app versions (numeric ids) still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(String);

impl PlaylistId {
    /// Generate a fresh unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// Canonical representation of a playable catalog item.
///
/// `id` is the equality key used everywhere: queue position lookup, playlist
/// de-duplication, favorite scoping. A track whose `audio_url` is empty is
/// browsable but not playable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque catalog identifier, stable across sessions
    pub id: String,
    /// Display title
    pub title: String,
    /// Display artist string
    #[serde(default)]
    pub artist: String,
    /// Catalog id of the artist, when known
    #[serde(default)]
    pub artist_id: Option<String>,
    /// Catalog id of the album, when known
    #[serde(default)]
    pub album_id: Option<String>,
    /// Album display name, when known
    #[serde(default)]
    pub album_name: Option<String>,
    /// Artwork URL, may be empty
    #[serde(default)]
    pub image: String,
    /// URL of the playable stream; empty means not playable
    #[serde(default)]
    pub audio_url: String,
    /// Offline download URL, when the catalog offers one
    #[serde(default)]
    pub audio_download_url: Option<String>,
    /// Informational duration; the engine re-derives the real duration from
    /// the loaded stream
    #[serde(default)]
    pub duration_secs: Option<u32>,
}

impl Track {
    /// Create a minimal track; remaining fields default to empty.
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            artist_id: None,
            album_id: None,
            album_name: None,
            image: String::new(),
            audio_url: String::new(),
            audio_download_url: None,
            duration_secs: None,
        }
    }

    /// Attach a stream URL.
    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = url.into();
        self
    }

    /// Whether this track can be handed to the playback engine.
    pub fn is_playable(&self) -> bool {
        !self.audio_url.is_empty()
    }
}

/// User-owned named ordered collection of tracks, persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Generated at creation time, unique
    pub id: PlaylistId,
    /// Non-empty after trimming; mutable via rename
    pub name: String,
    /// Ordered songs; appended on add, de-duplicated by track id.
    /// `default` tolerates partially-written or legacy slots.
    #[serde(default)]
    pub songs: Vec<Track>,
    /// Creation timestamp (unix seconds), immutable
    #[serde(default)]
    pub created_at: i64,
}

impl Playlist {
    /// Create an empty playlist with a freshly generated id.
    pub fn new(name: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: PlaylistId::generate(),
            name: name.into(),
            songs: Vec::new(),
            created_at,
        }
    }

    /// Whether the playlist already contains a song with the given id.
    pub fn contains_song(&self, song_id: &str) -> bool {
        self.songs.iter().any(|s| s.id == song_id)
    }
}

/// The seed collection present at first launch (or after a corrupt slot).
///
/// Seeds are ordinary playlists: renameable and deletable like any other.
pub fn seed_playlists(created_at: i64) -> Vec<Playlist> {
    [
        "My morning tracks",
        "Random song",
        "Chill songs",
        "Sun set songs",
    ]
    .into_iter()
    .map(|name| Playlist::new(name, created_at))
    .collect()
}
