//! Playback bridge trait and supporting audio types.
//!
//! The core playback engine does not decode or output audio itself; the host
//! platform owns the device audio resource (ExoPlayer, AVAudioPlayer, a
//! desktop sink, ...). This module defines the contract that resource must
//! satisfy: load a stream by URL, accept transport commands, and report
//! periodic status updates tagged with the session they belong to.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Unique identifier for a loaded audio session.
///
/// A fresh id is minted per successful load; status updates carry the id of
/// the session that produced them, which lets the engine discard callbacks
/// from a superseded load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request describing the audio stream a host output should provision.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// HTTP(S) URL of the audio stream.
    pub url: String,
    /// Initial playback position (defaults to start of stream).
    pub start_position: Duration,
    /// Whether playback should begin as soon as the stream has buffered.
    pub autoplay: bool,
    /// Optional display metadata surfaced to platform media sessions.
    pub metadata: HashMap<String, String>,
}

impl LoadRequest {
    /// Construct a request for the given URL with autoplay enabled.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            start_position: Duration::from_secs(0),
            autoplay: true,
            metadata: HashMap::new(),
        }
    }

    /// Start playback from the given position instead of the stream start.
    pub fn with_start_position(mut self, position: Duration) -> Self {
        self.start_position = position;
        self
    }

    /// Attach display metadata to the request.
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Periodic status report from the host audio output.
///
/// Emitted at a sub-second interval while a session is playing, and once with
/// `did_just_finish = true` when a stream reaches its natural end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStatusUpdate {
    /// Session the update belongs to.
    pub session: SessionId,
    /// Current playback position.
    pub position: Duration,
    /// Total stream duration, when the output has derived it.
    pub duration: Option<Duration>,
    /// Whether samples are currently being produced.
    pub is_playing: bool,
    /// The stream just reached its natural end.
    pub did_just_finish: bool,
}

/// Trait for platform audio outputs that drive native playback engines.
///
/// Implementations own the single device audio resource. The core engine
/// guarantees it unloads a previous session before loading the next one, so
/// an implementation never needs to hold more than one live stream.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Load a stream and begin buffering. Resolves with a fresh session id
    /// once the output has buffered and (when `autoplay` is set) begun
    /// producing samples. Must resolve or error within a bounded time; a load
    /// that hangs forever is a contract violation.
    async fn load(&self, request: LoadRequest) -> Result<SessionId>;

    /// Begin or resume playback for the provided session.
    async fn play(&self, session: SessionId) -> Result<()>;

    /// Pause playback without releasing the session.
    async fn pause(&self, session: SessionId) -> Result<()>;

    /// Seek to an absolute position. Resolves only after the output has
    /// acknowledged the seek; position reports after resolution reflect it.
    async fn seek(&self, session: SessionId, position: Duration) -> Result<()>;

    /// Release the resources associated with a session. Idempotent: unloading
    /// an already-released session is not an error.
    async fn unload(&self, session: SessionId) -> Result<()>;

    /// Subscribe to periodic status updates for all sessions this output has
    /// produced. Consumers filter by [`AudioStatusUpdate::session`].
    fn subscribe(&self) -> broadcast::Receiver<AudioStatusUpdate>;
}
