//! # Event Bus System
//!
//! Event-driven notifications for the streaming-client core using
//! `tokio::sync::broadcast`. The UI layer subscribes to typed events emitted
//! by the playback engine, the playlist store and the catalog adapter instead
//! of polling them.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, PlaybackEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Playback(PlaybackEvent::Stopped))
//!     .ok();
//! ```
//!
//! ## Error Handling
//!
//! - `RecvError::Lagged(n)`: the subscriber was too slow and missed `n`
//!   events. Non-fatal; it keeps receiving new events.
//! - `RecvError::Closed`: all senders dropped; treat as shutdown.
//!
//! Emitting with no subscribers is not an error worth surfacing; emitters
//! call `.ok()` on the result.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback-related events
    Playback(PlaybackEvent),
    /// Playlist-library events
    Library(LibraryEvent),
    /// Catalog-fetch events
    Catalog(CatalogEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Catalog(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Library(LibraryEvent::PersistFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Catalog(CatalogEvent::FetchFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::Started { .. }) => EventSeverity::Info,
            CoreEvent::Library(LibraryEvent::PlaylistCreated { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by the playback engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A track began playing after a successful load.
    Started {
        /// Catalog id of the track.
        track_id: String,
    },
    /// Playback paused.
    Paused {
        /// Catalog id of the track.
        track_id: String,
    },
    /// Playback resumed from pause.
    Resumed {
        /// Catalog id of the track.
        track_id: String,
    },
    /// The current track reached its natural end.
    Completed {
        /// Catalog id of the track that finished.
        track_id: String,
    },
    /// Playback stopped and the audio resource was released.
    Stopped,
    /// A playback error occurred.
    Error {
        /// Catalog id of the track involved, if any.
        track_id: Option<String>,
        /// Human-readable error message.
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::Completed { .. } => "Track completed",
            PlaybackEvent::Stopped => "Playback stopped",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Library Events
// ============================================================================

/// Events emitted by the playlist store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// A new user playlist was created.
    PlaylistCreated {
        /// Generated playlist id.
        playlist_id: String,
        /// Trimmed display name.
        name: String,
    },
    /// A playlist was renamed.
    PlaylistRenamed {
        playlist_id: String,
        name: String,
    },
    /// A playlist was deleted.
    PlaylistDeleted { playlist_id: String },
    /// A song was appended to a playlist.
    SongAdded {
        playlist_id: String,
        track_id: String,
    },
    /// A song was removed from a playlist.
    SongRemoved {
        playlist_id: String,
        track_id: String,
    },
    /// A durable write of the collection failed; in-memory state is intact.
    PersistFailed {
        /// Human-readable failure reason.
        message: String,
    },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::PlaylistCreated { .. } => "Playlist created",
            LibraryEvent::PlaylistRenamed { .. } => "Playlist renamed",
            LibraryEvent::PlaylistDeleted { .. } => "Playlist deleted",
            LibraryEvent::SongAdded { .. } => "Song added to playlist",
            LibraryEvent::SongRemoved { .. } => "Song removed from playlist",
            LibraryEvent::PersistFailed { .. } => "Playlist persistence failed",
        }
    }
}

// ============================================================================
// Catalog Events
// ============================================================================

/// Events emitted by the catalog adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// A catalog query failed after exhausting retries; the caller received
    /// an empty result set.
    FetchFailed {
        /// The query kind that failed (e.g. "search_tracks").
        query: String,
        /// Human-readable failure reason.
        message: String,
    },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::FetchFailed { .. } => "Catalog fetch failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for publishing [`CoreEvent`]s.
///
/// Cloning the bus is cheap; all clones share the same channel. The bus is
/// fully thread-safe and usually shared behind `Arc`.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// When a subscriber falls behind by more than `capacity` events it
    /// receives `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when there are none. Emitters normally ignore the result.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that sees all future events.
    /// Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_reaches_all_subscribers() {
        let bus = EventBus::new(16);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        let event = CoreEvent::Playback(PlaybackEvent::Started {
            track_id: "t-1".to_string(),
        });
        let delivered = bus.emit(event.clone()).unwrap();
        assert_eq!(delivered, 2);

        assert_eq!(a.recv().await.unwrap(), event);
        assert_eq!(b.recv().await.unwrap(), event);
    }

    #[test]
    fn emit_without_subscribers_is_an_ignorable_error() {
        let bus = EventBus::new(16);
        assert!(bus.emit(CoreEvent::Playback(PlaybackEvent::Stopped)).is_err());
    }

    #[test]
    fn severity_classification() {
        let err = CoreEvent::Playback(PlaybackEvent::Error {
            track_id: None,
            message: "load failed".to_string(),
        });
        assert_eq!(err.severity(), EventSeverity::Error);

        let warn = CoreEvent::Library(LibraryEvent::PersistFailed {
            message: "disk full".to_string(),
        });
        assert_eq!(warn.severity(), EventSeverity::Warning);
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = CoreEvent::Library(LibraryEvent::SongAdded {
            playlist_id: "p-1".to_string(),
            track_id: "t-9".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
