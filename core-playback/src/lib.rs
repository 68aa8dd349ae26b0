//! # Core Playback Module
//!
//! The playback engine: owns the single live audio session, the play queue,
//! transport state, position/duration tracking, repeat mode and the favorite
//! flag of the active track. Commands come in from the UI layer; state goes
//! out as push-based snapshots on a `watch` channel, with notable transitions
//! also published on the core event bus.

pub mod engine;
pub mod error;
pub mod state;

pub use engine::PlayerEngine;
pub use error::{PlaybackError, Result};
pub use state::{PlayerSnapshot, RepeatMode, Transport};
