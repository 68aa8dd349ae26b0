//! Observable playback state.

use core_library::Track;
use std::time::Duration;

/// Transport status of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// No audio resource is loaded.
    #[default]
    Idle,
    /// A load was requested and the stream is still buffering.
    Loading,
    /// The loaded stream is producing samples.
    Playing,
    /// A stream is loaded but paused.
    Paused,
}

/// Repeat behaviour at queue boundaries and track end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Playback stops at the end of the queue.
    #[default]
    Off,
    /// The queue wraps around at both ends.
    All,
    /// The current track replays indefinitely.
    One,
}

impl RepeatMode {
    /// The next mode in the toggle cycle: Off, All, One, back to Off.
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Immutable snapshot of everything the UI renders about playback.
///
/// Published on a `watch` channel after every observable change; subscribers
/// always see a complete, self-consistent state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerSnapshot {
    /// The active track, if any.
    pub track: Option<Track>,
    /// The queue next/previous navigate through.
    pub queue: Vec<Track>,
    /// Index of the active track within the queue, when it is a member.
    pub queue_index: Option<usize>,
    /// Transport status.
    pub transport: Transport,
    /// Current playback position.
    pub position: Duration,
    /// Stream duration, once the audio output has derived it.
    pub duration: Option<Duration>,
    /// Repeat behaviour.
    pub repeat: RepeatMode,
    /// Favorite flag of the active track. Process-lifetime only; resets
    /// whenever the active track changes.
    pub is_favorite: bool,
}

impl PlayerSnapshot {
    /// Playback progress in percent, 0.0 when the duration is unknown or
    /// zero.
    pub fn progress_percent(&self) -> f64 {
        match self.duration {
            Some(duration) if !duration.is_zero() => {
                let pct = self.position.as_secs_f64() / duration.as_secs_f64() * 100.0;
                pct.clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_mode_cycles_through_all_three() {
        let mut mode = RepeatMode::Off;
        mode = mode.cycled();
        assert_eq!(mode, RepeatMode::All);
        mode = mode.cycled();
        assert_eq!(mode, RepeatMode::One);
        mode = mode.cycled();
        assert_eq!(mode, RepeatMode::Off);
    }

    #[test]
    fn progress_is_zero_without_a_duration() {
        let snapshot = PlayerSnapshot {
            position: Duration::from_secs(30),
            ..Default::default()
        };
        assert_eq!(snapshot.progress_percent(), 0.0);
    }

    #[test]
    fn progress_is_clamped_to_one_hundred() {
        let snapshot = PlayerSnapshot {
            position: Duration::from_secs(120),
            duration: Some(Duration::from_secs(60)),
            ..Default::default()
        };
        assert_eq!(snapshot.progress_percent(), 100.0);
    }

    #[test]
    fn progress_reflects_the_position() {
        let snapshot = PlayerSnapshot {
            position: Duration::from_secs(30),
            duration: Some(Duration::from_secs(120)),
            ..Default::default()
        };
        assert_eq!(snapshot.progress_percent(), 25.0);
    }
}
