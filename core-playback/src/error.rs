use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The requested track has no stream URL and can never be loaded.
    #[error("Track has no audio source")]
    NoAudioSource,

    /// The host audio output failed to load the stream.
    #[error("Failed to load audio: {reason}")]
    LoadFailed { reason: String },

    /// A transport command (play, pause, seek) failed at the host boundary.
    #[error("Audio output error: {0}")]
    Output(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
