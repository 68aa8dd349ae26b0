//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the streaming-client core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be provided differently per platform (desktop,
//! iOS, Android):
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry
//! - [`SettingsStore`](storage::SettingsStore) - Durable key-value slots
//! - [`AudioOutput`](playback::AudioOutput) - The device audio resource
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations should convert platform-specific errors into it and keep
//! the messages actionable (network status, key names, session ids).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so handles can be shared
//! across async tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod playback;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use playback::{AudioOutput, AudioStatusUpdate, LoadRequest, SessionId};
pub use storage::SettingsStore;
pub use time::{Clock, SystemClock};
