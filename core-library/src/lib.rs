//! # Core Library Module
//!
//! Canonical data model (tracks, playlists) and the user playlist store.
//!
//! The playlist store owns the durable collection of user-created playlists
//! and write-throughs every mutation to a single key-value slot provided by
//! the host's [`bridge_traits::storage::SettingsStore`].

pub mod error;
pub mod models;
pub mod store;

pub use error::{LibraryError, Result};
pub use models::{Playlist, PlaylistId, Track};
pub use store::PlaylistStore;
