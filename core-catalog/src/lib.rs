//! # Core Catalog Module
//!
//! Read-only adapter over the remote music catalog's REST API. Maps raw API
//! payloads into the canonical [`core_library::Track`] shape and shields the
//! rest of the core from network failures: every query degrades to an empty
//! result set instead of propagating an error.

pub mod client;
mod error;
pub mod types;

pub use client::{CatalogClient, CatalogConfig, TrackOrder};
pub use types::{Artist, CatalogPlaylist};
