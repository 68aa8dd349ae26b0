//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits
//! the streaming-client core consumes, using desktop-appropriate libraries:
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` using a SQLite-backed key-value table
//!
//! The device audio output has no desktop default here; hosts inject their
//! own `AudioOutput` implementation (the core's tests ship a scripted fake).
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http_client = ReqwestHttpClient::new().unwrap();
//!     let settings = SqliteSettingsStore::new("app.db".into()).await.unwrap();
//!     // Hand both to core_service::CoreDependencies
//! }
//! ```

mod http;
mod settings;

pub use http::ReqwestHttpClient;
pub use settings::SqliteSettingsStore;
