//! Settings Storage Abstraction
//!
//! Provides a platform-agnostic trait for durable key-value storage, the
//! persistence substrate for user-created playlists and preferences.

use async_trait::async_trait;

use crate::error::Result;

/// Key-value settings storage trait
///
/// Abstracts platform-specific preference storage:
/// - iOS: UserDefaults
/// - Android: SharedPreferences / DataStore
/// - Desktop: SQLite-backed table (see `bridge-desktop`)
///
/// Values are opaque strings; callers serialize structured data (the playlist
/// collection is stored as one JSON document under a single key).
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn save_slot(store: &dyn SettingsStore, json: &str) -> Result<()> {
///     store.set_string("playlists.v1", json).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value, replacing any previous value for the key.
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value. Returns `Ok(None)` if the key doesn't exist.
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Delete a setting. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists.
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }

    /// List all setting keys.
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear all settings.
    async fn clear_all(&self) -> Result<()>;
}
