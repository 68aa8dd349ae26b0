//! # Playlist Store
//!
//! Owns the durable collection of user playlists. All mutations follow the
//! same discipline: take an immutable snapshot of the collection, apply a
//! pure transform producing the next collection, atomically replace the
//! in-memory state, then enqueue a durable write of the whole collection.
//!
//! Persistence is write-through but fire-and-forget: a dedicated writer task
//! drains a FIFO queue of snapshots so callers never wait on storage, and
//! writes land in mutation order. A failed write leaves the in-memory state
//! authoritative and surfaces as a [`LibraryEvent::PersistFailed`] event.

use std::sync::Arc;

use bridge_traits::storage::SettingsStore;
use bridge_traits::time::Clock;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::error::{LibraryError, Result};
use crate::models::{seed_playlists, Playlist, PlaylistId, Track};

/// The single key-value slot holding the serialized collection.
///
/// Versioned so a future format change can migrate by reading the old slot
/// and writing a new one.
pub const STORAGE_KEY: &str = "playlists.v1";

/// Jobs consumed by the background writer task.
enum PersistJob {
    /// Write this snapshot of the collection to the storage slot.
    Write(Vec<Playlist>),
    /// Ack once every previously enqueued write has completed.
    Flush(oneshot::Sender<()>),
}

/// In-memory playlist collection with write-through persistence.
///
/// Cheap to clone; all clones share the same state and writer queue.
#[derive(Clone)]
pub struct PlaylistStore {
    state: Arc<watch::Sender<Vec<Playlist>>>,
    /// Serializes the snapshot-transform-replace sequence so concurrent
    /// mutations cannot interleave and lose updates.
    write_gate: Arc<Mutex<()>>,
    persist_tx: mpsc::UnboundedSender<PersistJob>,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl PlaylistStore {
    /// Load the collection from storage and start the writer task.
    ///
    /// A missing or unreadable slot falls back to the seed collection, which
    /// is immediately persisted so the next launch finds it.
    pub async fn load(
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
        events: EventBus,
    ) -> Self {
        let initial = match settings.get_string(STORAGE_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Playlist>>(&json) {
                Ok(playlists) => {
                    debug!(count = playlists.len(), "Loaded playlist collection");
                    Some(playlists)
                }
                Err(e) => {
                    warn!(error = %e, "Playlist slot is corrupt, reseeding");
                    None
                }
            },
            Ok(None) => {
                info!("No playlist collection found, seeding defaults");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read playlist slot, seeding defaults");
                None
            }
        };

        let needs_seed = initial.is_none();
        let playlists = initial.unwrap_or_else(|| seed_playlists(clock.unix_timestamp()));

        let (state, _) = watch::channel(playlists.clone());
        let (persist_tx, persist_rx) = mpsc::unbounded_channel();

        tokio::spawn(writer_task(persist_rx, settings, events.clone()));

        let store = Self {
            state: Arc::new(state),
            write_gate: Arc::new(Mutex::new(())),
            persist_tx,
            clock,
            events,
        };

        if needs_seed {
            store.enqueue_write(playlists);
        }

        store
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshot of the current collection, newest playlist first.
    pub fn playlists(&self) -> Vec<Playlist> {
        self.state.borrow().clone()
    }

    /// Look up a playlist by id.
    pub fn get_playlist(&self, id: &PlaylistId) -> Option<Playlist> {
        self.state.borrow().iter().find(|p| &p.id == id).cloned()
    }

    /// Whether the given song is already in the given playlist.
    ///
    /// Unknown playlist ids answer `false`.
    pub fn is_song_in_playlist(&self, id: &PlaylistId, song_id: &str) -> bool {
        self.state
            .borrow()
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.contains_song(song_id))
            .unwrap_or(false)
    }

    /// Subscribe to collection snapshots.
    ///
    /// The receiver observes every committed mutation; the current snapshot
    /// is available immediately via `borrow()`.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Playlist>> {
        self.state.subscribe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a new empty playlist at the front of the collection.
    ///
    /// The name is trimmed; an empty result is rejected.
    pub fn create_playlist(&self, name: &str) -> Result<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::EmptyName);
        }

        let playlist = Playlist::new(name, self.clock.unix_timestamp());
        let created = playlist.clone();

        self.mutate(|mut playlists| {
            playlists.insert(0, playlist);
            Some(playlists)
        });

        info!(playlist_id = %created.id, name = %created.name, "Created playlist");
        self.emit(LibraryEvent::PlaylistCreated {
            playlist_id: created.id.to_string(),
            name: created.name.clone(),
        });

        Ok(created)
    }

    /// Rename a playlist. The new name is trimmed; an empty result is
    /// rejected. Renaming an unknown playlist is a no-op.
    pub fn rename_playlist(&self, id: &PlaylistId, name: &str) -> Result<()> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(LibraryError::EmptyName);
        }

        let renamed = self.mutate(|mut playlists| {
            let playlist = playlists.iter_mut().find(|p| &p.id == id)?;
            if playlist.name == name {
                return None;
            }
            playlist.name = name.clone();
            Some(playlists)
        });

        if renamed {
            self.emit(LibraryEvent::PlaylistRenamed {
                playlist_id: id.to_string(),
                name,
            });
        }
        Ok(())
    }

    /// Delete a playlist. Deleting an unknown playlist is a no-op.
    pub fn delete_playlist(&self, id: &PlaylistId) {
        let deleted = self.mutate(|mut playlists| {
            let before = playlists.len();
            playlists.retain(|p| &p.id != id);
            (playlists.len() != before).then_some(playlists)
        });

        if deleted {
            info!(playlist_id = %id, "Deleted playlist");
            self.emit(LibraryEvent::PlaylistDeleted {
                playlist_id: id.to_string(),
            });
        }
    }

    /// Append a song to a playlist.
    ///
    /// Idempotent: adding a song already present (by track id) changes
    /// nothing. Songs without an id and unknown playlists are ignored.
    pub fn add_song(&self, id: &PlaylistId, track: Track) {
        if track.id.is_empty() {
            warn!(playlist_id = %id, "Ignoring song without an id");
            return;
        }

        let track_id = track.id.clone();
        let added = self.mutate(|mut playlists| {
            let playlist = playlists.iter_mut().find(|p| &p.id == id)?;
            if playlist.contains_song(&track.id) {
                return None;
            }
            playlist.songs.push(track);
            Some(playlists)
        });

        if added {
            debug!(playlist_id = %id, track_id = %track_id, "Added song to playlist");
            self.emit(LibraryEvent::SongAdded {
                playlist_id: id.to_string(),
                track_id,
            });
        }
    }

    /// Remove every occurrence of a song from a playlist.
    ///
    /// Tolerant of duplicates written by earlier app versions; removing a
    /// song that isn't present is a no-op.
    pub fn remove_song(&self, id: &PlaylistId, song_id: &str) {
        let removed = self.mutate(|mut playlists| {
            let playlist = playlists.iter_mut().find(|p| &p.id == id)?;
            let before = playlist.songs.len();
            playlist.songs.retain(|s| s.id != song_id);
            (playlist.songs.len() != before).then_some(playlists)
        });

        if removed {
            debug!(playlist_id = %id, track_id = %song_id, "Removed song from playlist");
            self.emit(LibraryEvent::SongRemoved {
                playlist_id: id.to_string(),
                track_id: song_id.to_string(),
            });
        }
    }

    /// Wait until every mutation enqueued so far has been durably written.
    ///
    /// Mainly for tests and orderly shutdown; normal operation never blocks
    /// on storage.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.persist_tx.send(PersistJob::Flush(tx)).is_ok() {
            rx.await.ok();
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run a pure transform over a snapshot of the collection.
    ///
    /// The transform returns `Some(next)` to commit or `None` to leave the
    /// collection untouched. Returns whether a commit happened.
    fn mutate<F>(&self, transform: F) -> bool
    where
        F: FnOnce(Vec<Playlist>) -> Option<Vec<Playlist>>,
    {
        let _gate = self.write_gate.lock();
        let snapshot = self.state.borrow().clone();
        match transform(snapshot) {
            Some(next) => {
                self.state.send_replace(next.clone());
                self.enqueue_write(next);
                true
            }
            None => false,
        }
    }

    fn enqueue_write(&self, snapshot: Vec<Playlist>) {
        // Only fails after the writer task is gone, i.e. during shutdown.
        self.persist_tx.send(PersistJob::Write(snapshot)).ok();
    }

    fn emit(&self, event: LibraryEvent) {
        self.events.emit(CoreEvent::Library(event)).ok();
    }
}

impl std::fmt::Debug for PlaylistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistStore")
            .field("playlist_count", &self.state.borrow().len())
            .finish()
    }
}

/// Drains the persistence queue in FIFO order.
///
/// Each job serializes and writes a full collection snapshot; later writes
/// overwrite earlier ones, so the slot always converges on the newest state.
async fn writer_task(
    mut rx: mpsc::UnboundedReceiver<PersistJob>,
    settings: Arc<dyn SettingsStore>,
    events: EventBus,
) {
    while let Some(job) = rx.recv().await {
        match job {
            PersistJob::Write(playlists) => {
                let result = match serde_json::to_string(&playlists) {
                    Ok(json) => settings.set_string(STORAGE_KEY, &json).await,
                    Err(e) => {
                        warn!(error = %e, "Failed to serialize playlist collection");
                        events
                            .emit(CoreEvent::Library(LibraryEvent::PersistFailed {
                                message: e.to_string(),
                            }))
                            .ok();
                        continue;
                    }
                };
                if let Err(e) = result {
                    warn!(error = %e, "Failed to persist playlist collection");
                    events
                        .emit(CoreEvent::Library(LibraryEvent::PersistFailed {
                            message: e.to_string(),
                        }))
                        .ok();
                }
            }
            PersistJob::Flush(ack) => {
                ack.send(()).ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Track;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap;

    /// In-memory key-value store standing in for platform storage.
    #[derive(Default)]
    struct MemoryStore {
        values: Mutex<HashMap<String, String>>,
        fail_writes: std::sync::atomic::AtomicBool,
    }

    impl MemoryStore {
        fn with_slot(json: &str) -> Self {
            let store = Self::default();
            store
                .values
                .lock()
                .insert(STORAGE_KEY.to_string(), json.to_string());
            store
        }

        fn slot(&self) -> Option<String> {
            self.values.lock().get(STORAGE_KEY).cloned()
        }
    }

    #[async_trait]
    impl SettingsStore for MemoryStore {
        async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
            if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(BridgeError::OperationFailed("disk full".to_string()));
            }
            self.values
                .lock()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
            Ok(self.values.lock().get(key).cloned())
        }

        async fn delete(&self, key: &str) -> BridgeResult<()> {
            self.values.lock().remove(key);
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.values.lock().keys().cloned().collect())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.values.lock().clear();
            Ok(())
        }
    }

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_opt(self.0, 0).unwrap()
        }
    }

    async fn store_with(memory: Arc<MemoryStore>) -> PlaylistStore {
        PlaylistStore::load(memory, Arc::new(FixedClock(1_700_000_000)), EventBus::new(16)).await
    }

    #[tokio::test]
    async fn missing_slot_seeds_defaults_and_persists_them() {
        let memory = Arc::new(MemoryStore::default());
        let store = store_with(memory.clone()).await;

        let playlists = store.playlists();
        assert_eq!(playlists.len(), 4);
        assert_eq!(playlists[0].name, "My morning tracks");

        store.flush().await;
        let written: Vec<Playlist> = serde_json::from_str(&memory.slot().unwrap()).unwrap();
        assert_eq!(written, playlists);
    }

    #[tokio::test]
    async fn corrupt_slot_falls_back_to_seeds() {
        let memory = Arc::new(MemoryStore::with_slot("{not json"));
        let store = store_with(memory).await;

        assert_eq!(store.playlists().len(), 4);
    }

    #[tokio::test]
    async fn existing_slot_is_loaded_verbatim() {
        let saved = vec![Playlist::new("Road trip", 50)];
        let memory = Arc::new(MemoryStore::with_slot(
            &serde_json::to_string(&saved).unwrap(),
        ));
        let store = store_with(memory).await;

        assert_eq!(store.playlists(), saved);
    }

    #[tokio::test]
    async fn create_prepends_and_trims() {
        let store = store_with(Arc::new(MemoryStore::default())).await;

        let created = store.create_playlist("  Focus  ").unwrap();
        assert_eq!(created.name, "Focus");
        assert_eq!(created.created_at, 1_700_000_000);
        assert_eq!(store.playlists()[0].id, created.id);
    }

    #[tokio::test]
    async fn create_rejects_blank_names() {
        let store = store_with(Arc::new(MemoryStore::default())).await;

        assert!(matches!(
            store.create_playlist("   "),
            Err(LibraryError::EmptyName)
        ));
        assert_eq!(store.playlists().len(), 4);
    }

    #[tokio::test]
    async fn add_song_is_idempotent_by_id() {
        let store = store_with(Arc::new(MemoryStore::default())).await;
        let playlist = store.create_playlist("Mix").unwrap();

        let track = Track::new("t-1", "One", "A").with_audio_url("https://x/1.mp3");
        store.add_song(&playlist.id, track.clone());
        store.add_song(&playlist.id, track);

        assert_eq!(store.get_playlist(&playlist.id).unwrap().songs.len(), 1);
        assert!(store.is_song_in_playlist(&playlist.id, "t-1"));
    }

    #[tokio::test]
    async fn add_song_ignores_missing_ids_and_unknown_playlists() {
        let store = store_with(Arc::new(MemoryStore::default())).await;
        let playlist = store.create_playlist("Mix").unwrap();

        store.add_song(&playlist.id, Track::new("", "No id", "A"));
        store.add_song(&PlaylistId::new("nope"), Track::new("t-1", "One", "A"));

        assert!(store.get_playlist(&playlist.id).unwrap().songs.is_empty());
    }

    #[tokio::test]
    async fn remove_song_drops_every_duplicate() {
        let saved = {
            let mut p = Playlist::new("Dupes", 10);
            p.songs.push(Track::new("t-1", "One", "A"));
            p.songs.push(Track::new("t-2", "Two", "B"));
            p.songs.push(Track::new("t-1", "One", "A"));
            vec![p]
        };
        let memory = Arc::new(MemoryStore::with_slot(
            &serde_json::to_string(&saved).unwrap(),
        ));
        let store = store_with(memory).await;
        let id = saved[0].id.clone();

        store.remove_song(&id, "t-1");

        let songs = &store.get_playlist(&id).unwrap().songs;
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, "t-2");
    }

    #[tokio::test]
    async fn rename_trims_and_rejects_blank() {
        let store = store_with(Arc::new(MemoryStore::default())).await;
        let playlist = store.create_playlist("Old").unwrap();

        store.rename_playlist(&playlist.id, "  New name ").unwrap();
        assert_eq!(store.get_playlist(&playlist.id).unwrap().name, "New name");

        assert!(matches!(
            store.rename_playlist(&playlist.id, " "),
            Err(LibraryError::EmptyName)
        ));
        assert_eq!(store.get_playlist(&playlist.id).unwrap().name, "New name");
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let store = store_with(Arc::new(MemoryStore::default())).await;
        let keep = store.create_playlist("Keep").unwrap();
        let drop = store.create_playlist("Drop").unwrap();

        store.delete_playlist(&drop.id);

        assert!(store.get_playlist(&drop.id).is_none());
        assert!(store.get_playlist(&keep.id).is_some());
    }

    #[tokio::test]
    async fn mutations_write_through_in_order() {
        let memory = Arc::new(MemoryStore::default());
        let store = store_with(memory.clone()).await;

        let playlist = store.create_playlist("Mix").unwrap();
        store.add_song(&playlist.id, Track::new("t-1", "One", "A"));
        store.flush().await;

        let written: Vec<Playlist> = serde_json::from_str(&memory.slot().unwrap()).unwrap();
        assert_eq!(written, store.playlists());
    }

    #[tokio::test]
    async fn failed_write_keeps_memory_state_and_emits_event() {
        let memory = Arc::new(MemoryStore::default());
        let events = EventBus::new(16);
        let store = PlaylistStore::load(
            memory.clone(),
            Arc::new(FixedClock(1_700_000_000)),
            events.clone(),
        )
        .await;
        store.flush().await;

        memory
            .fail_writes
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let mut rx = events.subscribe();
        let playlist = store.create_playlist("Doomed").unwrap();
        store.flush().await;

        assert!(store.get_playlist(&playlist.id).is_some());
        loop {
            match rx.recv().await.unwrap() {
                CoreEvent::Library(LibraryEvent::PersistFailed { .. }) => break,
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn subscribers_observe_every_committed_mutation() {
        let store = store_with(Arc::new(MemoryStore::default())).await;
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.create_playlist("Watched").unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().first().unwrap().name, "Watched");
    }
}
