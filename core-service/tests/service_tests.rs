//! End-to-end wiring of the core service with in-memory bridges.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_desktop::SqliteSettingsStore;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::playback::{AudioOutput, AudioStatusUpdate, LoadRequest, SessionId};
use bridge_traits::time::SystemClock;
use core_catalog::CatalogConfig;
use core_library::Track;
use core_playback::Transport;
use core_service::{CoreConfig, CoreDependencies, CoreService};
use tokio::sync::broadcast;

struct OfflineHttp;

#[async_trait]
impl HttpClient for OfflineHttp {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        Err(BridgeError::NotAvailable("offline".to_string()))
    }
}

struct NullAudio {
    status: broadcast::Sender<AudioStatusUpdate>,
}

impl NullAudio {
    fn new() -> Self {
        let (status, _) = broadcast::channel(8);
        Self { status }
    }
}

#[async_trait]
impl AudioOutput for NullAudio {
    async fn load(&self, _request: LoadRequest) -> BridgeResult<SessionId> {
        Ok(SessionId::new())
    }

    async fn play(&self, _session: SessionId) -> BridgeResult<()> {
        Ok(())
    }

    async fn pause(&self, _session: SessionId) -> BridgeResult<()> {
        Ok(())
    }

    async fn seek(&self, _session: SessionId, _position: Duration) -> BridgeResult<()> {
        Ok(())
    }

    async fn unload(&self, _session: SessionId) -> BridgeResult<()> {
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AudioStatusUpdate> {
        self.status.subscribe()
    }
}

async fn deps(settings: Arc<SqliteSettingsStore>) -> CoreDependencies {
    CoreDependencies::new(
        Arc::new(OfflineHttp),
        settings,
        Arc::new(NullAudio::new()),
        Arc::new(SystemClock),
    )
}

fn config() -> CoreConfig {
    CoreConfig::new(CatalogConfig::new("test-client-id"))
}

#[tokio::test]
async fn initialize_seeds_playlists_and_starts_idle() {
    let settings = Arc::new(SqliteSettingsStore::in_memory().await.unwrap());
    let core = CoreService::initialize(deps(settings).await, config())
        .await
        .unwrap();

    assert_eq!(core.playlists().playlists().len(), 4);
    assert_eq!(core.player().snapshot().transport, Transport::Idle);
}

#[tokio::test]
async fn playlists_survive_a_restart_on_the_same_storage() {
    let settings = Arc::new(SqliteSettingsStore::in_memory().await.unwrap());

    let core = CoreService::initialize(deps(settings.clone()).await, config())
        .await
        .unwrap();
    let playlist = core.playlists().create_playlist("Road trip").unwrap();
    core.playlists().add_song(
        &playlist.id,
        Track::new("t-1", "One", "A").with_audio_url("https://cdn.test/1.mp3"),
    );
    core.shutdown().await;

    let reopened = CoreService::initialize(deps(settings).await, config())
        .await
        .unwrap();
    let restored = reopened.playlists().get_playlist(&playlist.id).unwrap();
    assert_eq!(restored.name, "Road trip");
    assert_eq!(restored.songs.len(), 1);
    assert_eq!(restored.songs[0].id, "t-1");
}

#[tokio::test]
async fn play_and_add_current_track_to_playlist() {
    let settings = Arc::new(SqliteSettingsStore::in_memory().await.unwrap());
    let core = CoreService::initialize(deps(settings).await, config())
        .await
        .unwrap();

    let track = Track::new("t-9", "Nine", "B").with_audio_url("https://cdn.test/9.mp3");
    core.player()
        .play_track(track.clone(), vec![track.clone()])
        .await
        .unwrap();
    assert_eq!(core.player().snapshot().transport, Transport::Playing);

    let playlist = core.playlists().playlists()[0].clone();
    let playing = core.player().snapshot().track.unwrap();
    core.playlists().add_song(&playlist.id, playing);

    assert!(core.playlists().is_song_in_playlist(&playlist.id, "t-9"));

    let offline = core.catalog().search_tracks("anything", 5).await;
    assert!(offline.is_empty());

    core.shutdown().await;
}
