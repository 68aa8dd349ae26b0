//! Core service façade and bootstrap helpers.
//!
//! Wires host-provided bridge implementations (HTTP, settings storage, the
//! audio output, a clock) into the streaming-client core and exposes the
//! three component handles the UI layer talks to: the playback engine, the
//! playlist store and the catalog client. Desktop apps typically enable the
//! `desktop-shims` feature for ready-made HTTP and settings bridges; mobile
//! hosts inject their own.

pub mod error;

pub use error::{CoreError, Result};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore};

use std::sync::Arc;

use bridge_traits::{
    http::HttpClient,
    playback::AudioOutput,
    storage::SettingsStore,
    time::Clock,
};
use core_catalog::{CatalogClient, CatalogConfig};
use core_library::PlaylistStore;
use core_playback::PlayerEngine;
use core_runtime::events::EventBus;
use tracing::info;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub settings_store: Arc<dyn SettingsStore>,
    pub audio_output: Arc<dyn AudioOutput>,
    pub clock: Arc<dyn Clock>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        settings_store: Arc<dyn SettingsStore>,
        audio_output: Arc<dyn AudioOutput>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http_client,
            settings_store,
            audio_output,
            clock,
        }
    }
}

/// Service-level configuration.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Catalog API settings (client id, base URL, retry policy).
    pub catalog: CatalogConfig,
    /// Buffer size of the core event bus.
    pub event_buffer: usize,
}

impl CoreConfig {
    pub fn new(catalog: CatalogConfig) -> Self {
        Self {
            catalog,
            event_buffer: core_runtime::events::DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

/// Primary façade exposed to host applications.
///
/// Construct once at startup via [`CoreService::initialize`] and keep it for
/// the process lifetime; each test constructs its own fresh instance.
#[derive(Clone)]
pub struct CoreService {
    events: EventBus,
    player: Arc<PlayerEngine>,
    playlists: PlaylistStore,
    catalog: CatalogClient,
}

impl CoreService {
    /// Bring the core up: load the playlist collection, start the playback
    /// engine and connect the catalog client.
    pub async fn initialize(deps: CoreDependencies, config: CoreConfig) -> Result<Self> {
        let events = EventBus::new(config.event_buffer);

        let playlists = PlaylistStore::load(
            deps.settings_store.clone(),
            deps.clock.clone(),
            events.clone(),
        )
        .await;

        let player = Arc::new(PlayerEngine::new(deps.audio_output.clone(), events.clone()));

        let catalog = CatalogClient::new(deps.http_client.clone(), config.catalog, events.clone());

        info!("Core service initialized");
        Ok(Self {
            events,
            player,
            playlists,
            catalog,
        })
    }

    /// The playback engine.
    pub fn player(&self) -> &PlayerEngine {
        &self.player
    }

    /// The user playlist store.
    pub fn playlists(&self) -> &PlaylistStore {
        &self.playlists
    }

    /// The catalog client.
    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    /// The core event bus; subscribe for push-based notifications.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Orderly teardown: release the audio session and wait for pending
    /// playlist writes to land.
    pub async fn shutdown(&self) {
        self.player.shutdown().await;
        self.playlists.flush().await;
        info!("Core service shut down");
    }
}
