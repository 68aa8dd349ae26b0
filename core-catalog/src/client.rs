//! Catalog API client.
//!
//! Thin query layer over the catalog's REST endpoints. Transient failures
//! (connection errors, 5xx, 429) are retried with linear backoff by the host
//! HTTP client; anything that still fails is logged, reported on the event
//! bus and answered with an empty result set so browse screens render empty
//! rather than crash.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use core_library::Track;
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};
use crate::types::{ApiEnvelope, Artist, CatalogPlaylist, RawArtist, RawPlaylist, RawTrack};

/// Default catalog API root.
const DEFAULT_BASE_URL: &str = "https://api.jamendo.com/v3.0";

/// Timeout applied to every catalog request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result ordering for track queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOrder {
    /// All-time popularity, the default browse ordering.
    Popularity,
    /// Popularity over the last week, used for the "hot right now" shelf.
    PopularityWeek,
    /// Newest releases first.
    ReleaseDate,
}

impl TrackOrder {
    fn as_param(self) -> &'static str {
        match self {
            TrackOrder::Popularity => "popularity_total",
            TrackOrder::PopularityWeek => "popularity_week",
            TrackOrder::ReleaseDate => "releasedate_desc",
        }
    }
}

/// Catalog client configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// API client id sent with every request.
    pub client_id: String,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl CatalogConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: client_id.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Read-only client for the remote catalog.
///
/// Cheap to clone; clones share the underlying HTTP client.
#[derive(Clone)]
pub struct CatalogClient {
    http: Arc<dyn HttpClient>,
    config: CatalogConfig,
    events: EventBus,
}

impl CatalogClient {
    pub fn new(http: Arc<dyn HttpClient>, config: CatalogConfig, events: EventBus) -> Self {
        Self {
            http,
            config,
            events,
        }
    }

    // =========================================================================
    // Track queries
    // =========================================================================

    /// Most popular tracks, in the given ordering.
    pub async fn top_tracks(&self, limit: u32, order: TrackOrder) -> Vec<Track> {
        let params = format!("&limit={}&order={}", limit, order.as_param());
        self.track_query("top_tracks", "tracks", params).await
    }

    /// Tracks trending this week.
    pub async fn hot_tracks(&self, limit: u32) -> Vec<Track> {
        let params = format!(
            "&limit={}&order={}",
            limit,
            TrackOrder::PopularityWeek.as_param()
        );
        self.track_query("hot_tracks", "tracks", params).await
    }

    /// Tracks tagged with the given genre.
    pub async fn tracks_by_genre(&self, genre: &str, limit: u32) -> Vec<Track> {
        let params = format!("&limit={}&tags={}", limit, urlencoding::encode(genre));
        self.track_query("tracks_by_genre", "tracks", params).await
    }

    /// Tracks by the given artist.
    pub async fn tracks_by_artist(&self, artist_id: &str, limit: u32) -> Vec<Track> {
        let params = format!(
            "&limit={}&artist_id={}",
            limit,
            urlencoding::encode(artist_id)
        );
        self.track_query("tracks_by_artist", "tracks", params).await
    }

    /// Free-text track search.
    pub async fn search_tracks(&self, query: &str, limit: u32) -> Vec<Track> {
        let params = format!("&limit={}&namesearch={}", limit, urlencoding::encode(query));
        self.track_query("search_tracks", "tracks", params).await
    }

    // =========================================================================
    // Browse queries
    // =========================================================================

    /// Popular artists for the browse screen.
    pub async fn artists(&self, limit: u32) -> Vec<Artist> {
        let params = format!("&limit={}&order=popularity_total", limit);
        match self.fetch::<RawArtist>("artists", "artists", params).await {
            Ok(raws) => raws.into_iter().map(Artist::from).collect(),
            Err(e) => self.degrade("artists", e),
        }
    }

    /// Editorial playlists curated by the catalog.
    pub async fn featured_playlists(&self, limit: u32) -> Vec<CatalogPlaylist> {
        let params = format!("&limit={}", limit);
        match self
            .fetch::<RawPlaylist>("featured_playlists", "playlists", params)
            .await
        {
            Ok(raws) => raws.into_iter().map(CatalogPlaylist::from).collect(),
            Err(e) => self.degrade("featured_playlists", e),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn track_query(
        &self,
        query_kind: &'static str,
        path: &str,
        params: String,
    ) -> Vec<Track> {
        match self.fetch::<RawTrack>(query_kind, path, params).await {
            Ok(raws) => raws.into_iter().map(Track::from).collect(),
            Err(e) => self.degrade(query_kind, e),
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        query_kind: &str,
        path: &str,
        params: String,
    ) -> Result<Vec<T>> {
        let url = format!(
            "{}/{}/?client_id={}&format=json{}",
            self.config.base_url,
            path,
            urlencoding::encode(&self.config.client_id),
            params
        );

        debug!(query = query_kind, url = %url, "Fetching from catalog");

        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self
            .http
            .execute_with_retry(request, self.config.retry.clone())
            .await?;

        if !response.is_success() {
            return Err(CatalogError::Api {
                status: response.status,
            });
        }

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&response.body)?;
        if !envelope.headers.is_ok() {
            warn!(
                query = query_kind,
                code = envelope.headers.code,
                message = envelope.headers.error_message.as_deref().unwrap_or(""),
                "Catalog API reported an error"
            );
            return Err(CatalogError::Api {
                status: response.status,
            });
        }

        Ok(envelope.results)
    }

    /// Log the failure, report it on the bus, answer with nothing.
    fn degrade<T>(&self, query_kind: &str, error: CatalogError) -> Vec<T> {
        warn!(query = query_kind, error = %error, "Catalog query failed, returning empty result");
        self.events
            .emit(CoreEvent::Catalog(CatalogEvent::FetchFailed {
                query: query_kind.to_string(),
                message: error.to_string(),
            }))
            .ok();
        Vec::new()
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
