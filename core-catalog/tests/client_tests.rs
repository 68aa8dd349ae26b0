//! Catalog client behaviour against a mocked HTTP transport.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use bytes::Bytes;
use core_catalog::{CatalogClient, CatalogConfig, TrackOrder};
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use mockall::mock;
use mockall::predicate::function;

mock! {
    Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        async fn execute_with_retry(
            &self,
            request: HttpRequest,
            policy: RetryPolicy,
        ) -> BridgeResult<HttpResponse>;
    }
}

fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

fn client_with(http: MockHttp) -> (CatalogClient, EventBus) {
    let events = EventBus::new(16);
    let config = CatalogConfig::new("test-client-id").with_base_url("https://catalog.test/v3.0");
    (
        CatalogClient::new(Arc::new(http), config, events.clone()),
        events,
    )
}

const TRACKS_BODY: &str = r#"{
    "headers": {"status": "success", "code": 0},
    "results": [
        {
            "id": "168",
            "name": "J'm'e FPM",
            "artist_name": "TriFace",
            "artist_id": "7",
            "album_name": "Premiers Jets",
            "album_id": "24",
            "image": "https://img.test/168.jpg",
            "audio": "https://cdn.test/168.mp3",
            "audiodownload": "https://cdn.test/168-dl.mp3",
            "duration": 183
        },
        {
            "id": "169",
            "name": "Trio HxC",
            "artist_name": "TriFace",
            "audio": "https://cdn.test/169.mp3"
        }
    ]
}"#;

#[tokio::test]
async fn search_maps_results_into_tracks() {
    let mut http = MockHttp::new();
    http.expect_execute_with_retry()
        .withf(|request, _| {
            request.url.contains("namesearch=electro%20swing")
                && request.url.contains("client_id=test-client-id")
                && request.url.contains("format=json")
        })
        .times(1)
        .returning(|_, _| Ok(json_response(200, TRACKS_BODY)));

    let (client, _events) = client_with(http);
    let tracks = client.search_tracks("electro swing", 20).await;

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].title, "J'm'e FPM");
    assert_eq!(tracks[0].artist, "TriFace");
    assert_eq!(tracks[0].duration_secs, Some(183));
    assert!(tracks[1].is_playable());
}

#[tokio::test]
async fn top_tracks_requests_the_chosen_ordering() {
    let mut http = MockHttp::new();
    http.expect_execute_with_retry()
        .with(
            function(|request: &HttpRequest| request.url.contains("order=releasedate_desc")),
            function(|_: &RetryPolicy| true),
        )
        .times(1)
        .returning(|_, _| Ok(json_response(200, TRACKS_BODY)));

    let (client, _events) = client_with(http);
    let tracks = client.top_tracks(10, TrackOrder::ReleaseDate).await;
    assert_eq!(tracks.len(), 2);
}

#[tokio::test]
async fn transport_failure_degrades_to_empty_and_reports() {
    let mut http = MockHttp::new();
    http.expect_execute_with_retry()
        .times(1)
        .returning(|_, _| Err(BridgeError::OperationFailed("connection refused".into())));

    let (client, events) = client_with(http);
    let mut rx = events.subscribe();

    let tracks = client.hot_tracks(10).await;
    assert!(tracks.is_empty());

    match rx.recv().await.unwrap() {
        CoreEvent::Catalog(CatalogEvent::FetchFailed { query, message }) => {
            assert_eq!(query, "hot_tracks");
            assert!(message.contains("connection refused"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn non_success_status_degrades_to_empty() {
    let mut http = MockHttp::new();
    http.expect_execute_with_retry()
        .times(1)
        .returning(|_, _| Ok(json_response(503, "unavailable")));

    let (client, _events) = client_with(http);
    assert!(client.tracks_by_genre("jazz", 5).await.is_empty());
}

#[tokio::test]
async fn embedded_api_error_degrades_to_empty() {
    let body = r#"{
        "headers": {"status": "failed", "code": 5, "error_message": "invalid client id"},
        "results": []
    }"#;
    let mut http = MockHttp::new();
    http.expect_execute_with_retry()
        .times(1)
        .returning(move |_, _| Ok(json_response(200, body)));

    let (client, events) = client_with(http);
    let mut rx = events.subscribe();

    assert!(client.tracks_by_artist("7", 5).await.is_empty());
    assert!(matches!(
        rx.recv().await.unwrap(),
        CoreEvent::Catalog(CatalogEvent::FetchFailed { .. })
    ));
}

#[tokio::test]
async fn malformed_body_degrades_to_empty() {
    let mut http = MockHttp::new();
    http.expect_execute_with_retry()
        .times(1)
        .returning(|_, _| Ok(json_response(200, "<html>gateway</html>")));

    let (client, _events) = client_with(http);
    assert!(client.search_tracks("anything", 5).await.is_empty());
}

#[tokio::test]
async fn artists_and_playlists_map_their_payloads() {
    let artists_body = r#"{
        "headers": {"code": 0},
        "results": [{"id": 7, "name": "TriFace", "image": "https://img.test/a7.jpg"}]
    }"#;
    let playlists_body = r#"{
        "headers": {"code": 0},
        "results": [{"id": "500", "name": "Morning Focus", "image": ""}]
    }"#;

    let mut http = MockHttp::new();
    http.expect_execute_with_retry()
        .withf(|request, _| request.url.contains("/artists/"))
        .times(1)
        .returning(move |_, _| Ok(json_response(200, artists_body)));
    http.expect_execute_with_retry()
        .withf(|request, _| request.url.contains("/playlists/"))
        .times(1)
        .returning(move |_, _| Ok(json_response(200, playlists_body)));

    let (client, _events) = client_with(http);

    let artists = client.artists(8).await;
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].id, "7");
    assert_eq!(artists[0].name, "TriFace");

    let playlists = client.featured_playlists(8).await;
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].title, "Morning Focus");
    assert_eq!(playlists[0].track_count, None);
}
