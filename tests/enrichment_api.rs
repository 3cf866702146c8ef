//! Metadata enrichment against mocked MusicBrainz and Cover Art Archive
//! servers.

mod common;

use axum::http::StatusCode;
use sea_orm::EntityTrait;
use wiremock::matchers::{method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{body_json, TestApp};
use deadwax_api::entities::{artist, release};

const MBID: &str = "11a8f8f0-6f64-4f62-a67d-d43c1fed1234";

async fn mock_metadata_servers() -> (MockServer, MockServer) {
    let musicbrainz = MockServer::start().await;
    let coverart = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "releases": [
                {"id": MBID, "score": 100, "country": "NO", "date": "1994-02-01"},
                {"id": "00000000-0000-0000-0000-000000000000", "score": 40}
            ]
        })))
        .mount(&musicbrainz)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/release/{MBID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "images": [
                {"front": false, "image": "https://caa.example/back.jpg"},
                {"front": true, "image": "https://caa.example/front.jpg"}
            ]
        })))
        .mount(&coverart)
        .await;

    (musicbrainz, coverart)
}

#[tokio::test]
async fn enrichment_merges_metadata_and_cover() {
    let (musicbrainz, coverart) = mock_metadata_servers().await;
    let app = TestApp::spawn_with(|cfg| {
        cfg.musicbrainz_api_base = musicbrainz.uri();
        cfg.coverart_api_base = coverart.uri();
    })
    .await;
    app.seed_catalog().await;
    let token = app.token("admin", true);

    let response = app
        .post_json(
            "/api/v1/releases/blasphemous-death-ritual/enrich",
            Some(&token),
            serde_json::json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["mbid"], MBID);
    assert_eq!(body["cover_url"], "https://caa.example/front.jpg");
    assert_eq!(body["country"], "NO");

    let updated = release::Entity::find_by_id("blasphemous-death-ritual")
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.mbid.as_deref(), Some(MBID));
    assert_eq!(updated.cover_url.as_deref(), Some("https://caa.example/front.jpg"));
    assert_eq!(updated.country.as_deref(), Some("NO"));
    assert_eq!(updated.release_date.as_deref(), Some("1994-02-01"));
}

#[tokio::test]
async fn barcode_takes_precedence_in_the_lookup_query() {
    let musicbrainz = MockServer::start().await;
    let coverart = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release/"))
        .and(query_param_contains("query", "barcode:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "releases": [{"id": MBID, "score": 100}]
        })))
        .expect(1)
        .mount(&musicbrainz)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&coverart)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.musicbrainz_api_base = musicbrainz.uri();
        cfg.coverart_api_base = coverart.uri();
    })
    .await;
    app.seed_catalog().await;

    use sea_orm::{ActiveModelTrait, Set};
    let found = release::Entity::find_by_id("blasphemous-death-ritual")
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    let mut model: release::ActiveModel = found.into();
    model.barcode = Set(Some("7350057884263".to_string()));
    model.update(&*app.db).await.unwrap();

    let token = app.token("admin", true);
    let response = app
        .post_json(
            "/api/v1/releases/blasphemous-death-ritual/enrich",
            Some(&token),
            serde_json::json!({}),
        )
        .await;

    // Cover art 404 degrades gracefully; the enrichment still lands.
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["mbid"], MBID);
    assert!(body["cover_url"].is_null());
}

#[tokio::test]
async fn fallback_lookup_uses_the_artist_display_name() {
    let musicbrainz = MockServer::start().await;
    let coverart = MockServer::start().await;

    // Only a query carrying the display name (diacritics and all), not
    // the catalog slug, matches.
    Mock::given(method("GET"))
        .and(path("/release/"))
        .and(query_param_contains("query", "artist:\"Dødsenglen\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "releases": [{"id": MBID, "score": 100}]
        })))
        .expect(1)
        .mount(&musicbrainz)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&coverart)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.musicbrainz_api_base = musicbrainz.uri();
        cfg.coverart_api_base = coverart.uri();
    })
    .await;

    use sea_orm::{ActiveModelTrait, Set};
    let now = chrono::Utc::now();
    artist::ActiveModel {
        id: Set("dodsenglen".to_string()),
        name: Set("Dødsenglen".to_string()),
        country: Set(Some("DK".to_string())),
        bio: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&*app.db)
    .await
    .unwrap();
    release::ActiveModel {
        id: Set("grav-hymner".to_string()),
        title: Set("Grav Hymner".to_string()),
        artist_id: Set("dodsenglen".to_string()),
        label_id: Set(None),
        catalog_number: Set(None),
        barcode: Set(None),
        release_date: Set(None),
        cover_url: Set(None),
        mbid: Set(None),
        country: Set(None),
        description: Set(None),
        is_archived: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&*app.db)
    .await
    .unwrap();

    let token = app.token("admin", true);
    let response = app
        .post_json(
            "/api/v1/releases/grav-hymner/enrich",
            Some(&token),
            serde_json::json!({}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["mbid"], MBID);
}

#[tokio::test]
async fn no_match_is_a_not_found() {
    let musicbrainz = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/release/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"releases": []})),
        )
        .mount(&musicbrainz)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.musicbrainz_api_base = musicbrainz.uri();
    })
    .await;
    app.seed_catalog().await;
    let token = app.token("admin", true);

    let response = app
        .post_json(
            "/api/v1/releases/blasphemous-death-ritual/enrich",
            Some(&token),
            serde_json::json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_enrichment_is_unauthorized() {
    let app = TestApp::spawn().await;
    app.seed_catalog().await;

    let response = app
        .post_json(
            "/api/v1/releases/blasphemous-death-ritual/enrich",
            None,
            serde_json::json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
