//! Integration tests for the GenZen API
//!
//! Exercises the complete API surface through the router: authentication,
//! generation, library management, community sharing/rating, and the player
//! transport. External collaborators (identity provider, script generator)
//! are replaced with fakes behind their trait seams.

use axum::async_trait;
use axum::http::StatusCode;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

use genzen_server::api::{create_router, AppContext};
use genzen_server::auth::{IdentityVerifier, VerifiedIdentity};
use genzen_server::community::CommunityEngine;
use genzen_server::error::{Error, Result};
use genzen_server::generate::{GenerationRequest, ScriptGenerator};
use genzen_server::playback::{ClockBackend, DbPlayTracker, PlayerEngine};
use genzen_server::state::SharedState;
use genzen_server::synth::LocalSynthesizer;

/// Verifier accepting tokens of the form "token-<tag>"
struct StaticVerifier;

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
        let tag = token
            .strip_prefix("token-")
            .ok_or_else(|| Error::Unauthenticated("Invalid token".to_string()))?;
        Ok(VerifiedIdentity {
            subject: format!("sub-{}", tag),
            email: Some(format!("{}@example.com", tag)),
            name: Some(tag.to_string()),
        })
    }
}

/// Generator returning a short scripted meditation
struct FakeGenerator {
    fail: bool,
}

#[async_trait]
impl ScriptGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        if self.fail {
            return Err(Error::Generation("upstream unavailable".to_string()));
        }
        Ok(format!(
            "Welcome to your {} meditation. [PAUSE 3] Breathe gently. [BREATHE] Rest here.",
            request.meditation_type
        ))
    }
}

async fn setup_test_app(failing_generator: bool) -> axum::Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    genzen_server::db::init::create_tables(&pool)
        .await
        .expect("Failed to create tables");

    let state = Arc::new(SharedState::new());
    let community = Arc::new(CommunityEngine::new(pool.clone(), Arc::clone(&state)));
    let player = Arc::new(PlayerEngine::new(
        Arc::new(LocalSynthesizer::new()),
        Arc::new(ClockBackend),
        Arc::new(DbPlayTracker::new(pool.clone())),
        Arc::clone(&state),
    ));

    let ctx = AppContext {
        db: pool,
        state,
        community,
        player,
        generator: Arc::new(FakeGenerator {
            fail: failing_generator,
        }),
        verifier: Arc::new(StaticVerifier),
        auth_provider: "firebase".to_string(),
    };

    create_router(ctx)
}

/// Helper to make HTTP requests against the test router
async fn make_request(
    app: &axum::Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    use axum::body::Body;
    use http::{Method, Request};
    use tower::ServiceExt;

    let method = match method {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        _ => panic!("Unsupported method"),
    };

    let mut request = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }

    let request = if let Some(json_body) = body {
        request
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap()
    } else {
        request.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_body = if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(&bytes).ok()
    };

    (status, json_body)
}

/// Generate a meditation for the given user token and return its record
async fn generate_meditation(app: &axum::Router, token: &str, kind: &str) -> Value {
    let (status, body) = make_request(
        app,
        "POST",
        "/api/meditation/generate",
        Some(token),
        Some(json!({"type": kind, "duration": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body.expect("Expected meditation body")
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_app(false).await;
    let (status, body) = make_request(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "genzen-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let app = setup_test_app(false).await;
    let (status, _) = make_request(&app, "GET", "/api/library/meditations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        make_request(&app, "GET", "/api/library/meditations", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_first_request_signs_up_user() {
    let app = setup_test_app(false).await;

    let (status, body) =
        make_request(&app, "GET", "/api/auth/user", Some("token-amy"), None).await;
    assert_eq!(status, StatusCode::OK);
    let first = body.unwrap();
    assert_eq!(first["email"], "amy@example.com");
    assert_eq!(first["authProvider"], "firebase");
    assert_eq!(first["meditationCount"], 0);

    // Second request resolves the same user
    let (_, body) = make_request(&app, "GET", "/api/auth/user", Some("token-amy"), None).await;
    assert_eq!(body.unwrap()["id"], first["id"]);
}

#[tokio::test]
async fn test_update_preferences() {
    let app = setup_test_app(false).await;

    let (status, body) = make_request(
        &app,
        "PUT",
        "/api/auth/preferences",
        Some("token-amy"),
        Some(json!({"preferences": {"defaultVoice": "male"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["preferences"]["defaultVoice"], "male");
}

#[tokio::test]
async fn test_generate_requires_type_and_duration() {
    let app = setup_test_app(false).await;

    let (status, _) = make_request(
        &app,
        "POST",
        "/api/meditation/generate",
        Some("token-amy"),
        Some(json!({"duration": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = make_request(
        &app,
        "POST",
        "/api/meditation/generate",
        Some("token-amy"),
        Some(json!({"type": "yoga", "duration": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_creates_meditation() {
    let app = setup_test_app(false).await;

    let meditation = generate_meditation(&app, "token-amy", "sleep").await;
    assert_eq!(meditation["type"], "sleep");
    assert_eq!(meditation["title"], "Sleep Meditation");
    assert_eq!(meditation["duration"], 10);
    assert_eq!(meditation["playCount"], 0);
    assert_eq!(meditation["isShared"], false);
    assert!(meditation["script"].as_str().unwrap().contains("[PAUSE 3]"));
    // Settings default when the request omits them
    assert_eq!(meditation["settings"]["voice"], "female");
    assert_eq!(meditation["settings"]["background"], "ocean_waves");

    // Owner count reflects the new meditation
    let (_, body) = make_request(&app, "GET", "/api/auth/user", Some("token-amy"), None).await;
    assert_eq!(body.unwrap()["meditationCount"], 1);
}

#[tokio::test]
async fn test_generation_failure_is_internal_error() {
    let app = setup_test_app(true).await;

    let (status, _) = make_request(
        &app,
        "POST",
        "/api/meditation/generate",
        Some("token-amy"),
        Some(json!({"type": "sleep", "duration": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_library_listing_and_ownership() {
    let app = setup_test_app(false).await;

    let meditation = generate_meditation(&app, "token-amy", "relaxation").await;
    let id = meditation["id"].as_str().unwrap().to_string();

    let (status, body) =
        make_request(&app, "GET", "/api/library/meditations", Some("token-amy"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().as_array().unwrap().len(), 1);

    // Another user's library is empty and cannot reach amy's meditation
    let (_, body) =
        make_request(&app, "GET", "/api/library/meditations", Some("token-ben"), None).await;
    assert!(body.unwrap().as_array().unwrap().is_empty());

    let path = format!("/api/library/meditation/{}", id);
    let (status, _) = make_request(&app, "GET", &path, Some("token-ben"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = make_request(
        &app,
        "GET",
        "/api/library/meditation/00000000-0000-0000-0000-000000000000",
        Some("token-amy"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_library_play_count() {
    let app = setup_test_app(false).await;
    let meditation = generate_meditation(&app, "token-amy", "mindfulness").await;
    let id = meditation["id"].as_str().unwrap().to_string();

    let play_path = format!("/api/library/meditation/{}/play", id);
    let (status, body) = make_request(&app, "POST", &play_path, Some("token-amy"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["success"], true);

    let (status, _) = make_request(&app, "POST", &play_path, Some("token-ben"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = make_request(
        &app,
        "GET",
        &format!("/api/library/meditation/{}", id),
        Some("token-amy"),
        None,
    )
    .await;
    assert_eq!(body.unwrap()["playCount"], 1);
}

#[tokio::test]
async fn test_favorite_flag() {
    let app = setup_test_app(false).await;
    let meditation = generate_meditation(&app, "token-amy", "affirmations").await;
    let id = meditation["id"].as_str().unwrap().to_string();

    let (status, body) = make_request(
        &app,
        "PUT",
        &format!("/api/library/meditation/{}/favorite", id),
        Some("token-amy"),
        Some(json!({"isFavorite": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["isFavorite"], true);
}

#[tokio::test]
async fn test_delete_keeps_community_copy() {
    let app = setup_test_app(false).await;
    let meditation = generate_meditation(&app, "token-amy", "sleep").await;
    let id = meditation["id"].as_str().unwrap().to_string();

    let (status, _) = make_request(
        &app,
        "POST",
        &format!("/api/community/share/{}", id),
        Some("token-amy"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = make_request(
        &app,
        "DELETE",
        &format!("/api/library/meditation/{}", id),
        Some("token-amy"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["success"], true);

    let (_, body) =
        make_request(&app, "GET", "/api/library/meditations", Some("token-amy"), None).await;
    assert!(body.unwrap().as_array().unwrap().is_empty());

    // The community projection persists independently
    let (_, body) = make_request(&app, "GET", "/api/community/meditations", None, None).await;
    let listed = body.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["originalMeditationId"], id.as_str());
}

#[tokio::test]
async fn test_share_defaults_and_permissions() {
    let app = setup_test_app(false).await;
    let meditation = generate_meditation(&app, "token-amy", "sleep").await;
    let id = meditation["id"].as_str().unwrap().to_string();

    // A stranger cannot share amy's meditation
    let (status, _) = make_request(
        &app,
        "POST",
        &format!("/api/community/share/{}", id),
        Some("token-ben"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, body) = make_request(&app, "GET", "/api/community/meditations", None, None).await;
    assert!(body.unwrap().as_array().unwrap().is_empty());

    // Owner share without overrides copies the original's fields
    let (status, body) = make_request(
        &app,
        "POST",
        &format!("/api/community/share/{}", id),
        Some("token-amy"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let shared = body.unwrap();
    assert_eq!(shared["title"], "Sleep Meditation");
    assert_eq!(shared["type"], "sleep");
    assert_eq!(shared["duration"], 10);
    assert_eq!(shared["rating"], 0.0);
    assert_eq!(shared["ratingCount"], 0);
    assert_eq!(shared["playCount"], 0);

    // The original is now flagged shared
    let (_, body) = make_request(
        &app,
        "GET",
        &format!("/api/library/meditation/{}", id),
        Some("token-amy"),
        None,
    )
    .await;
    assert_eq!(body.unwrap()["isShared"], true);

    // Title override applies
    let (_, body) = make_request(
        &app,
        "POST",
        &format!("/api/community/share/{}", id),
        Some("token-amy"),
        Some(json!({"title": "Drift Away"})),
    )
    .await;
    assert_eq!(body.unwrap()["title"], "Drift Away");
}

#[tokio::test]
async fn test_rating_flow() {
    let app = setup_test_app(false).await;
    let meditation = generate_meditation(&app, "token-amy", "visualization").await;
    let id = meditation["id"].as_str().unwrap().to_string();

    let (_, body) = make_request(
        &app,
        "POST",
        &format!("/api/community/share/{}", id),
        Some("token-amy"),
        None,
    )
    .await;
    let community_id = body.unwrap()["id"].as_str().unwrap().to_string();
    let rate_path = format!("/api/community/rate/{}", community_id);

    // Out-of-range ratings are rejected and change nothing
    for invalid in [0, 6] {
        let (status, _) = make_request(
            &app,
            "POST",
            &rate_path,
            Some("token-amy"),
            Some(json!({"rating": invalid})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    let (status, _) =
        make_request(&app, "POST", &rate_path, Some("token-amy"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Three distinct raters: aggregate is the rounded mean
    for (token, stars) in [("token-amy", 3), ("token-ben", 4), ("token-cal", 5)] {
        let (status, body) = make_request(
            &app,
            "POST",
            &rate_path,
            Some(token),
            Some(json!({"rating": stars})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["success"], true);
    }

    let (_, body) = make_request(&app, "GET", "/api/community/meditations", None, None).await;
    let listed = body.unwrap();
    assert_eq!(listed[0]["rating"], 4.0);
    assert_eq!(listed[0]["ratingCount"], 3);

    // Re-rating replaces the caller's value without growing the count
    let (_, _) = make_request(
        &app,
        "POST",
        &rate_path,
        Some("token-amy"),
        Some(json!({"rating": 5})),
    )
    .await;
    let (_, body) = make_request(&app, "GET", "/api/community/meditations", None, None).await;
    let listed = body.unwrap();
    assert_eq!(listed[0]["rating"], 4.7);
    assert_eq!(listed[0]["ratingCount"], 3);
}

#[tokio::test]
async fn test_community_play_and_popular() {
    let app = setup_test_app(false).await;
    let first = generate_meditation(&app, "token-amy", "sleep").await;
    let second = generate_meditation(&app, "token-amy", "relaxation").await;

    let mut community_ids = Vec::new();
    for meditation in [&first, &second] {
        let id = meditation["id"].as_str().unwrap();
        let (_, body) = make_request(
            &app,
            "POST",
            &format!("/api/community/share/{}", id),
            Some("token-amy"),
            None,
        )
        .await;
        community_ids.push(body.unwrap()["id"].as_str().unwrap().to_string());
    }

    // Community plays require no authentication
    let play_path = format!("/api/community/meditation/{}/play", community_ids[0]);
    for _ in 0..2 {
        let (status, body) = make_request(&app, "POST", &play_path, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["success"], true);
    }

    let (status, _) = make_request(
        &app,
        "POST",
        "/api/community/meditation/00000000-0000-0000-0000-000000000000/play",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Popular listing leads with the played entry
    let (_, body) = make_request(&app, "GET", "/api/community/popular", None, None).await;
    let popular = body.unwrap();
    assert_eq!(popular[0]["id"], community_ids[0].as_str());
    assert_eq!(popular[0]["playCount"], 2);

    // The original library meditation's counter stays untouched
    let (_, body) = make_request(
        &app,
        "GET",
        &format!("/api/library/meditation/{}", first["id"].as_str().unwrap()),
        Some("token-amy"),
        None,
    )
    .await;
    assert_eq!(body.unwrap()["playCount"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_player_transport() {
    let app = setup_test_app(false).await;
    let meditation = generate_meditation(&app, "token-amy", "relaxation").await;
    let id = meditation["id"].as_str().unwrap().to_string();

    // A stranger cannot drive someone else's meditation
    let (status, _) = make_request(
        &app,
        "POST",
        "/api/player/play",
        Some("token-ben"),
        Some(json!({"meditationId": id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = make_request(
        &app,
        "POST",
        "/api/player/play",
        Some("token-amy"),
        Some(json!({"meditationId": id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let status_body = body.unwrap();
    assert_eq!(status_body["state"], "playing");
    assert_eq!(status_body["meditationId"], id.as_str());

    let (_, body) = make_request(&app, "POST", "/api/player/pause", Some("token-amy"), None).await;
    assert_eq!(body.unwrap()["state"], "paused");

    let (_, body) = make_request(&app, "POST", "/api/player/resume", Some("token-amy"), None).await;
    assert_eq!(body.unwrap()["state"], "playing");

    // Seek clamps out-of-range targets
    let (_, body) = make_request(
        &app,
        "POST",
        "/api/player/seek",
        Some("token-amy"),
        Some(json!({"positionSeconds": -5.0})),
    )
    .await;
    assert_eq!(body.unwrap()["positionSeconds"], 0.0);

    let (_, body) = make_request(&app, "POST", "/api/player/stop", Some("token-amy"), None).await;
    let stopped = body.unwrap();
    assert_eq!(stopped["state"], "idle");
    assert_eq!(stopped["positionSeconds"], 0.0);

    // The play start was recorded exactly once
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let (_, body) = make_request(
        &app,
        "GET",
        &format!("/api/library/meditation/{}", id),
        Some("token-amy"),
        None,
    )
    .await;
    assert_eq!(body.unwrap()["playCount"], 1);
}
