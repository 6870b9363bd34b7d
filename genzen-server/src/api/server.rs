//! HTTP server setup and routing

use crate::auth::IdentityVerifier;
use crate::community::CommunityEngine;
use crate::generate::ScriptGenerator;
use crate::playback::PlayerEngine;
use crate::state::SharedState;
use axum::routing::{get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application context passed to all handlers
///
/// AppContext implements Clone, which gives us `FromRef<AppContext>` for free
/// via Axum's blanket implementation, so custom extractors can access state.
#[derive(Clone)]
pub struct AppContext {
    pub db: SqlitePool,
    pub state: Arc<SharedState>,
    pub community: Arc<CommunityEngine>,
    pub player: Arc<PlayerEngine>,
    pub generator: Arc<dyn ScriptGenerator>,
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Provider tag recorded on first-seen signup
    pub auth_provider: String,
}

/// Build the application router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Authentication
        .route("/api/auth/user", get(super::handlers::get_current_user))
        .route("/api/auth/preferences", put(super::handlers::update_preferences))
        // Meditation generation
        .route("/api/meditation/generate", post(super::handlers::generate_meditation))
        // Library management
        .route("/api/library/meditations", get(super::handlers::list_library))
        .route(
            "/api/library/meditation/:id",
            get(super::handlers::get_library_meditation).delete(super::handlers::delete_meditation),
        )
        .route(
            "/api/library/meditation/:id/play",
            post(super::handlers::record_library_play),
        )
        .route(
            "/api/library/meditation/:id/favorite",
            put(super::handlers::set_favorite),
        )
        // Community features
        .route("/api/community/meditations", get(super::handlers::list_community))
        .route("/api/community/popular", get(super::handlers::list_popular))
        .route("/api/community/share/:id", post(super::handlers::share_meditation))
        .route("/api/community/rate/:id", post(super::handlers::rate_meditation))
        .route(
            "/api/community/meditation/:id/play",
            post(super::handlers::record_community_play),
        )
        // Player transport
        .route("/api/player/play", post(super::player::play))
        .route("/api/player/pause", post(super::player::pause))
        .route("/api/player/resume", post(super::player::resume))
        .route("/api/player/stop", post(super::player::stop))
        .route("/api/player/seek", post(super::player::seek))
        .route("/api/player/state", get(super::player::player_state))
        // SSE event stream
        .route("/api/events", get(super::sse::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
