//! HTTP request handlers
//!
//! Implements the REST endpoints for generation, library management, and the
//! community catalog.

use crate::api::server::AppContext;
use crate::auth::CurrentUser;
use crate::community::{POPULAR_LIMIT, RECENT_LIMIT};
use crate::db;
use crate::error::{Error, Result};
use crate::generate::GenerationRequest;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use genzen_common::events::GenZenEvent;
use genzen_common::model::{
    CommunityMeditation, Customization, Meditation, MeditationSettings, MeditationType, User,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    success: bool,
}

impl SuccessResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    preferences: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(rename = "type")]
    meditation_type: Option<String>,
    duration: Option<i64>,
    #[serde(default)]
    customization: Option<Customization>,
    #[serde(default)]
    settings: Option<MeditationSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    is_favorite: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShareRequest {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    rating: Option<i64>,
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "genzen-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Authentication Endpoints
// ============================================================================

/// GET /api/auth/user - The verified caller's record
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// PUT /api/auth/preferences - Replace the caller's preference bag
pub async fn update_preferences(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<PreferencesRequest>,
) -> Result<Json<User>> {
    let updated = db::users::update_preferences(&ctx.db, user.id, req.preferences).await?;
    Ok(Json(updated))
}

// ============================================================================
// Meditation Generation
// ============================================================================

/// POST /api/meditation/generate - Generate a script and save the meditation
pub async fn generate_meditation(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Meditation>> {
    let (Some(type_name), Some(duration)) = (req.meditation_type, req.duration) else {
        return Err(Error::InvalidArgument(
            "Type and duration are required".to_string(),
        ));
    };
    let meditation_type = MeditationType::from_str(&type_name)?;
    if duration < 1 {
        return Err(Error::InvalidArgument(
            "Duration must be a positive number of minutes".to_string(),
        ));
    }

    let script = ctx
        .generator
        .generate(&GenerationRequest {
            meditation_type,
            duration,
            customization: req.customization.clone(),
        })
        .await?;

    let description = req
        .customization
        .as_ref()
        .and_then(|c| c.goals.clone())
        .unwrap_or_else(|| format!("A personalized {} meditation", meditation_type));

    let meditation = db::meditations::create_meditation(
        &ctx.db,
        db::meditations::NewMeditation {
            user_id: user.id,
            meditation_type,
            title: meditation_type.default_title(),
            description: Some(description),
            duration,
            script,
            audio_url: None,
            settings: req.settings.unwrap_or_default(),
            customization: req.customization,
        },
    )
    .await?;

    info!("Generated {} meditation {} for user {}", meditation_type, meditation.id, user.id);
    ctx.state.broadcast_event(GenZenEvent::MeditationGenerated {
        meditation_id: meditation.id,
        meditation_type,
        timestamp: Utc::now(),
    });

    Ok(Json(meditation))
}

// ============================================================================
// Library Endpoints
// ============================================================================

/// GET /api/library/meditations - The caller's meditations, newest first
pub async fn list_library(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Meditation>>> {
    let meditations = db::meditations::list_for_user(&ctx.db, user.id).await?;
    Ok(Json(meditations))
}

/// GET /api/library/meditation/:id - One meditation the caller owns
pub async fn get_library_meditation(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Meditation>> {
    let meditation = fetch_owned(&ctx, id, user.id).await?;
    Ok(Json(meditation))
}

/// POST /api/library/meditation/:id/play - Record one play of an owned meditation
pub async fn record_library_play(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>> {
    fetch_owned(&ctx, id, user.id).await?;
    db::meditations::increment_play_count(&ctx.db, id).await?;
    Ok(SuccessResponse::ok())
}

/// PUT /api/library/meditation/:id/favorite - Set the favorite flag
pub async fn set_favorite(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<FavoriteRequest>,
) -> Result<Json<Meditation>> {
    fetch_owned(&ctx, id, user.id).await?;
    let updated = db::meditations::set_favorite(&ctx.db, id, req.is_favorite).await?;
    Ok(Json(updated))
}

/// DELETE /api/library/meditation/:id - Delete an owned meditation
///
/// Community copies derived from it persist.
pub async fn delete_meditation(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>> {
    fetch_owned(&ctx, id, user.id).await?;
    db::meditations::delete_meditation(&ctx.db, id).await?;
    Ok(SuccessResponse::ok())
}

// ============================================================================
// Community Endpoints
// ============================================================================

/// GET /api/community/meditations - Recently shared entries
pub async fn list_community(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<CommunityMeditation>>> {
    let meditations = ctx.community.list_recent(RECENT_LIMIT).await?;
    Ok(Json(meditations))
}

/// GET /api/community/popular - Most played entries
pub async fn list_popular(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<CommunityMeditation>>> {
    let meditations = ctx.community.list_popular(POPULAR_LIMIT).await?;
    Ok(Json(meditations))
}

/// POST /api/community/share/:id - Publish an owned meditation
pub async fn share_meditation(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    body: Option<Json<ShareRequest>>,
) -> Result<Json<CommunityMeditation>> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let shared = ctx.community.share(id, user.id, req.title, req.description).await?;
    Ok(Json(shared))
}

/// POST /api/community/rate/:id - Submit a rating in [1,5]
pub async fn rate_meditation(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RateRequest>,
) -> Result<Json<SuccessResponse>> {
    let rating = req.rating.ok_or_else(|| {
        Error::InvalidArgument("Rating must be between 1 and 5".to_string())
    })?;
    ctx.community.rate(id, user.id, rating).await?;
    Ok(SuccessResponse::ok())
}

/// POST /api/community/meditation/:id/play - Record one community play
///
/// Unauthenticated: a community play does not imply an owner session.
pub async fn record_community_play(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>> {
    ctx.community.record_play(id).await?;
    Ok(SuccessResponse::ok())
}

// ============================================================================
// Helpers
// ============================================================================

/// Load a meditation and check the caller owns it
async fn fetch_owned(ctx: &AppContext, id: Uuid, caller: Uuid) -> Result<Meditation> {
    let meditation = db::meditations::get_meditation(&ctx.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("meditation {}", id)))?;
    if meditation.user_id != caller {
        return Err(Error::PermissionDenied(format!(
            "meditation {} is not owned by the caller",
            id
        )));
    }
    Ok(meditation)
}
