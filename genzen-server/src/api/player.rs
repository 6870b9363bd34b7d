//! Player transport handlers
//!
//! HTTP surface over the playback state machine. One session per server;
//! playing while another meditation is active stops it first.

use crate::api::server::AppContext;
use crate::auth::CurrentUser;
use crate::db;
use crate::error::{Error, Result};
use crate::playback::PlayerStatus;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    meditation_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekRequest {
    position_seconds: f64,
}

/// POST /api/player/play - Load and play an owned meditation
pub async fn play(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<PlayRequest>,
) -> Result<Json<PlayerStatus>> {
    let meditation = db::meditations::get_meditation(&ctx.db, req.meditation_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("meditation {}", req.meditation_id)))?;
    if meditation.user_id != user.id {
        return Err(Error::PermissionDenied(format!(
            "meditation {} is not owned by the caller",
            req.meditation_id
        )));
    }

    ctx.player.play(&meditation).await?;
    Ok(Json(ctx.player.status().await))
}

/// POST /api/player/pause
pub async fn pause(
    State(ctx): State<AppContext>,
    _user: CurrentUser,
) -> Result<Json<PlayerStatus>> {
    ctx.player.pause().await;
    Ok(Json(ctx.player.status().await))
}

/// POST /api/player/resume
pub async fn resume(
    State(ctx): State<AppContext>,
    _user: CurrentUser,
) -> Result<Json<PlayerStatus>> {
    ctx.player.resume().await;
    Ok(Json(ctx.player.status().await))
}

/// POST /api/player/stop
pub async fn stop(
    State(ctx): State<AppContext>,
    _user: CurrentUser,
) -> Result<Json<PlayerStatus>> {
    ctx.player.stop().await;
    Ok(Json(ctx.player.status().await))
}

/// POST /api/player/seek - Clamped into [0, duration]
pub async fn seek(
    State(ctx): State<AppContext>,
    _user: CurrentUser,
    Json(req): Json<SeekRequest>,
) -> Result<Json<PlayerStatus>> {
    ctx.player.seek_to(req.position_seconds).await;
    Ok(Json(ctx.player.status().await))
}

/// GET /api/player/state
pub async fn player_state(
    State(ctx): State<AppContext>,
    _user: CurrentUser,
) -> Result<Json<PlayerStatus>> {
    Ok(Json(ctx.player.status().await))
}
