//! Meditation library database access
//!
//! Owner checks live in the API layer; this module implements the raw
//! operations, keeping the owner's meditation_count in step with creation
//! and deletion inside one transaction.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use genzen_common::model::{Customization, Meditation, MeditationSettings, MeditationType};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

/// Fields required to create a meditation row
#[derive(Debug, Clone)]
pub struct NewMeditation {
    pub user_id: Uuid,
    pub meditation_type: MeditationType,
    pub title: String,
    pub description: Option<String>,
    pub duration: i64,
    pub script: String,
    pub audio_url: Option<String>,
    pub settings: MeditationSettings,
    pub customization: Option<Customization>,
}

/// Insert a meditation and bump the owner's meditation_count
pub async fn create_meditation(pool: &SqlitePool, new: NewMeditation) -> Result<Meditation> {
    let guid = Uuid::new_v4();
    let created_at = Utc::now();
    let settings_json = serde_json::to_string(&new.settings)
        .map_err(|e| Error::Internal(format!("failed to encode settings: {}", e)))?;
    let customization_json = new
        .customization
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::Internal(format!("failed to encode customization: {}", e)))?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO meditations
            (guid, user_guid, type, title, description, duration, script,
             audio_url, settings, customization, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(guid.to_string())
    .bind(new.user_id.to_string())
    .bind(new.meditation_type.as_str())
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.duration)
    .bind(&new.script)
    .bind(&new.audio_url)
    .bind(&settings_json)
    .bind(&customization_json)
    .bind(created_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET meditation_count = meditation_count + 1 WHERE guid = ?")
        .bind(new.user_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Meditation {
        id: guid,
        user_id: new.user_id,
        meditation_type: new.meditation_type,
        title: new.title,
        description: new.description,
        duration: new.duration,
        script: new.script,
        audio_url: new.audio_url,
        settings: new.settings,
        customization: new.customization,
        play_count: 0,
        is_shared: false,
        is_favorite: false,
        created_at,
    })
}

/// Get meditation by id
pub async fn get_meditation(pool: &SqlitePool, id: Uuid) -> Result<Option<Meditation>> {
    let row = sqlx::query("SELECT * FROM meditations WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| meditation_from_row(&r)).transpose()
}

/// All meditations owned by a user, newest first
pub async fn list_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Meditation>> {
    let rows = sqlx::query(
        "SELECT * FROM meditations WHERE user_guid = ? ORDER BY created_at DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(meditation_from_row).collect()
}

/// Atomically increment a meditation's play count by exactly one
pub async fn increment_play_count(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("UPDATE meditations SET play_count = play_count + 1 WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("meditation {}", id)));
    }
    Ok(())
}

/// Set the favorite flag and return the updated record
pub async fn set_favorite(pool: &SqlitePool, id: Uuid, is_favorite: bool) -> Result<Meditation> {
    let result = sqlx::query("UPDATE meditations SET is_favorite = ? WHERE guid = ?")
        .bind(is_favorite)
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("meditation {}", id)));
    }

    get_meditation(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("meditation {}", id)))
}

/// Delete a meditation and drop the owner's meditation_count
///
/// Community copies derived from the meditation are left untouched.
pub async fn delete_meditation(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    let owner: Option<String> =
        sqlx::query_scalar("SELECT user_guid FROM meditations WHERE guid = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;

    let Some(owner) = owner else {
        return Err(Error::NotFound(format!("meditation {}", id)));
    };

    sqlx::query("DELETE FROM meditations WHERE guid = ?")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE users SET meditation_count = meditation_count - 1 WHERE guid = ?")
        .bind(&owner)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub(crate) fn meditation_from_row(row: &SqliteRow) -> Result<Meditation> {
    let guid: String = row.get("guid");
    let type_text: String = row.get("type");
    let settings_text: String = row.get("settings");
    let customization_text: Option<String> = row.get("customization");

    // Correct invalid stored documents rather than failing the read
    let settings = serde_json::from_str(&settings_text).unwrap_or_else(|e| {
        tracing::warn!("Meditation {}: invalid settings document ({}), using defaults", guid, e);
        MeditationSettings::default()
    });
    let customization = customization_text.and_then(|text| {
        serde_json::from_str(&text)
            .map_err(|e| {
                tracing::warn!("Meditation {}: invalid customization document ({})", guid, e);
            })
            .ok()
    });

    Ok(Meditation {
        id: super::users::parse_guid(&guid)?,
        user_id: super::users::parse_guid(&row.get::<String, _>("user_guid"))?,
        meditation_type: MeditationType::from_str(&type_text)
            .map_err(|_| Error::Internal(format!("invalid stored type: {}", type_text)))?,
        title: row.get("title"),
        description: row.get("description"),
        duration: row.get("duration"),
        script: row.get("script"),
        audio_url: row.get("audio_url"),
        settings,
        customization,
        play_count: row.get("play_count"),
        is_shared: row.get("is_shared"),
        is_favorite: row.get("is_favorite"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}
