//! User database access

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use genzen_common::model::User;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Fields required to create a user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub auth_provider: String,
    pub subject_id: String,
    pub preferences: serde_json::Value,
}

/// Insert a new user and return the stored record
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<User> {
    let guid = Uuid::new_v4();
    let created_at = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (guid, email, name, auth_provider, subject_id, preferences, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(guid.to_string())
    .bind(&new_user.email)
    .bind(&new_user.name)
    .bind(&new_user.auth_provider)
    .bind(&new_user.subject_id)
    .bind(new_user.preferences.to_string())
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(User {
        id: guid,
        email: new_user.email,
        name: new_user.name,
        auth_provider: new_user.auth_provider,
        subject_id: new_user.subject_id,
        meditation_count: 0,
        preferences: new_user.preferences,
        created_at,
    })
}

/// Get user by internal id
pub async fn get_user(pool: &SqlitePool, id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| user_from_row(&r)).transpose()
}

/// Get user by external-auth subject id
pub async fn get_user_by_subject(pool: &SqlitePool, subject_id: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE subject_id = ?")
        .bind(subject_id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| user_from_row(&r)).transpose()
}

/// Replace the user's preference bag and return the updated record
pub async fn update_preferences(
    pool: &SqlitePool,
    id: Uuid,
    preferences: serde_json::Value,
) -> Result<User> {
    let result = sqlx::query("UPDATE users SET preferences = ? WHERE guid = ?")
        .bind(preferences.to_string())
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("user {}", id)));
    }

    get_user(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {}", id)))
}

pub(crate) fn user_from_row(row: &SqliteRow) -> Result<User> {
    let guid: String = row.get("guid");
    let preferences_text: String = row.get("preferences");

    let preferences = serde_json::from_str(&preferences_text).unwrap_or_else(|e| {
        tracing::warn!("User {}: invalid preferences document ({}), using empty", guid, e);
        serde_json::json!({})
    });

    Ok(User {
        id: parse_guid(&guid)?,
        email: row.get("email"),
        name: row.get("name"),
        auth_provider: row.get("auth_provider"),
        subject_id: row.get("subject_id"),
        meditation_count: row.get("meditation_count"),
        preferences,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

pub(crate) fn parse_guid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Internal(format!("invalid guid {}: {}", raw, e)))
}
