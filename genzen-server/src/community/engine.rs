//! Rating and sharing engine
//!
//! Sharing snapshots a meditation into the community catalog; rating upserts
//! a per-(user, meditation) row and recomputes the aggregate inside a single
//! transaction so the rating row, the count, and the mean commit together or
//! not at all. The transaction also serializes recomputation per id; a
//! conflicting writer surfaces as a retryable storage error to the caller.

use crate::error::{Error, Result};
use crate::state::SharedState;
use chrono::{DateTime, Utc};
use genzen_common::events::GenZenEvent;
use genzen_common::model::{CommunityMeditation, MeditationType};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Default page size for the recent listing
pub const RECENT_LIMIT: i64 = 20;
/// Default page size for the popular listing
pub const POPULAR_LIMIT: i64 = 10;

/// Community catalog engine
pub struct CommunityEngine {
    db: SqlitePool,
    state: Arc<SharedState>,
}

impl CommunityEngine {
    pub fn new(db: SqlitePool, state: Arc<SharedState>) -> Self {
        Self { db, state }
    }

    /// Publish a meditation the caller owns into the community catalog
    ///
    /// Title and description default to the original's values when omitted;
    /// type and duration are copied verbatim. Sharing twice deliberately
    /// creates two independent entries.
    pub async fn share(
        &self,
        meditation_id: Uuid,
        caller_id: Uuid,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<CommunityMeditation> {
        let meditation = crate::db::meditations::get_meditation(&self.db, meditation_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("meditation {}", meditation_id)))?;

        if meditation.user_id != caller_id {
            return Err(Error::PermissionDenied(format!(
                "meditation {} is not owned by the caller",
                meditation_id
            )));
        }

        let guid = Uuid::new_v4();
        let created_at = Utc::now();
        let title = title.unwrap_or_else(|| meditation.title.clone());
        let description = description.or_else(|| meditation.description.clone());

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO community_meditations
                (guid, original_meditation_guid, title, description, type, duration, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(guid.to_string())
        .bind(meditation_id.to_string())
        .bind(&title)
        .bind(&description)
        .bind(meditation.meditation_type.as_str())
        .bind(meditation.duration)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE meditations SET is_shared = 1 WHERE guid = ?")
            .bind(meditation_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Shared meditation {} as community entry {}", meditation_id, guid);
        self.state.broadcast_event(GenZenEvent::MeditationShared {
            community_meditation_id: guid,
            original_meditation_id: meditation_id,
            timestamp: created_at,
        });

        Ok(CommunityMeditation {
            id: guid,
            original_meditation_id: meditation_id,
            title,
            description,
            meditation_type: meditation.meditation_type,
            duration: meditation.duration,
            play_count: 0,
            rating: 0.0,
            rating_count: 0,
            created_at,
        })
    }

    /// Submit a rating in [1,5] for a community meditation
    ///
    /// A repeat submission by the same user overwrites the existing row
    /// without changing the rating count.
    pub async fn rate(&self, community_id: Uuid, user_id: Uuid, rating: i64) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(Error::InvalidArgument(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM community_meditations WHERE guid = ?)")
                .bind(community_id.to_string())
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(Error::NotFound(format!(
                "community meditation {}",
                community_id
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO meditation_ratings
                (guid, user_guid, community_meditation_guid, rating, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_guid, community_meditation_guid)
                DO UPDATE SET rating = excluded.rating
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(community_id.to_string())
        .bind(rating)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        // Recompute count and mean from the rating rows in one statement so
        // the aggregate can never drift from the rows it summarizes
        sqlx::query(
            r#"
            UPDATE community_meditations
            SET rating = (SELECT ROUND(AVG(rating), 1) FROM meditation_ratings
                          WHERE community_meditation_guid = ?),
                rating_count = (SELECT COUNT(*) FROM meditation_ratings
                                WHERE community_meditation_guid = ?)
            WHERE guid = ?
            "#,
        )
        .bind(community_id.to_string())
        .bind(community_id.to_string())
        .bind(community_id.to_string())
        .execute(&mut *tx)
        .await?;

        let (aggregate, count): (f64, i64) = sqlx::query_as(
            "SELECT rating, rating_count FROM community_meditations WHERE guid = ?",
        )
        .bind(community_id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.state.broadcast_event(GenZenEvent::MeditationRated {
            community_meditation_id: community_id,
            rating: aggregate,
            rating_count: count,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    /// Most recently shared entries
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<CommunityMeditation>> {
        let rows = sqlx::query(
            "SELECT * FROM community_meditations ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(community_from_row).collect()
    }

    /// Most played entries
    pub async fn list_popular(&self, limit: i64) -> Result<Vec<CommunityMeditation>> {
        let rows = sqlx::query(
            "SELECT * FROM community_meditations ORDER BY play_count DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(community_from_row).collect()
    }

    /// Increment a community entry's play count by exactly one
    ///
    /// Independent from the original meditation's counter: a community play
    /// does not imply an authenticated owner session.
    pub async fn record_play(&self, community_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE community_meditations SET play_count = play_count + 1 WHERE guid = ?",
        )
        .bind(community_id.to_string())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "community meditation {}",
                community_id
            )));
        }
        Ok(())
    }

    /// One user's rating row for one community entry, if any
    pub async fn user_rating(
        &self,
        community_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<i64>> {
        let rating: Option<i64> = sqlx::query_scalar(
            "SELECT rating FROM meditation_ratings \
             WHERE user_guid = ? AND community_meditation_guid = ?",
        )
        .bind(user_id.to_string())
        .bind(community_id.to_string())
        .fetch_optional(&self.db)
        .await?;

        Ok(rating)
    }
}

fn community_from_row(row: &SqliteRow) -> Result<CommunityMeditation> {
    let type_text: String = row.get("type");

    Ok(CommunityMeditation {
        id: crate::db::users::parse_guid(&row.get::<String, _>("guid"))?,
        original_meditation_id: crate::db::users::parse_guid(
            &row.get::<String, _>("original_meditation_guid"),
        )?,
        title: row.get("title"),
        description: row.get("description"),
        meditation_type: MeditationType::from_str(&type_text)
            .map_err(|_| Error::Internal(format!("invalid stored type: {}", type_text)))?,
        duration: row.get("duration"),
        play_count: row.get("play_count"),
        rating: row.get("rating"),
        rating_count: row.get("rating_count"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}
