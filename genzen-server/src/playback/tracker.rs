//! Play-count accounting
//!
//! The player engine records exactly one play per logical start through this
//! seam. The write is detached from transport controls: its failure is
//! logged, never retried, and never fails playback.

use crate::error::Result;
use axum::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Records one logical play start for a meditation
#[async_trait]
pub trait PlayTracker: Send + Sync {
    async fn record_play(&self, meditation_id: Uuid) -> Result<()>;
}

/// Tracker writing directly to the library store
pub struct DbPlayTracker {
    db: SqlitePool,
}

impl DbPlayTracker {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlayTracker for DbPlayTracker {
    async fn record_play(&self, meditation_id: Uuid) -> Result<()> {
        crate::db::meditations::increment_play_count(&self.db, meditation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::meditations::{create_meditation, get_meditation, NewMeditation};
    use crate::db::users::{create_user, NewUser};
    use genzen_common::model::{MeditationSettings, MeditationType};
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_db_tracker_increments_play_count() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init::create_tables(&pool).await.unwrap();

        let owner = create_user(
            &pool,
            NewUser {
                email: "o@example.com".to_string(),
                name: "O".to_string(),
                auth_provider: "firebase".to_string(),
                subject_id: "sub-o".to_string(),
                preferences: serde_json::json!({}),
            },
        )
        .await
        .unwrap();

        let meditation = create_meditation(
            &pool,
            NewMeditation {
                user_id: owner.id,
                meditation_type: MeditationType::Mindfulness,
                title: "Mindfulness Meditation".to_string(),
                description: None,
                duration: 10,
                script: "Notice the breath.".to_string(),
                audio_url: None,
                settings: MeditationSettings::default(),
                customization: None,
            },
        )
        .await
        .unwrap();

        let tracker = DbPlayTracker::new(pool.clone());
        tracker.record_play(meditation.id).await.unwrap();

        let fetched = get_meditation(&pool, meditation.id).await.unwrap().unwrap();
        assert_eq!(fetched.play_count, 1);
    }
}
