//! Event types for the GenZen event system
//!
//! Events are broadcast on a tokio channel and serialized for SSE
//! transmission to connected clients.

use crate::model::MeditationType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Player lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    /// No meditation loaded
    Idle,
    /// Resolving audio for a Play request
    Loading,
    Playing,
    Paused,
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerState::Idle => write!(f, "idle"),
            PlayerState::Loading => write!(f, "loading"),
            PlayerState::Playing => write!(f, "playing"),
            PlayerState::Paused => write!(f, "paused"),
        }
    }
}

/// GenZen event types
///
/// Broadcast from the player engine and the community engine; transmitted to
/// clients over the SSE stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GenZenEvent {
    /// Player transitioned between lifecycle states
    PlaybackStateChanged {
        state: PlayerState,
        /// Meditation loaded in the player, None once Idle
        meditation_id: Option<Uuid>,
        timestamp: DateTime<Utc>,
    },

    /// Periodic position report while playing
    ///
    /// Observational only; the meditation's declared duration remains
    /// authoritative.
    PlaybackProgress {
        meditation_id: Uuid,
        position_seconds: f64,
        duration_seconds: f64,
        timestamp: DateTime<Utc>,
    },

    /// A meditation script was generated and saved to the caller's library
    MeditationGenerated {
        meditation_id: Uuid,
        meditation_type: MeditationType,
        timestamp: DateTime<Utc>,
    },

    /// A meditation was published to the community catalog
    MeditationShared {
        community_meditation_id: Uuid,
        original_meditation_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A rating was submitted; carries the recomputed aggregate
    MeditationRated {
        community_meditation_id: Uuid,
        rating: f64,
        rating_count: i64,
        timestamp: DateTime<Utc>,
    },
}

impl GenZenEvent {
    /// SSE event name for this variant
    pub fn event_name(&self) -> &'static str {
        match self {
            GenZenEvent::PlaybackStateChanged { .. } => "playback_state_changed",
            GenZenEvent::PlaybackProgress { .. } => "playback_progress",
            GenZenEvent::MeditationGenerated { .. } => "meditation_generated",
            GenZenEvent::MeditationShared { .. } => "meditation_shared",
            GenZenEvent::MeditationRated { .. } => "meditation_rated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_tags_variant() {
        let event = GenZenEvent::PlaybackStateChanged {
            state: PlayerState::Playing,
            meditation_id: Some(Uuid::new_v4()),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PlaybackStateChanged");
        assert_eq!(json["state"], "playing");
    }

    #[test]
    fn test_player_state_display() {
        assert_eq!(PlayerState::Idle.to_string(), "idle");
        assert_eq!(PlayerState::Loading.to_string(), "loading");
    }
}
