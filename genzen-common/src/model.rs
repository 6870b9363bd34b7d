//! Domain models and fixed enumerations
//!
//! Record layouts match the persisted JSON documents: camelCase field names,
//! `settings` and `customization` carried as structured documents rather than
//! normalized columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Meditation content category, controls script-generation prompting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeditationType {
    Manifestation,
    Relaxation,
    Sleep,
    Visualization,
    Affirmations,
    Mindfulness,
}

impl MeditationType {
    pub const ALL: [MeditationType; 6] = [
        MeditationType::Manifestation,
        MeditationType::Relaxation,
        MeditationType::Sleep,
        MeditationType::Visualization,
        MeditationType::Affirmations,
        MeditationType::Mindfulness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeditationType::Manifestation => "manifestation",
            MeditationType::Relaxation => "relaxation",
            MeditationType::Sleep => "sleep",
            MeditationType::Visualization => "visualization",
            MeditationType::Affirmations => "affirmations",
            MeditationType::Mindfulness => "mindfulness",
        }
    }

    /// Default title for a freshly generated meditation ("Sleep Meditation")
    pub fn default_title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        };
        format!("{} Meditation", capitalized)
    }

    /// Accent color pair (background/foreground) for type badges
    pub fn accent_color(&self) -> &'static str {
        match self {
            MeditationType::Manifestation => "bg-purple-500/20 text-purple-400",
            MeditationType::Relaxation => "bg-blue-500/20 text-blue-400",
            MeditationType::Sleep => "bg-indigo-500/20 text-indigo-400",
            MeditationType::Visualization => "bg-emerald-500/20 text-emerald-400",
            MeditationType::Affirmations => "bg-amber-500/20 text-amber-400",
            MeditationType::Mindfulness => "bg-rose-500/20 text-rose-400",
        }
    }
}

/// Accent color for a raw type string; unknown keys get the grey default
pub fn accent_color_for(type_name: &str) -> &'static str {
    match type_name.parse::<MeditationType>() {
        Ok(kind) => kind.accent_color(),
        Err(_) => "bg-gray-500/20 text-gray-400",
    }
}

impl std::str::FromStr for MeditationType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manifestation" => Ok(MeditationType::Manifestation),
            "relaxation" => Ok(MeditationType::Relaxation),
            "sleep" => Ok(MeditationType::Sleep),
            "visualization" => Ok(MeditationType::Visualization),
            "affirmations" => Ok(MeditationType::Affirmations),
            "mindfulness" => Ok(MeditationType::Mindfulness),
            other => Err(crate::Error::InvalidArgument(format!(
                "unknown meditation type: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for MeditationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Narration voice choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Male,
    #[default]
    Female,
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Voice::Male => write!(f, "male"),
            Voice::Female => write!(f, "female"),
        }
    }
}

/// Ambient loop played alongside narration
///
/// `Silence` is the sentinel meaning no background track at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSound {
    #[default]
    OceanWaves,
    ForestSounds,
    Rain,
    WhiteNoise,
    AmbientMusic,
    Silence,
}

impl BackgroundSound {
    pub fn is_silence(&self) -> bool {
        matches!(self, BackgroundSound::Silence)
    }

    /// Asset path of the looping track; None for the silence sentinel
    pub fn asset_path(&self) -> Option<&'static str> {
        match self {
            BackgroundSound::OceanWaves => Some("/sounds/ocean_waves.mp3"),
            BackgroundSound::ForestSounds => Some("/sounds/forest_sounds.mp3"),
            BackgroundSound::Rain => Some("/sounds/rain.mp3"),
            BackgroundSound::WhiteNoise => Some("/sounds/white_noise.mp3"),
            BackgroundSound::AmbientMusic => Some("/sounds/ambient_music.mp3"),
            BackgroundSound::Silence => None,
        }
    }
}

/// Visual environment shown behind the player
///
/// Deserialization never fails: an unknown key falls back to the beach
/// default, preserving the defined-fallback behavior for stored settings
/// documents written by older clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualEnvironment {
    #[default]
    Beach,
    Mountains,
    Forest,
}

impl VisualEnvironment {
    pub fn image_url(&self) -> &'static str {
        match self {
            VisualEnvironment::Beach => {
                "https://images.unsplash.com/photo-1507525428034-b723cf961d3e?w=1920&h=1080&fit=crop"
            }
            VisualEnvironment::Mountains => {
                "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=1920&h=1080&fit=crop"
            }
            VisualEnvironment::Forest => {
                "https://images.unsplash.com/photo-1441974231531-c6227db76b6e?w=1920&h=1080&fit=crop"
            }
        }
    }
}

impl<'de> Deserialize<'de> for VisualEnvironment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "beach" => VisualEnvironment::Beach,
            "mountains" => VisualEnvironment::Mountains,
            "forest" => VisualEnvironment::Forest,
            _ => VisualEnvironment::default(),
        })
    }
}

/// Per-meditation playback preferences, stored as an opaque JSON document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationSettings {
    #[serde(default)]
    pub voice: Voice,
    #[serde(default)]
    pub background: BackgroundSound,
    #[serde(default)]
    pub visual: VisualEnvironment,
}

/// User-specific goals and focus areas folded into the generation prompt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_situation: Option<String>,
}

impl Customization {
    pub fn is_empty(&self) -> bool {
        self.goals.is_none()
            && self.timeline.is_none()
            && self.category.is_none()
            && self.current_situation.is_none()
    }
}

/// Account record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// External identity provider tag ('google', 'apple', 'email')
    pub auth_provider: String,
    /// Subject id assigned by the identity provider
    pub subject_id: String,
    pub meditation_count: i64,
    /// Free-form preference bag
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A generated meditation owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meditation {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub meditation_type: MeditationType,
    pub title: String,
    pub description: Option<String>,
    /// Declared duration in minutes (the authoritative duration)
    pub duration: i64,
    pub script: String,
    pub audio_url: Option<String>,
    pub settings: MeditationSettings,
    pub customization: Option<Customization>,
    pub play_count: i64,
    pub is_shared: bool,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

/// Published projection of a meditation, independently tracked
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMeditation {
    pub id: Uuid,
    /// Back-reference only; the original may be deleted independently
    pub original_meditation_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub meditation_type: MeditationType,
    pub duration: i64,
    pub play_count: i64,
    /// Arithmetic mean of all ratings, rounded to one decimal; 0 when unrated
    pub rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One user's rating of one community meditation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeditationRating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub community_meditation_id: Uuid,
    /// Integer stars in [1,5]
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}
