//! Voice inventory and selection
//!
//! Installed narration voices are matched against the requested male/female
//! choice by name heuristics, with US English as the female fallback.

use genzen_common::model::Voice;

/// One installed narration voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceProfile {
    pub name: String,
    /// BCP 47 language tag
    pub lang: String,
}

impl VoiceProfile {
    pub fn new(name: &str, lang: &str) -> Self {
        Self {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }
}

/// Voices shipped with the local synthesis engine
pub fn default_inventory() -> Vec<VoiceProfile> {
    vec![
        VoiceProfile::new("Samantha", "en-US"),
        VoiceProfile::new("Alex", "en-US"),
        VoiceProfile::new("Karen", "en-AU"),
        VoiceProfile::new("David", "en-GB"),
    ]
}

/// Pick the first installed voice matching the requested choice
pub fn select_voice(choice: Voice, inventory: &[VoiceProfile]) -> Option<&VoiceProfile> {
    inventory.iter().find(|profile| {
        let name = profile.name.to_lowercase();
        match choice {
            Voice::Male => {
                name.contains("david")
                    || name.contains("alex")
                    || (name.contains("male") && !name.contains("female"))
            }
            Voice::Female => {
                name.contains("samantha")
                    || name.contains("karen")
                    || name.contains("female")
                    || profile.lang == "en-US"
            }
        }
    })
}
