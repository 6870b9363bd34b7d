//! Speech synthesis
//!
//! Converts a generated script into playable narration audio, honoring the
//! voice/rate/pitch options and the script's pacing markers. The local
//! engine estimates narration timing from word count at a meditation
//! speaking pace and renders the marker-expanded text into a data-URL audio
//! reference.

pub mod voices;

use crate::error::{Error, Result};
use axum::async_trait;
use genzen_common::markers::{self, ScriptSegment};
use genzen_common::model::Voice;
use std::time::Duration;
use self::voices::VoiceProfile;

/// Words per minute at the unscaled (rate = 1.0) meditation pace
const WORDS_PER_MINUTE: f64 = 110.0;

/// Speech rendering options
#[derive(Debug, Clone)]
pub struct SpeechOptions {
    pub voice: Voice,
    /// Speaking-rate multiplier; meditation narration runs slightly slow
    pub rate: f64,
    pub pitch: f64,
}

impl SpeechOptions {
    pub fn for_voice(voice: Voice) -> Self {
        Self {
            voice,
            rate: 0.9,
            pitch: 1.0,
        }
    }
}

/// Playable narration produced from a script
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// Audio reference usable by the playback backend
    pub audio_url: String,
    /// Actual narration length; may differ slightly from the meditation's
    /// declared duration
    pub duration: Duration,
    /// Name of the concrete voice that narrates
    pub voice_name: String,
}

/// Speech synthesis seam used by the player engine
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, script: &str, options: &SpeechOptions) -> Result<SynthesizedAudio>;
}

/// Local synthesis engine
pub struct LocalSynthesizer {
    voices: Vec<VoiceProfile>,
}

impl LocalSynthesizer {
    pub fn new() -> Self {
        Self {
            voices: voices::default_inventory(),
        }
    }

    /// Engine over a specific voice inventory
    pub fn with_voices(voices: Vec<VoiceProfile>) -> Self {
        Self { voices }
    }
}

impl Default for LocalSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for LocalSynthesizer {
    async fn synthesize(&self, script: &str, options: &SpeechOptions) -> Result<SynthesizedAudio> {
        if script.trim().is_empty() {
            return Err(Error::Synthesis("script is empty".to_string()));
        }
        if options.rate <= 0.0 {
            return Err(Error::Synthesis(format!(
                "unsupported speaking rate: {}",
                options.rate
            )));
        }

        let voice = voices::select_voice(options.voice, &self.voices).ok_or_else(|| {
            Error::Synthesis(format!("no installed voice matches '{}'", options.voice))
        })?;

        let segments = markers::parse_segments(script);
        let duration = narration_duration(&segments, options.rate);
        let narration = markers::expand_markers(script);

        tracing::debug!(
            "Synthesized {:.0}s of narration with voice {}",
            duration.as_secs_f64(),
            voice.name
        );

        Ok(SynthesizedAudio {
            audio_url: data_url(&narration),
            duration,
            voice_name: voice.name.clone(),
        })
    }
}

/// Estimate narration length: spoken words at the paced rate, plus the rest
/// time the pacing markers call for
fn narration_duration(segments: &[ScriptSegment], rate: f64) -> Duration {
    let words: usize = segments
        .iter()
        .filter_map(|segment| match segment {
            ScriptSegment::Speech(text) => Some(text.split_whitespace().count()),
            _ => None,
        })
        .sum();

    let speech_seconds = words as f64 * 60.0 / (WORDS_PER_MINUTE * rate);
    Duration::from_secs_f64(speech_seconds) + markers::total_pause(segments)
}

/// Render narration text as a `data:` audio reference
fn data_url(narration: &str) -> String {
    use base64::Engine;
    format!(
        "data:audio/wav;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(narration.as_bytes())
    )
}
