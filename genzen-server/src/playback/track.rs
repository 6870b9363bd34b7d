//! Audio track handles
//!
//! The player engine drives tracks through the `AudioBackend` seam. The
//! shipped `ClockBackend` advances positions with wall time, the server-side
//! analogue of an audio element: narration length is known from synthesis,
//! so progression is clock-driven. Decoding and device output are outside
//! this subsystem.

use crate::error::Result;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Reduced volume for the looping background track
pub const BACKGROUND_VOLUME: f32 = 0.3;

/// Nominal loop length for ambient background assets
const BACKGROUND_LOOP: Duration = Duration::from_secs(60);

/// Resolved audio ready for playback
#[derive(Debug, Clone)]
pub struct AudioSource {
    /// Audio reference (data URL or asset path)
    pub url: String,
    pub duration: Duration,
}

/// Per-track playback options
#[derive(Debug, Clone, Copy)]
pub struct TrackOptions {
    pub looping: bool,
    pub volume: f32,
}

impl TrackOptions {
    /// Primary narration track: plays once at full volume
    pub fn narration() -> Self {
        Self {
            looping: false,
            volume: 1.0,
        }
    }

    /// Background ambience: loops at reduced volume
    pub fn background() -> Self {
        Self {
            looping: true,
            volume: BACKGROUND_VOLUME,
        }
    }
}

/// Transport control over one playing track
pub trait TrackHandle: Send + Sync {
    fn pause(&self);
    fn resume(&self);
    /// Halt and reset position to zero
    fn stop(&self);
    fn seek(&self, position: Duration);
    /// Best-effort current position
    fn position(&self) -> Duration;
    fn duration(&self) -> Duration;
    /// True once a non-looping track has played through
    fn is_finished(&self) -> bool;
}

/// Creates playing tracks from resolved audio
pub trait AudioBackend: Send + Sync {
    fn start_track(&self, source: &AudioSource, options: TrackOptions) -> Result<Box<dyn TrackHandle>>;
}

/// Clock-driven audio backend
pub struct ClockBackend;

impl AudioBackend for ClockBackend {
    fn start_track(&self, source: &AudioSource, options: TrackOptions) -> Result<Box<dyn TrackHandle>> {
        let duration = if options.looping && source.duration.is_zero() {
            BACKGROUND_LOOP
        } else {
            source.duration
        };
        Ok(Box::new(ClockTrack::new(duration, options)))
    }
}

/// Source for a looping background asset; loop length is nominal since a
/// looping track's position only matters modulo its duration
pub fn background_source(asset_path: &str) -> AudioSource {
    AudioSource {
        url: asset_path.to_string(),
        duration: BACKGROUND_LOOP,
    }
}

struct ClockTrackState {
    playing: bool,
    /// Position accumulated up to the last pause/seek
    base: Duration,
    /// When playback last resumed; meaningful while playing
    resumed_at: Instant,
}

/// Track whose position advances with wall time while playing
pub struct ClockTrack {
    duration: Duration,
    looping: bool,
    volume: f32,
    state: Mutex<ClockTrackState>,
}

impl ClockTrack {
    /// Create a track, playing from position zero
    pub fn new(duration: Duration, options: TrackOptions) -> Self {
        Self {
            duration,
            looping: options.looping,
            volume: options.volume,
            state: Mutex::new(ClockTrackState {
                playing: true,
                base: Duration::ZERO,
                resumed_at: Instant::now(),
            }),
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ClockTrackState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn raw_position(&self, state: &ClockTrackState) -> Duration {
        let mut position = state.base;
        if state.playing {
            position += state.resumed_at.elapsed();
        }
        position
    }
}

impl TrackHandle for ClockTrack {
    fn pause(&self) {
        let mut state = self.lock_state();
        if state.playing {
            state.base = self.raw_position(&state);
            state.playing = false;
        }
    }

    fn resume(&self) {
        let mut state = self.lock_state();
        if !state.playing {
            state.resumed_at = Instant::now();
            state.playing = true;
        }
    }

    fn stop(&self) {
        let mut state = self.lock_state();
        state.playing = false;
        state.base = Duration::ZERO;
    }

    fn seek(&self, position: Duration) {
        let mut state = self.lock_state();
        state.base = position.min(self.duration);
        state.resumed_at = Instant::now();
    }

    fn position(&self) -> Duration {
        let state = self.lock_state();
        let raw = self.raw_position(&state);
        if self.looping {
            if self.duration.is_zero() {
                Duration::ZERO
            } else {
                Duration::from_nanos((raw.as_nanos() % self.duration.as_nanos()) as u64)
            }
        } else {
            raw.min(self.duration)
        }
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn is_finished(&self) -> bool {
        if self.looping || self.duration.is_zero() {
            return false;
        }
        let state = self.lock_state();
        self.raw_position(&state) >= self.duration
    }
}
