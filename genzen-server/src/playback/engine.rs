//! Player engine
//!
//! Owns the single playback session: at most one meditation is active, and
//! starting another implicitly stops the one playing. Collaborators are
//! injected, keeping one writer over the session state with read-only views
//! elsewhere.

use crate::error::Result;
use crate::playback::track::{background_source, AudioBackend, AudioSource, TrackHandle, TrackOptions};
use crate::playback::tracker::PlayTracker;
use crate::state::SharedState;
use crate::synth::{SpeechOptions, SpeechSynthesizer};
use chrono::Utc;
use genzen_common::events::{GenZenEvent, PlayerState};
use genzen_common::model::Meditation;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Snapshot of the player session for API responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatus {
    pub state: PlayerState,
    pub meditation_id: Option<Uuid>,
    pub title: Option<String>,
    /// Best-effort elapsed position
    pub position_seconds: f64,
    /// Best-effort track length; the meditation's declared duration stays
    /// authoritative
    pub duration_seconds: f64,
}

#[derive(Debug, Clone)]
struct LoadedMeditation {
    id: Uuid,
    title: String,
    declared_duration_seconds: u64,
}

struct Session {
    state: PlayerState,
    /// Bumped on every Play/Stop; a stale epoch means the load was superseded
    epoch: u64,
    meditation: Option<LoadedMeditation>,
    primary: Option<Box<dyn TrackHandle>>,
    background: Option<Box<dyn TrackHandle>>,
}

impl Session {
    fn new() -> Self {
        Self {
            state: PlayerState::Idle,
            epoch: 0,
            meditation: None,
            primary: None,
            background: None,
        }
    }

    /// Halt both tracks and release the background resource
    fn halt_tracks(&mut self) {
        if let Some(primary) = self.primary.take() {
            primary.stop();
        }
        if let Some(background) = self.background.take() {
            background.stop();
        }
    }
}

/// Playback engine - one active meditation session
pub struct PlayerEngine {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    audio: Arc<dyn AudioBackend>,
    tracker: Arc<dyn PlayTracker>,
    state: Arc<SharedState>,
    session: Mutex<Session>,
}

impl PlayerEngine {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        audio: Arc<dyn AudioBackend>,
        tracker: Arc<dyn PlayTracker>,
        state: Arc<SharedState>,
    ) -> Self {
        Self {
            synthesizer,
            audio,
            tracker,
            state,
            session: Mutex::new(Session::new()),
        }
    }

    /// Start the progress-reporting loop
    pub fn start(self: &Arc<Self>) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.progress_loop().await;
        });
    }

    /// Begin playing a meditation, stopping any active session first
    ///
    /// Resolves audio through the synthesizer when the meditation has no
    /// precomputed reference; on synthesis failure the player returns to
    /// Idle and the error surfaces to the caller. On success exactly one
    /// play-count request is issued, detached from transport controls.
    pub async fn play(&self, meditation: &Meditation) -> Result<()> {
        info!("Play command received for meditation {}", meditation.id);

        let epoch = {
            let mut session = self.session.lock().await;
            session.halt_tracks();
            session.state = PlayerState::Loading;
            session.meditation = Some(LoadedMeditation {
                id: meditation.id,
                title: meditation.title.clone(),
                declared_duration_seconds: meditation.duration.max(0) as u64 * 60,
            });
            session.epoch += 1;
            self.emit_state(PlayerState::Loading, Some(meditation.id));
            session.epoch
        };

        // Resolve audio without holding the session lock so Stop (and a
        // superseding Play) stay responsive during synthesis
        let source = match self.resolve_audio(meditation).await {
            Ok(source) => source,
            Err(e) => {
                let mut session = self.session.lock().await;
                if session.epoch == epoch {
                    session.state = PlayerState::Idle;
                    session.meditation = None;
                    self.emit_state(PlayerState::Idle, None);
                }
                return Err(e);
            }
        };

        let mut session = self.session.lock().await;
        if session.epoch != epoch || session.state != PlayerState::Loading {
            debug!("Play of {} superseded during load", meditation.id);
            return Ok(());
        }

        let primary = match self.audio.start_track(&source, TrackOptions::narration()) {
            Ok(track) => track,
            Err(e) => {
                session.state = PlayerState::Idle;
                session.meditation = None;
                self.emit_state(PlayerState::Idle, None);
                return Err(e);
            }
        };

        // Background ambience loops at reduced volume alongside narration,
        // unless the settings carry the silence sentinel
        let background = match meditation.settings.background.asset_path() {
            Some(asset) => {
                match self
                    .audio
                    .start_track(&background_source(asset), TrackOptions::background())
                {
                    Ok(track) => Some(track),
                    Err(e) => {
                        warn!("Background track unavailable, playing narration only: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        session.primary = Some(primary);
        session.background = background;
        session.state = PlayerState::Playing;
        self.emit_state(PlayerState::Playing, Some(meditation.id));

        // Exactly one play-count request per logical start; failure is
        // logged and never fails playback
        let tracker = Arc::clone(&self.tracker);
        let meditation_id = meditation.id;
        tokio::spawn(async move {
            if let Err(e) = tracker.record_play(meditation_id).await {
                warn!("Failed to record play for {}: {}", meditation_id, e);
            }
        });

        Ok(())
    }

    /// Pause both tracks; no-op unless playing
    pub async fn pause(&self) {
        let mut session = self.session.lock().await;
        if session.state != PlayerState::Playing {
            return;
        }
        if let Some(primary) = &session.primary {
            primary.pause();
        }
        if let Some(background) = &session.background {
            background.pause();
        }
        session.state = PlayerState::Paused;
        let meditation_id = session.meditation.as_ref().map(|m| m.id);
        self.emit_state(PlayerState::Paused, meditation_id);
    }

    /// Resume both tracks; no-op unless paused
    pub async fn resume(&self) {
        let mut session = self.session.lock().await;
        if session.state != PlayerState::Paused {
            return;
        }
        if let Some(primary) = &session.primary {
            primary.resume();
        }
        if let Some(background) = &session.background {
            background.resume();
        }
        session.state = PlayerState::Playing;
        let meditation_id = session.meditation.as_ref().map(|m| m.id);
        self.emit_state(PlayerState::Playing, meditation_id);
    }

    /// Halt both tracks, reset elapsed to zero and return to Idle
    ///
    /// Always succeeds; in-flight play-count writes are left to complete or
    /// fail on their own.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        if session.state == PlayerState::Idle {
            return;
        }
        session.halt_tracks();
        session.state = PlayerState::Idle;
        session.meditation = None;
        session.epoch += 1;
        self.emit_state(PlayerState::Idle, None);
    }

    /// Seek the primary track, clamping the target into [0, duration]
    pub async fn seek_to(&self, seconds: f64) {
        let session = self.session.lock().await;
        if !matches!(session.state, PlayerState::Playing | PlayerState::Paused) {
            return;
        }
        if let Some(primary) = &session.primary {
            let clamped = seconds.clamp(0.0, primary.duration().as_secs_f64());
            primary.seek(Duration::from_secs_f64(clamped));
        }
    }

    /// Snapshot of the current session
    pub async fn status(&self) -> PlayerStatus {
        let session = self.session.lock().await;
        let (position_seconds, duration_seconds) = match &session.primary {
            Some(primary) => (
                primary.position().as_secs_f64(),
                primary.duration().as_secs_f64(),
            ),
            None => (
                0.0,
                session
                    .meditation
                    .as_ref()
                    .map(|m| m.declared_duration_seconds as f64)
                    .unwrap_or(0.0),
            ),
        };

        PlayerStatus {
            state: session.state,
            meditation_id: session.meditation.as_ref().map(|m| m.id),
            title: session.meditation.as_ref().map(|m| m.title.clone()),
            position_seconds,
            duration_seconds,
        }
    }

    async fn resolve_audio(&self, meditation: &Meditation) -> Result<AudioSource> {
        if let Some(url) = &meditation.audio_url {
            return Ok(AudioSource {
                url: url.clone(),
                duration: Duration::from_secs(meditation.duration.max(0) as u64 * 60),
            });
        }

        let options = SpeechOptions::for_voice(meditation.settings.voice);
        let audio = self.synthesizer.synthesize(&meditation.script, &options).await?;
        Ok(AudioSource {
            url: audio.audio_url,
            duration: audio.duration,
        })
    }

    fn emit_state(&self, state: PlayerState, meditation_id: Option<Uuid>) {
        self.state.broadcast_event(GenZenEvent::PlaybackStateChanged {
            state,
            meditation_id,
            timestamp: Utc::now(),
        });
    }

    /// Detect natural end-of-audio and return to Idle
    async fn finish_if_ended(&self) {
        let mut session = self.session.lock().await;
        if session.state != PlayerState::Playing {
            return;
        }
        let finished = session
            .primary
            .as_ref()
            .map(|primary| primary.is_finished())
            .unwrap_or(false);
        if finished {
            let meditation_id = session.meditation.as_ref().map(|m| m.id);
            info!("Meditation {:?} played to completion", meditation_id);
            session.halt_tracks();
            session.state = PlayerState::Idle;
            session.meditation = None;
            session.epoch += 1;
            self.emit_state(PlayerState::Idle, None);
        }
    }

    /// Emit PlaybackProgress every five seconds while playing
    async fn progress_loop(&self) {
        let mut tick = interval(Duration::from_secs(1));
        let mut progress_counter = 0;

        loop {
            tick.tick().await;
            self.finish_if_ended().await;

            progress_counter += 1;
            if progress_counter < 5 {
                continue;
            }
            progress_counter = 0;

            let session = self.session.lock().await;
            if session.state != PlayerState::Playing {
                continue;
            }
            if let (Some(meditation), Some(primary)) = (&session.meditation, &session.primary) {
                self.state.broadcast_event(GenZenEvent::PlaybackProgress {
                    meditation_id: meditation.id,
                    position_seconds: primary.position().as_secs_f64(),
                    duration_seconds: primary.duration().as_secs_f64(),
                    timestamp: Utc::now(),
                });
            }
        }
    }
}
