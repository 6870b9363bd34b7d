//! Playback state machine
//!
//! Governs the lifecycle of the currently playing meditation: transport
//! controls, a primary narration track coordinated with an independently
//! looping background track, and play-count accounting exactly once per
//! logical play start.

pub mod engine;
pub mod track;
pub mod tracker;

pub use self::engine::{PlayerEngine, PlayerStatus};
pub use genzen_common::events::PlayerState;
pub use self::track::{AudioBackend, AudioSource, ClockBackend, TrackHandle, TrackOptions};
pub use self::tracker::{DbPlayTracker, PlayTracker};
