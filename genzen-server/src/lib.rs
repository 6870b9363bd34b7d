//! # GenZen Server (genzen-server)
//!
//! Meditation-generation web service: authenticated users generate
//! personalized scripts, synthesize narration, keep a private library, and
//! share meditations to a community catalog with ratings.
//!
//! **Architecture:** axum HTTP/SSE surface over two stateful cores (the
//! playback state machine and the rating & sharing engine), with the script
//! generator, speech synthesizer, and identity provider behind trait seams.

pub mod api;
pub mod auth;
pub mod community;
pub mod config;
pub mod db;
pub mod error;
pub mod generate;
pub mod playback;
pub mod state;
pub mod synth;

pub use error::{Error, Result};
pub use state::SharedState;
