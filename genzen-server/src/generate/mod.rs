//! Script generation
//!
//! Produces narrated meditation scripts with embedded pacing markers from a
//! type, duration, and per-user customization, through an upstream
//! chat-completions model.

mod openai;
pub mod prompt;

pub use self::openai::OpenAiGenerator;

use crate::error::Result;
use axum::async_trait;
use genzen_common::model::{Customization, MeditationType};

/// What to generate
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub meditation_type: MeditationType,
    /// Target length in minutes
    pub duration: i64,
    pub customization: Option<Customization>,
}

/// Script generation seam
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Return the full script text; pacing markers included
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
