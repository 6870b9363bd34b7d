//! # GenZen Common Library
//!
//! Shared code for the GenZen meditation service:
//! - Domain models and fixed enumerations
//! - Event types (GenZenEvent enum)
//! - Common error taxonomy
//! - Pacing-marker parsing for generated scripts

pub mod error;
pub mod events;
pub mod markers;
pub mod model;

pub use error::{Error, Result};
