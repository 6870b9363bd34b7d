//! Community catalog: sharing and rating
//!
//! Keeps a user's private meditation consistent with its public projection
//! and keeps aggregate rating statistics correct under concurrent
//! submissions.

mod engine;

pub use self::engine::{CommunityEngine, POPULAR_LIMIT, RECENT_LIMIT};
