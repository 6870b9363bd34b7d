//! HTTP API
//!
//! JSON request/response handlers over axum, the SSE event stream, and the
//! router/context wiring.

pub mod handlers;
pub mod player;
pub mod server;
pub mod sse;

pub use self::server::{create_router, AppContext};
