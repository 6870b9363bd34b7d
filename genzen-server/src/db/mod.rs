//! Database access layer
//!
//! SQLite via sqlx. Schema creation is idempotent and runs on startup;
//! tests run against in-memory pools using the same creation path.

pub mod init;
pub mod meditations;
pub mod users;
