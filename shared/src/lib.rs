//! Shared types for the workshop server
//!
//! Wire protocol and admin config types used by the server and by
//! any Rust client of the `/wds` socket.

pub mod workshop;

// Re-exports
pub use serde::{Deserialize, Serialize};
