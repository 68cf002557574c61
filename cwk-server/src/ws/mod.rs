//! WebSocket 传输层

pub mod handler;

pub use handler::{WsQuery, handle_ws};
