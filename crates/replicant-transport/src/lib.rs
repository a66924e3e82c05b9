//! Replicant Transport
//!
//! Per-session message handling and the WebSocket server. A session is
//! one connection: it declares the replicants it cares about, receives a
//! snapshot for each, and is fanned incremental changes until it
//! disconnects. Reconnecting clients open a fresh session and re-declare,
//! receiving fresh snapshots instead of replayed history.

pub mod handler;
pub mod websocket;

pub use handler::SessionHandler;
pub use websocket::WebSocketServer;
