//! HTTP API: routing, request/response mapping, and the server lifecycle.

pub mod app;
pub mod directory;
pub mod server;
pub mod state;

pub use state::AppState;
