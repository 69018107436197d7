//! API module
//!
//! HTTP surface over the transfer engine.

pub mod routes;

pub use routes::{create_router, AppState};
