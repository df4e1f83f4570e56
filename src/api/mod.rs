//! HTTP API surface.

pub mod routes;
mod tasks;

pub use routes::{serve, AppState};
