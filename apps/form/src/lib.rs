//! Penguin Species Prediction form service
//!
//! Serves the single prediction page. Artifacts are loaded once at startup
//! and shared read-only by every request.

pub mod config;
pub mod page;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use routes::construct_router;
