//! Web layer for the journey planner.
//!
//! Provides the `/route-planner` endpoint plus stop search, snapshot
//! summary and health checks.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
