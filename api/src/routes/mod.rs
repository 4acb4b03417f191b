//! HTTP route entry point for `/api/...`.
//!
//! - `/health` → liveness probe
//! - `/attendance` → session lifecycle, sign-in, manual marks and day views

use crate::routes::{attendance::attendance_routes, health::health_routes};
use crate::state::AppState;
use axum::Router;

pub mod attendance;
pub mod health;

/// Builds the `/api` router with its state attached.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/attendance", attendance_routes())
        .with_state(app_state)
}
