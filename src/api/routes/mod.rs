//! API routes module

pub mod messages;
pub mod notifications;
pub mod recipients;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Message ledger routes
        .nest("/messages", messages::router())
        // Compose UI recipient listing
        .nest("/recipients", recipients::router())
        // In-app notification routes
        .nest("/notifications", notifications::router())
}
