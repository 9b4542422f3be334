//! Router for the notifications API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::tenant::TenantContext;
use crate::notify;

type SharedState = Arc<RwLock<AppState>>;

async fn notification_list(
    State(state): State<SharedState>,
    ctx: TenantContext,
    Query(params): Query<public::NotificationsQuery>,
) -> Result<axum::Json<public::NotificationsResponse>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let notifications = notify::list_notifications(&db, &ctx.actor_id, limit).await?;
    Ok(axum::Json(public::NotificationsResponse { notifications }))
}

async fn mark_all_seen(
    State(state): State<SharedState>,
    ctx: TenantContext,
) -> Result<axum::Json<public::MarkSeenResponse>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let updated = notify::mark_all_seen(&db, &ctx.actor_id).await?;
    Ok(axum::Json(public::MarkSeenResponse { updated }))
}

/// Create the notifications router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(notification_list))
        .route("/seen", post(mark_all_seen))
}
