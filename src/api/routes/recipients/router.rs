//! Router for the recipients API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, routing::get};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::tenant::TenantContext;
use crate::directory;

type SharedState = Arc<RwLock<AppState>>;

/// The accounts the actor can address from the compose UI: the
/// effective tenant's owner and every accepted team member, minus the
/// actor themselves.
async fn recipient_list(
    State(state): State<SharedState>,
    ctx: TenantContext,
) -> Result<axum::Json<public::RecipientsResponse>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();

    let recipients = directory::addressable_recipients(&db, &ctx)
        .await?
        .into_iter()
        // Broadcast resolution always yields known accounts
        .filter_map(|recipient| {
            recipient.account_id.map(|id| public::Recipient {
                id,
                email: recipient.email,
                display_name: recipient.display_name,
            })
        })
        .collect();

    Ok(axum::Json(public::RecipientsResponse { recipients }))
}

/// Create the recipients router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(recipient_list))
}
