//! Router for the messages API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_extra::extract::Query;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio_rusqlite::Connection;

use super::db as messages_db;
use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::tenant::TenantContext;
use crate::directory::{self, Account, BROADCAST_TARGET, ResolveError, ResolvedRecipient};
use crate::mailer::{Mailer, OutboundEmail};
use crate::notify::NewNotification;

type SharedState = Arc<RwLock<AppState>>;

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn resolve_error(err: ResolveError) -> ApiError {
    match err {
        ResolveError::UnknownRecipient(target) => {
            ApiError::Validation(format!("unknown recipient: {}", target))
        }
        ResolveError::NoRecipients => ApiError::NoRecipients,
        ResolveError::Db(err) => ApiError::Internal(err),
    }
}

/// The email counterpart of a message, addressed so that a plain reply
/// goes to the human sender.
fn outbound_email(
    sender: &Account,
    to: &str,
    subject: &str,
    body: &str,
    base_url: &str,
    sent_at: DateTime<Utc>,
) -> OutboundEmail {
    OutboundEmail {
        to: to.to_string(),
        from_name: sender.display_name.clone(),
        reply_to: sender.email.clone(),
        subject: subject.to_string(),
        html_body: format!(
            "<p>{}</p><p><a href=\"{}/inbox\">View and reply on Shareflow</a></p>",
            body, base_url
        ),
        text_body: format!("{}\n\nView and reply on Shareflow: {}/inbox", body, base_url),
        sent_at,
    }
}

async fn message_list(
    State(state): State<SharedState>,
    ctx: TenantContext,
    Query(params): Query<public::ListMessagesQuery>,
) -> Result<axum::Json<public::ListMessagesResponse>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, public::MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let filter = messages_db::ListFilter {
        user_id: ctx.actor_id,
        folder: params.folder.unwrap_or(public::Folder::Inbox),
        kind: params.kind,
        search: params.search,
    };

    let total = messages_db::count_messages(&db, filter.clone()).await?;
    let messages = messages_db::list_messages(&db, filter, limit, offset).await?;
    let total_pages = (total as f64 / limit as f64).ceil() as i64;

    Ok(axum::Json(public::ListMessagesResponse {
        messages,
        page,
        limit,
        total,
        total_pages,
    }))
}

async fn unread_count(
    State(state): State<SharedState>,
    ctx: TenantContext,
) -> Result<axum::Json<public::UnreadCounts>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let counts = messages_db::unread_counts(&db, &ctx.actor_id).await?;
    Ok(axum::Json(counts))
}

/// Write one ledger row for a resolved internal recipient, then fan
/// out the in-app notification and the best-effort email copy. Side
/// effects run after the write and their failures are swallowed.
async fn deliver_internal(
    db: &Connection,
    mailer: &Mailer,
    base_url: &str,
    sender: &Account,
    recipient: &ResolvedRecipient,
    recipient_id: &str,
    payload: &public::SendInternalRequest,
) -> Result<public::Message, anyhow::Error> {
    let message = messages_db::insert_message(
        db,
        messages_db::NewMessage {
            sender_id: sender.id.clone(),
            from_name: sender.display_name.clone(),
            subject: payload.subject.clone(),
            body: payload.body.clone(),
            parent_id: payload.parent_id.clone(),
            channel: public::Channel::Internal {
                recipient_id: recipient_id.to_string(),
            },
        },
    )
    .await?;

    crate::notify::fan_out(
        db,
        NewNotification::new(
            recipient_id,
            "message.internal",
            &format!("New message from {}", sender.display_name),
            &payload.subject,
            None,
        ),
    )
    .await;

    let email = outbound_email(
        sender,
        &recipient.email,
        &payload.subject,
        &payload.body,
        base_url,
        Utc::now(),
    );
    let outcome = mailer.deliver(&email).await;
    if !outcome.success {
        tracing::warn!(
            "Email notification to {} was not delivered",
            recipient.email
        );
    }

    Ok(message)
}

async fn send_internal(
    State(state): State<SharedState>,
    ctx: TenantContext,
    axum::Json(payload): axum::Json<public::SendInternalRequest>,
) -> Result<axum::Json<public::SendInternalResponse>, ApiError> {
    require("target", &payload.target)?;
    require("subject", &payload.subject)?;
    require("body", &payload.body)?;

    let (db, mailer, base_url) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (
            shared_state.db.clone(),
            shared_state.mailer.clone(),
            shared_state.config.public_base_url.clone(),
        )
    };

    let sender = directory::account_by_id(&db, &ctx.actor_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let recipients = directory::resolve_recipients(&db, &ctx, &payload.target)
        .await
        .map_err(resolve_error)?;
    let broadcast = payload.target == BROADCAST_TARGET;

    let mut sent = 0;
    let mut single = None;
    let mut failed = Vec::new();

    for recipient in &recipients {
        // An internal message needs a known account on the other end;
        // the external endpoint covers arbitrary addresses
        let Some(recipient_id) = recipient.account_id.as_deref() else {
            return Err(ApiError::Validation(format!(
                "{} is not a member of this team",
                recipient.email
            )));
        };

        match deliver_internal(
            &db,
            &mailer,
            &base_url,
            &sender,
            recipient,
            recipient_id,
            &payload,
        )
        .await
        {
            Ok(message) => {
                sent += 1;
                if !broadcast {
                    single = Some(message);
                }
            }
            Err(err) if broadcast => {
                // A partial broadcast failure must not silently drop
                // recipients, so each failed email is reported back
                tracing::error!(
                    "Failed to write message for recipient {}: {}",
                    recipient.email,
                    err
                );
                failed.push(recipient.email.clone());
            }
            // A single send either commits or fails outright
            Err(err) => return Err(ApiError::Internal(err)),
        }
    }

    Ok(axum::Json(public::SendInternalResponse {
        sent,
        message: single,
        failed,
    }))
}

async fn send_external(
    State(state): State<SharedState>,
    ctx: TenantContext,
    axum::Json(payload): axum::Json<public::SendExternalRequest>,
) -> Result<axum::Json<public::SendExternalResponse>, ApiError> {
    require("to_email", &payload.to_email)?;
    require("subject", &payload.subject)?;
    require("body", &payload.body)?;
    if !payload.to_email.contains('@') {
        return Err(ApiError::Validation(
            "to_email must be a valid email address".to_string(),
        ));
    }

    let (db, mailer, base_url) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (
            shared_state.db.clone(),
            shared_state.mailer.clone(),
            shared_state.config.public_base_url.clone(),
        )
    };

    let sender = directory::account_by_id(&db, &ctx.actor_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    // Opportunistically link the destination to an account so the
    // message also lands in that account's inbox
    let known_account = directory::account_by_email(&db, &payload.to_email).await?;

    // The ledger write commits before any delivery attempt; a
    // transport failure leaves the message saved, not delivered
    let mut message = messages_db::insert_message(
        &db,
        messages_db::NewMessage {
            sender_id: sender.id.clone(),
            from_name: sender.display_name.clone(),
            subject: payload.subject.clone(),
            body: payload.body.clone(),
            parent_id: payload.parent_id.clone(),
            channel: public::Channel::External {
                to_email: payload.to_email.clone(),
                recipient_id: known_account.as_ref().map(|account| account.id.clone()),
                email_status: public::EmailStatus::Pending,
                email_id: None,
            },
        },
    )
    .await?;

    let sent_at = DateTime::parse_from_rfc3339(&message.created_at)
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    let email = outbound_email(
        &sender,
        &payload.to_email,
        &payload.subject,
        &payload.body,
        &base_url,
        sent_at,
    );
    let outcome = mailer.deliver(&email).await;

    let status = if outcome.success {
        public::EmailStatus::Sent
    } else {
        public::EmailStatus::Failed
    };
    messages_db::set_email_status(&db, &message.id, status, outcome.provider_id.clone()).await?;
    if let public::Channel::External {
        email_status,
        email_id,
        ..
    } = &mut message.channel
    {
        *email_status = status;
        *email_id = outcome.provider_id.clone();
    }

    if let Some(account) = known_account {
        crate::notify::fan_out(
            &db,
            NewNotification::new(
                &account.id,
                "message.external",
                &format!("New message from {}", sender.display_name),
                &payload.subject,
                Some(json!({ "isExternal": true })),
            ),
        )
        .await;
    }

    Ok(axum::Json(public::SendExternalResponse {
        message,
        delivered: outcome.success,
    }))
}

async fn mark_read(
    State(state): State<SharedState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<axum::Json<Value>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    if !messages_db::mark_read(&db, &ctx.actor_id, &id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(axum::Json(json!({ "success": true })))
}

async fn toggle_star(
    State(state): State<SharedState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<axum::Json<public::StarResponse>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let starred = messages_db::toggle_star(&db, &ctx.actor_id, &id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(axum::Json(public::StarResponse { starred }))
}

async fn archive(
    State(state): State<SharedState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<axum::Json<Value>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    if !messages_db::archive(&db, &ctx.actor_id, &id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(axum::Json(json!({ "success": true })))
}

/// Create the messages router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(message_list))
        .route("/unread-count", get(unread_count))
        .route("/internal", post(send_internal))
        .route("/external", post(send_external))
        .route("/{id}/read", post(mark_read))
        .route("/{id}/star", post(toggle_star))
        .route("/{id}/archive", post(archive))
}
