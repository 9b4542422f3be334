//! Fire-and-forget audit trail shared across the platform.
//!
//! Recording never surfaces an error to the caller and never rolls
//! back the operation that triggered it.
pub mod db;
pub mod models;
pub use db::*;
pub use models::*;

use serde_json::Value;
use tokio_rusqlite::Connection;

/// Append an action record for compliance traceability. Failures are
/// logged and swallowed.
pub async fn record(
    db: &Connection,
    actor_id: &str,
    action: AuditAction,
    metadata: Option<Value>,
    fingerprint: &ClientFingerprint,
) {
    let entry = NewAuditEntry {
        actor_id: actor_id.to_string(),
        action,
        metadata,
        ip_address: fingerprint.ip.clone(),
        user_agent: fingerprint.user_agent.clone(),
    };
    if let Err(err) = insert_audit_entry(db, entry).await {
        tracing::error!(
            "Failed to record audit action {} for {}: {}",
            action.as_str(),
            actor_id,
            err
        );
    }
}
