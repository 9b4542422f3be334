pub mod db;
pub mod models;
pub use db::*;
pub use models::*;

use tokio_rusqlite::Connection;

/// Create an in-app notification for a recipient. Best-effort: runs
/// after the triggering write has committed and swallows its own
/// failures so they can never affect the caller's result.
pub async fn fan_out(db: &Connection, notification: NewNotification) {
    let account_id = notification.account_id.clone();
    if let Err(err) = insert_notification(db, notification).await {
        tracing::error!(
            "Failed to create notification for account {}: {}",
            account_id,
            err
        );
    }
}
