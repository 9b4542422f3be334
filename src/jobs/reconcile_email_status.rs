use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio_rusqlite::Connection;

use super::PeriodicJob;
use crate::core::AppConfig;

/// How long a delivery may sit in `pending` before it is considered
/// lost. A crash between the ledger write and the status update leaves
/// the row pending with no delivery attempt to finish it.
const PENDING_CUTOFF_MINUTES: i64 = 10;

#[derive(Default, Debug)]
pub struct ReconcileEmailStatus;

#[async_trait]
impl PeriodicJob for ReconcileEmailStatus {
    fn interval(&self) -> Duration {
        Duration::from_secs(60 * 5)
    }

    async fn run_job(&self, _config: &AppConfig, db: &Connection) {
        let cutoff = (Utc::now() - chrono::Duration::minutes(PENDING_CUTOFF_MINUTES))
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let result = db
            .call(move |conn| {
                let updated = conn.execute(
                    r"
                    UPDATE message
                    SET email_status = 'failed'
                    WHERE email_status = 'pending' AND created_at < ?1
                    ",
                    [cutoff],
                )?;
                Ok(updated)
            })
            .await;

        match result {
            Ok(0) => {}
            Ok(updated) => {
                tracing::warn!("Marked {} stale pending deliveries as failed", updated);
            }
            Err(err) => {
                tracing::error!("Failed to reconcile pending deliveries: {}", err);
            }
        }
    }
}
