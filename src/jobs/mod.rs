//! Background jobs run on a fixed interval while the server is up
pub mod reconcile_email_status;
pub use reconcile_email_status::ReconcileEmailStatus;

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;

#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn interval(&self) -> Duration;

    async fn run_job(&self, config: &AppConfig, db: &Connection);
}

/// Spawn a job in its own tokio task that runs every `interval`.
pub fn spawn_periodic_job<J: PeriodicJob + Debug>(config: AppConfig, db: Connection, job: J) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(job.interval());
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            tracing::debug!("Running periodic job {:?}", job);
            job.run_job(&config, &db).await;
        }
    });
}
