use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::mailer::Mailer;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        let mailer = Mailer::from_config(&config);
        Self { db, config, mailer }
    }
}
