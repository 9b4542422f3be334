//! Public types for the notifications API
use serde::{Deserialize, Serialize};

use crate::notify::Notification;

#[derive(Deserialize)]
pub struct NotificationsQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

#[derive(Serialize)]
pub struct MarkSeenResponse {
    pub updated: usize,
}
