use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
    pub id: String,
    pub account_id: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub seen: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub account_id: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    // Application specific notification data the client can use to
    // render or route the notification (e.g. isExternal for messages
    // that arrived via the sender's external email address).
    pub metadata: Option<Value>,
}

impl NewNotification {
    pub fn new(
        account_id: &str,
        kind: &str,
        title: &str,
        body: &str,
        metadata: Option<Value>,
    ) -> Self {
        Self {
            account_id: account_id.to_string(),
            kind: kind.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            metadata,
        }
    }
}
