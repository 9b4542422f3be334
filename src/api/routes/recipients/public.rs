//! Public types for the recipients API
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Serialize)]
pub struct RecipientsResponse {
    pub recipients: Vec<Recipient>,
}
