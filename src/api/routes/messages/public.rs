//! Public types for the messages API
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Hard ceiling on page size to bound server load
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug)]
pub struct InvalidEnumValue(pub String);

impl fmt::Display for InvalidEnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid enum value: {}", self.0)
    }
}

impl std::error::Error for InvalidEnumValue {}

/// Delivery state of an external message. Only meaningful for the
/// external channel; internal messages never carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Pending,
    Sent,
    Failed,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for EmailStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(InvalidEnumValue(other.to_string())),
        }
    }
}

/// The two message shapes. Internal messages travel between two known
/// accounts; external messages travel to an arbitrary email address
/// and only link back to an account when that address matches one.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Channel {
    Internal {
        recipient_id: String,
    },
    External {
        to_email: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        recipient_id: Option<String>,
        email_status: EmailStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        email_id: Option<String>,
    },
}

impl Channel {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Internal { .. } => "internal",
            Self::External { .. } => "external",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    /// Display name snapshot of the sender at send time
    pub from_name: String,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub starred: bool,
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub created_at: String,
    #[serde(flatten)]
    pub channel: Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
    Inbox,
    Sent,
}

impl Folder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Sent => "sent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelFilter {
    Internal,
    External,
}

impl ChannelFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

#[derive(Deserialize)]
pub struct ListMessagesQuery {
    #[serde(rename = "type")]
    pub kind: Option<ChannelFilter>,
    pub folder: Option<Folder>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<Message>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Deserialize)]
pub struct SendInternalRequest {
    pub target: String,
    pub subject: String,
    pub body: String,
    pub parent_id: Option<String>,
}

#[derive(Serialize)]
pub struct SendInternalResponse {
    /// Number of recipients a message row was created for
    pub sent: usize,
    /// The created message, present for single-recipient sends only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Emails of recipients whose row could not be written
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

#[derive(Deserialize)]
pub struct SendExternalRequest {
    pub to_email: String,
    pub subject: String,
    pub body: String,
    pub parent_id: Option<String>,
}

#[derive(Serialize)]
pub struct SendExternalResponse {
    pub message: Message,
    /// False means saved but not delivered; the message row still
    /// exists in the sender's sent folder
    pub delivered: bool,
}

#[derive(Serialize)]
pub struct StarResponse {
    pub starred: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnreadCounts {
    pub internal: i64,
    pub external: i64,
    pub total: i64,
}
