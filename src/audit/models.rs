use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Action kinds recorded in the audit trail, spanning content, team,
/// billing, security, and account lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ContentUpload,
    ContentDelete,
    StreamCreate,
    StreamDelete,
    TeamInvite,
    TeamAccept,
    TeamRemove,
    TeamRoleChange,
    BillingSubscribe,
    BillingPlanChange,
    BillingCancel,
    SecurityLogin,
    SecurityLogout,
    SecurityPasswordChange,
    AccountCreate,
    AccountDelete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentUpload => "content_upload",
            Self::ContentDelete => "content_delete",
            Self::StreamCreate => "stream_create",
            Self::StreamDelete => "stream_delete",
            Self::TeamInvite => "team_invite",
            Self::TeamAccept => "team_accept",
            Self::TeamRemove => "team_remove",
            Self::TeamRoleChange => "team_role_change",
            Self::BillingSubscribe => "billing_subscribe",
            Self::BillingPlanChange => "billing_plan_change",
            Self::BillingCancel => "billing_cancel",
            Self::SecurityLogin => "security_login",
            Self::SecurityLogout => "security_logout",
            Self::SecurityPasswordChange => "security_password_change",
            Self::AccountCreate => "account_create",
            Self::AccountDelete => "account_delete",
        }
    }
}

/// Network-origin and device fingerprint captured at the request
/// boundary. Both fields are nullable when the client gave us nothing
/// to go on.
#[derive(Debug, Clone, Default)]
pub struct ClientFingerprint {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor_id: String,
    pub action: AuditAction,
    pub metadata: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: String,
    pub actor_id: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
}
