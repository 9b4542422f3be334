//! Account and team-membership lookups plus recipient resolution.
//!
//! Accounts, team rosters, and roles are owned by the accounts service;
//! this module only consumes that data to answer "who can this actor
//! address" questions for the messaging core.
pub mod db;

pub use db::{
    Account, TeamMember, account_by_email, account_by_id, accepted_members, effective_tenant,
};

use tokio_rusqlite::Connection;

use crate::api::tenant::TenantContext;

/// Sentinel target that addresses every other member of the effective
/// tenant's team.
pub const BROADCAST_TARGET: &str = "all";

/// A concrete destination produced by [`resolve_recipients`]. The
/// account id is absent when the target was an email address that does
/// not belong to any account.
#[derive(Debug, Clone)]
pub struct ResolvedRecipient {
    pub account_id: Option<String>,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<Account> for ResolvedRecipient {
    fn from(account: Account) -> Self {
        Self {
            account_id: Some(account.id),
            email: account.email,
            display_name: Some(account.display_name),
        }
    }
}

#[derive(Debug)]
pub enum ResolveError {
    /// The target named an account id that does not exist
    UnknownRecipient(String),
    /// A broadcast target resolved to an empty set
    NoRecipients,
    Db(anyhow::Error),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRecipient(target) => write!(f, "unknown recipient: {}", target),
            Self::NoRecipients => write!(f, "no recipients could be resolved"),
            Self::Db(err) => write!(f, "recipient lookup failed: {}", err),
        }
    }
}

impl From<tokio_rusqlite::Error> for ResolveError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        Self::Db(err.into())
    }
}

/// Resolve a loose target (email, account id, or the `"all"` sentinel)
/// into concrete recipients for the acting tenant.
pub async fn resolve_recipients(
    db: &Connection,
    ctx: &TenantContext,
    raw_target: &str,
) -> Result<Vec<ResolvedRecipient>, ResolveError> {
    if raw_target == BROADCAST_TARGET {
        return resolve_broadcast(db, ctx).await;
    }

    if raw_target.contains('@') {
        // An email that matches an account becomes an internal
        // candidate, otherwise it is a pure external destination
        let recipient = match account_by_email(db, raw_target).await? {
            Some(account) => account.into(),
            None => ResolvedRecipient {
                account_id: None,
                email: raw_target.to_string(),
                display_name: None,
            },
        };
        return Ok(vec![recipient]);
    }

    match account_by_id(db, raw_target).await? {
        Some(account) => Ok(vec![account.into()]),
        None => Err(ResolveError::UnknownRecipient(raw_target.to_string())),
    }
}

/// Everyone on the effective tenant's team except the actor: the owner
/// plus every accepted member.
async fn resolve_broadcast(
    db: &Connection,
    ctx: &TenantContext,
) -> Result<Vec<ResolvedRecipient>, ResolveError> {
    let mut recipients: Vec<ResolvedRecipient> = Vec::new();

    if ctx.effective_tenant_id != ctx.actor_id {
        if let Some(owner) = account_by_id(db, &ctx.effective_tenant_id).await? {
            recipients.push(owner.into());
        }
    }

    for member in accepted_members(db, &ctx.effective_tenant_id).await? {
        if member.member_id == ctx.actor_id {
            continue;
        }
        recipients.push(ResolvedRecipient {
            account_id: Some(member.member_id),
            email: member.email,
            display_name: member.display_name,
        });
    }

    if recipients.is_empty() {
        return Err(ResolveError::NoRecipients);
    }

    Ok(recipients)
}

/// The recipients an actor can address from the compose UI. Same union
/// as a broadcast but an empty roster is not an error here.
pub async fn addressable_recipients(
    db: &Connection,
    ctx: &TenantContext,
) -> Result<Vec<ResolvedRecipient>, anyhow::Error> {
    match resolve_broadcast(db, ctx).await {
        Ok(recipients) => Ok(recipients),
        Err(ResolveError::NoRecipients) => Ok(vec![]),
        Err(ResolveError::Db(err)) => Err(err),
        Err(err) => Err(anyhow::anyhow!("{}", err)),
    }
}
