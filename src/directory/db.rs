//! Queries against the collaborator-owned account and team tables
use tokio_rusqlite::Connection;

#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct TeamMember {
    pub member_id: String,
    pub email: String,
    pub role: String,
    pub display_name: Option<String>,
}

pub async fn account_by_id(
    db: &Connection,
    id: &str,
) -> Result<Option<Account>, tokio_rusqlite::Error> {
    let id = id.to_string();
    db.call(move |conn| {
        let mut stmt = conn.prepare("SELECT id, email, display_name FROM account WHERE id = ?1")?;
        let account = stmt
            .query_map([id], |row| {
                Ok(Account {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    display_name: row.get(2)?,
                })
            })?
            .filter_map(Result::ok)
            .next();
        Ok(account)
    })
    .await
}

pub async fn account_by_email(
    db: &Connection,
    email: &str,
) -> Result<Option<Account>, tokio_rusqlite::Error> {
    let email = email.to_string();
    db.call(move |conn| {
        let mut stmt =
            conn.prepare("SELECT id, email, display_name FROM account WHERE email = ?1")?;
        let account = stmt
            .query_map([email], |row| {
                Ok(Account {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    display_name: row.get(2)?,
                })
            })?
            .filter_map(Result::ok)
            .next();
        Ok(account)
    })
    .await
}

/// The tenant whose roster and sharing context applies to this actor:
/// their organization owner if they are an accepted team member,
/// otherwise themselves. Returns the tenant id and the actor's role.
pub async fn effective_tenant(
    db: &Connection,
    actor_id: &str,
) -> Result<(String, String), tokio_rusqlite::Error> {
    let actor = actor_id.to_string();
    let actor_fallback = actor.clone();
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT owner_id, role FROM team_member WHERE member_id = ?1 AND status = 'accepted' LIMIT 1",
        )?;
        let membership = stmt
            .query_map([actor], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .filter_map(Result::ok)
            .next();
        Ok(membership.unwrap_or((actor_fallback, "owner".to_string())))
    })
    .await
}

/// All accepted members under an owner, with the display name joined in
/// from the account table when the member has one.
pub async fn accepted_members(
    db: &Connection,
    owner_id: &str,
) -> Result<Vec<TeamMember>, tokio_rusqlite::Error> {
    let owner_id = owner_id.to_string();
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            r"
            SELECT tm.member_id, tm.email, tm.role, a.display_name
            FROM team_member tm
            LEFT JOIN account a ON a.id = tm.member_id
            WHERE tm.owner_id = ?1 AND tm.status = 'accepted'
            ",
        )?;
        let members = stmt
            .query_map([owner_id], |row| {
                Ok(TeamMember {
                    member_id: row.get(0)?,
                    email: row.get(1)?,
                    role: row.get(2)?,
                    display_name: row.get(3)?,
                })
            })?
            .filter_map(Result::ok)
            .collect::<Vec<TeamMember>>();
        Ok(members)
    })
    .await
}
