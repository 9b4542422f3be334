use anyhow::{Error, Result};
use chrono::{SecondsFormat, Utc};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::models::{AuditEntry, NewAuditEntry};

pub async fn insert_audit_entry(db: &Connection, entry: NewAuditEntry) -> Result<(), Error> {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    db.call(move |conn| {
        let metadata = entry.metadata.as_ref().map(|m| m.to_string());
        let mut stmt = conn.prepare(
            r"
            INSERT INTO audit_log (id, actor_id, action, metadata, ip_address, user_agent, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )?;
        stmt.execute(tokio_rusqlite::params![
            id,
            entry.actor_id,
            entry.action.as_str(),
            metadata,
            entry.ip_address,
            entry.user_agent,
            created_at,
        ])?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn entries_for_actor(
    db: &Connection,
    actor_id: &str,
    limit: i64,
) -> Result<Vec<AuditEntry>, Error> {
    let actor_id = actor_id.to_string();
    let entries = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT id, actor_id, action, metadata, ip_address, user_agent, created_at
                FROM audit_log
                WHERE actor_id = ?1
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?2
                ",
            )?;
            let rows = stmt
                .query_map(tokio_rusqlite::params![actor_id, limit], |row| {
                    let metadata: Option<String> = row.get(3)?;
                    Ok(AuditEntry {
                        id: row.get(0)?,
                        actor_id: row.get(1)?,
                        action: row.get(2)?,
                        metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
                        ip_address: row.get(4)?,
                        user_agent: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .filter_map(Result::ok)
                .collect::<Vec<AuditEntry>>();
            Ok(rows)
        })
        .await?;
    Ok(entries)
}
