use anyhow::{Error, Result};
use chrono::{SecondsFormat, Utc};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::models::{NewNotification, Notification};

pub async fn insert_notification(
    db: &Connection,
    notification: NewNotification,
) -> Result<(), Error> {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    db.call(move |conn| {
        let metadata = notification
            .metadata
            .as_ref()
            .map(|m| m.to_string());
        let mut stmt = conn.prepare(
            r"
            INSERT INTO notification (id, account_id, kind, title, body, metadata, seen, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
            ",
        )?;
        stmt.execute(tokio_rusqlite::params![
            id,
            notification.account_id,
            notification.kind,
            notification.title,
            notification.body,
            metadata,
            created_at,
        ])?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn list_notifications(
    db: &Connection,
    account_id: &str,
    limit: i64,
) -> Result<Vec<Notification>, Error> {
    let account_id = account_id.to_string();
    let notifications = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT id, account_id, kind, title, body, metadata, seen, created_at
                FROM notification
                WHERE account_id = ?1
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?2
                ",
            )?;
            let rows = stmt
                .query_map(tokio_rusqlite::params![account_id, limit], |row| {
                    let metadata: Option<String> = row.get(5)?;
                    Ok(Notification {
                        id: row.get(0)?,
                        account_id: row.get(1)?,
                        kind: row.get(2)?,
                        title: row.get(3)?,
                        body: row.get(4)?,
                        metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
                        seen: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                })?
                .filter_map(Result::ok)
                .collect::<Vec<Notification>>();
            Ok(rows)
        })
        .await?;
    Ok(notifications)
}

/// Mark every unseen notification for an account as seen. Returns the
/// number of rows updated.
pub async fn mark_all_seen(db: &Connection, account_id: &str) -> Result<usize, Error> {
    let account_id = account_id.to_string();
    let updated = db
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE notification SET seen = 1 WHERE account_id = ?1 AND seen = 0",
                [account_id],
            )?;
            Ok(updated)
        })
        .await?;
    Ok(updated)
}
