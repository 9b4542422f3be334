//! Database queries for the message ledger
use anyhow::{Error, Result};
use chrono::{SecondsFormat, Utc};
use tokio_rusqlite::{Connection, params};
use uuid::Uuid;

use super::public::{Channel, ChannelFilter, EmailStatus, Folder, InvalidEnumValue, Message, UnreadCounts};

const MESSAGE_COLUMNS: &str = r"
    id, type, sender_id, recipient_id, to_email, from_name, subject, body,
    read, starred, archived, email_status, email_id, parent_id, created_at
";

// Shared predicate for list and count. Folder selects the inbox
// (recipient) or sent (sender) view; archived rows are never visible.
// SQLite's lower() folds ASCII only, so search is case-insensitive
// for ASCII terms and exact-case for anything beyond.
const LIST_PREDICATE: &str = r"
    archived = 0
    AND ((?1 = 'inbox' AND recipient_id = ?2) OR (?1 = 'sent' AND sender_id = ?2))
    AND (?3 IS NULL OR type = ?3)
    AND (?4 IS NULL
         OR instr(lower(subject), ?4) > 0
         OR instr(lower(body), ?4) > 0
         OR instr(lower(from_name), ?4) > 0
         OR instr(lower(coalesce(to_email, '')), ?4) > 0)
";

#[derive(Debug, Clone)]
pub struct ListFilter {
    pub user_id: String,
    pub folder: Folder,
    pub kind: Option<ChannelFilter>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: String,
    pub from_name: String,
    pub subject: String,
    pub body: String,
    pub parent_id: Option<String>,
    pub channel: Channel,
}

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let kind: String = row.get(1)?;
    let channel = match kind.as_str() {
        "internal" => Channel::Internal {
            recipient_id: row.get(3)?,
        },
        "external" => {
            let status: String = row.get(11)?;
            let email_status = status.parse().map_err(|err: InvalidEnumValue| {
                rusqlite::Error::FromSqlConversionFailure(
                    11,
                    rusqlite::types::Type::Text,
                    Box::new(err),
                )
            })?;
            Channel::External {
                to_email: row.get(4)?,
                recipient_id: row.get(3)?,
                email_status,
                email_id: row.get(12)?,
            }
        }
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                Box::new(InvalidEnumValue(other.to_string())),
            ));
        }
    };

    Ok(Message {
        id: row.get(0)?,
        sender_id: row.get(2)?,
        from_name: row.get(5)?,
        subject: row.get(6)?,
        body: row.get(7)?,
        read: row.get(8)?,
        starred: row.get(9)?,
        archived: row.get(10)?,
        parent_id: row.get(13)?,
        created_at: row.get(14)?,
        channel,
    })
}

/// Append a message row and return it. Read/star/archive state always
/// starts cleared.
pub async fn insert_message(db: &Connection, new: NewMessage) -> Result<Message, Error> {
    let message = Message {
        id: Uuid::new_v4().to_string(),
        sender_id: new.sender_id,
        from_name: new.from_name,
        subject: new.subject,
        body: new.body,
        read: false,
        starred: false,
        archived: false,
        parent_id: new.parent_id,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        channel: new.channel,
    };

    let row = message.clone();
    db.call(move |conn| {
        let (recipient_id, to_email, email_status, email_id) = match &row.channel {
            Channel::Internal { recipient_id } => {
                (Some(recipient_id.clone()), None, None, None)
            }
            Channel::External {
                to_email,
                recipient_id,
                email_status,
                email_id,
            } => (
                recipient_id.clone(),
                Some(to_email.clone()),
                Some(email_status.as_str().to_string()),
                email_id.clone(),
            ),
        };
        let mut stmt = conn.prepare(
            r"
            INSERT INTO message
                (id, type, sender_id, recipient_id, to_email, from_name,
                 subject, body, email_status, email_id, parent_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
        )?;
        stmt.execute(params![
            row.id,
            row.channel.kind(),
            row.sender_id,
            recipient_id,
            to_email,
            row.from_name,
            row.subject,
            row.body,
            email_status,
            email_id,
            row.parent_id,
            row.created_at,
        ])?;
        Ok(())
    })
    .await?;

    Ok(message)
}

pub async fn list_messages(
    db: &Connection,
    filter: ListFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Message>, Error> {
    let messages = db
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                r"
                SELECT {}
                FROM message
                WHERE {}
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?5 OFFSET ?6
                ",
                MESSAGE_COLUMNS, LIST_PREDICATE,
            ))?;
            let messages = stmt
                .query_map(
                    params![
                        filter.folder.as_str(),
                        filter.user_id,
                        filter.kind.map(|k| k.as_str()),
                        filter.search.map(|s| s.to_lowercase()),
                        limit,
                        offset,
                    ],
                    message_from_row,
                )?
                .filter_map(Result::ok)
                .collect::<Vec<Message>>();
            Ok(messages)
        })
        .await?;
    Ok(messages)
}

/// Count under the same filters as [`list_messages`], unbounded by
/// pagination. Used to compute total pages.
pub async fn count_messages(db: &Connection, filter: ListFilter) -> Result<i64, Error> {
    let count = db
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT COUNT(*) FROM message WHERE {}",
                LIST_PREDICATE,
            ))?;
            let count: i64 = stmt.query_row(
                params![
                    filter.folder.as_str(),
                    filter.user_id,
                    filter.kind.map(|k| k.as_str()),
                    filter.search.map(|s| s.to_lowercase()),
                ],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await?;
    Ok(count)
}

/// Set the read flag. Only the recipient may do this; a sender or
/// stranger sees the same "no such message" outcome.
pub async fn mark_read(db: &Connection, user_id: &str, message_id: &str) -> Result<bool, Error> {
    let user_id = user_id.to_string();
    let message_id = message_id.to_string();
    let updated = db
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE message SET read = 1 WHERE id = ?1 AND recipient_id = ?2",
                params![message_id, user_id],
            )?;
            Ok(updated)
        })
        .await?;
    Ok(updated > 0)
}

/// Flip the starred flag and return the new value, or `None` when the
/// actor is neither sender nor recipient of an existing message.
pub async fn toggle_star(
    db: &Connection,
    user_id: &str,
    message_id: &str,
) -> Result<Option<bool>, Error> {
    let user_id = user_id.to_string();
    let message_id = message_id.to_string();
    let starred = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
                UPDATE message SET starred = 1 - starred
                WHERE id = ?1 AND (sender_id = ?2 OR recipient_id = ?2)
                RETURNING starred
                ",
            )?;
            let starred = match stmt.query_row(params![message_id, user_id], |row| row.get(0)) {
                Ok(starred) => Some(starred),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(err) => return Err(err.into()),
            };
            Ok(starred)
        })
        .await?;
    Ok(starred)
}

/// Soft-delete. Idempotent: archiving an archived message is a no-op
/// that still reports success.
pub async fn archive(db: &Connection, user_id: &str, message_id: &str) -> Result<bool, Error> {
    let user_id = user_id.to_string();
    let message_id = message_id.to_string();
    let updated = db
        .call(move |conn| {
            let updated = conn.execute(
                r"
                UPDATE message SET archived = 1
                WHERE id = ?1 AND (sender_id = ?2 OR recipient_id = ?2)
                ",
                params![message_id, user_id],
            )?;
            Ok(updated)
        })
        .await?;
    Ok(updated > 0)
}

pub async fn unread_counts(db: &Connection, user_id: &str) -> Result<UnreadCounts, Error> {
    let user_id = user_id.to_string();
    let counts = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT
                    COUNT(CASE WHEN type = 'internal' THEN 1 END),
                    COUNT(CASE WHEN type = 'external' THEN 1 END)
                FROM message
                WHERE recipient_id = ?1 AND read = 0 AND archived = 0
                ",
            )?;
            let (internal, external) = stmt.query_row([user_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            })?;
            Ok(UnreadCounts {
                internal,
                external,
                total: internal + external,
            })
        })
        .await?;
    Ok(counts)
}

/// Record the terminal delivery outcome for an external message.
pub async fn set_email_status(
    db: &Connection,
    message_id: &str,
    status: EmailStatus,
    email_id: Option<String>,
) -> Result<(), Error> {
    let message_id = message_id.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE message SET email_status = ?2, email_id = ?3 WHERE id = ?1",
            params![message_id, status.as_str(), email_id],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}
