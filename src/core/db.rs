//! Database connection and schema management
use anyhow::Result;
use tokio_rusqlite::Connection;

/// Open the async database connection under the storage path.
pub async fn async_db(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(format!("{}/shareflow.db", db_path)).await?;
    Ok(conn)
}

/// Create all tables and indices. Idempotent so it doubles as the
/// migration entrypoint for now.
pub fn initialize_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS account (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS team_member (
            owner_id TEXT NOT NULL,
            member_id TEXT NOT NULL,
            email TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'member',
            status TEXT NOT NULL DEFAULT 'invited',
            PRIMARY KEY (owner_id, member_id)
        );

        CREATE TABLE IF NOT EXISTS message (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL CHECK (type IN ('internal', 'external')),
            sender_id TEXT NOT NULL,
            recipient_id TEXT,
            to_email TEXT,
            from_name TEXT NOT NULL,
            subject TEXT NOT NULL,
            body TEXT NOT NULL,
            read INTEGER NOT NULL DEFAULT 0,
            starred INTEGER NOT NULL DEFAULT 0,
            archived INTEGER NOT NULL DEFAULT 0,
            email_status TEXT,
            email_id TEXT,
            parent_id TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_message_recipient
            ON message (recipient_id, archived, read);
        CREATE INDEX IF NOT EXISTS idx_message_sender
            ON message (sender_id, archived);
        CREATE INDEX IF NOT EXISTS idx_message_created_at
            ON message (created_at);

        CREATE TABLE IF NOT EXISTS notification (
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            metadata TEXT,
            seen INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_notification_account
            ON notification (account_id, seen);

        CREATE TABLE IF NOT EXISTS audit_log (
            id TEXT PRIMARY KEY,
            actor_id TEXT NOT NULL,
            action TEXT NOT NULL,
            metadata TEXT,
            ip_address TEXT,
            user_agent TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_audit_actor
            ON audit_log (actor_id, created_at);
        "#,
    )
}

/// Run the DB migration script
pub fn migrate_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    initialize_db(conn)
}
