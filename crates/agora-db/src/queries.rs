use crate::Database;
use crate::models::{ConversationRow, MessageRow, UserRow};
use agora_types::models::{Conversation, Message, User};
use anyhow::Result;
use rusqlite::{Connection, Row};
use tracing::warn;
use uuid::Uuid;

impl Database {
    // -- Users --

    pub fn add_user(&self, user: &User) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, created_at) VALUES (?1, ?2, ?3)",
                (user.id.to_string(), &user.username, user.created_at.to_rfc3339()),
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = self.with_conn(|conn| query_user_by_id(conn, &id.to_string()))?;
        row.map(UserRow::into_model).transpose()
    }

    pub fn is_user_registered(&self, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE username = ?1",
                [username],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    pub fn all_users(&self) -> Result<Vec<User>> {
        let rows = self.with_conn(|conn| {
            collect_rows(conn, "SELECT id, username, created_at FROM users", user_row)
        })?;
        Ok(into_models(rows, UserRow::into_model))
    }

    // -- Conversations --

    pub fn add_conversation(&self, conversation: &Conversation) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, owner_id, title, created_at) VALUES (?1, ?2, ?3, ?4)",
                (
                    conversation.id.to_string(),
                    conversation.owner_id.to_string(),
                    &conversation.title,
                    conversation.created_at.to_rfc3339(),
                ),
            )?;
            Ok(())
        })
    }

    pub fn get_conversation_by_id(&self, id: Uuid) -> Result<Option<Conversation>> {
        let row = self.with_conn(|conn| query_conversation_by_id(conn, &id.to_string()))?;
        row.map(ConversationRow::into_model).transpose()
    }

    /// Returns whether a conversation was removed. Messages that pointed at it
    /// are kept and become dangling references.
    pub fn remove_conversation(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM conversations WHERE id = ?1", [id.to_string()])?;
            Ok(removed > 0)
        })
    }

    pub fn all_conversations(&self) -> Result<Vec<Conversation>> {
        let rows = self.with_conn(|conn| {
            collect_rows(
                conn,
                "SELECT id, owner_id, title, created_at FROM conversations",
                conversation_row,
            )
        })?;
        Ok(into_models(rows, ConversationRow::into_model))
    }

    // -- Messages --

    pub fn add_message(&self, message: &Message) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, author_id, content, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    message.id.to_string(),
                    message.conversation_id.to_string(),
                    message.author_id.to_string(),
                    message.content,
                    message.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    pub fn all_messages(&self) -> Result<Vec<Message>> {
        let rows = self.with_conn(|conn| {
            collect_rows(
                conn,
                "SELECT id, conversation_id, author_id, content, created_at FROM messages ORDER BY created_at",
                message_row,
            )
        })?;
        Ok(into_models(rows, MessageRow::into_model))
    }
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn conversation_row(row: &Row<'_>) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        author_id: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare("SELECT id, username, created_at FROM users WHERE id = ?1")?;
    let row = stmt.query_row([id], user_row).optional()?;
    Ok(row)
}

fn query_conversation_by_id(conn: &Connection, id: &str) -> Result<Option<ConversationRow>> {
    let mut stmt =
        conn.prepare("SELECT id, owner_id, title, created_at FROM conversations WHERE id = ?1")?;
    let row = stmt.query_row([id], conversation_row).optional()?;
    Ok(row)
}

fn collect_rows<T>(
    conn: &Connection,
    sql: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], map)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Corrupt rows are skipped with a warning rather than failing the whole listing.
fn into_models<R, T>(rows: Vec<R>, convert: fn(R) -> Result<T>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match convert(row) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!("Skipping corrupt row: {:#}", e);
                None
            }
        })
        .collect()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
