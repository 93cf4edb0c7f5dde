//! Database row types. These map directly to SQLite rows and are kept
//! distinct from the agora-types models so the DB layer stays independent.

use agora_types::models::{Conversation, Message, User};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

pub struct ConversationRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
}

impl UserRow {
    pub fn into_model(self) -> Result<User> {
        Ok(User {
            id: parse_id(&self.id)?,
            username: self.username,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl ConversationRow {
    pub fn into_model(self) -> Result<Conversation> {
        Ok(Conversation {
            id: parse_id(&self.id)?,
            owner_id: parse_id(&self.owner_id)?,
            title: self.title,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl MessageRow {
    pub fn into_model(self) -> Result<Message> {
        Ok(Message {
            id: parse_id(&self.id)?,
            conversation_id: parse_id(&self.conversation_id)?,
            author_id: parse_id(&self.author_id)?,
            content: self.content,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse().with_context(|| format!("Corrupt id '{}'", raw))
}

/// Accepts RFC 3339 as written by the app, or SQLite's own
/// "YYYY-MM-DD HH:MM:SS" (naive UTC) from the column default.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .with_context(|| format!("Corrupt created_at '{}'", raw))
}
