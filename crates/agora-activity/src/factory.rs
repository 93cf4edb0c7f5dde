//! Builds activity records from freshly persisted entities.
//!
//! A message's conversation title is resolved once, here, and kept as a
//! snapshot: the record keeps showing the title it was posted under even if
//! the conversation is later renamed or removed. Author names are not
//! captured; they are resolved when the record is rendered.

use agora_types::models::{Conversation, Message, User};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::UNKNOWN_CONVERSATION;
use crate::record::{ActivityKind, ActivityRecord};
use crate::resolver::{FixedTitle, Lookup, ReferenceResolver};

/// A reference that could not be followed while building or rendering a
/// record. Reported alongside the record, never instead of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DanglingReference {
    #[error("conversation {0} not found")]
    ConversationNotFound(Uuid),
    #[error("conversation {0} could not be looked up")]
    ConversationUnavailable(Uuid),
    #[error("user {0} not found")]
    AuthorNotFound(Uuid),
    #[error("user {0} could not be looked up")]
    AuthorUnavailable(Uuid),
}

/// A record plus the diagnostic raised while building it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Built {
    pub record: ActivityRecord,
    pub dangling: Option<DanglingReference>,
}

pub fn from_conversation(conversation: &Conversation) -> ActivityRecord {
    ActivityRecord::new(
        conversation.id,
        conversation.created_at,
        ActivityKind::ConversationCreated {
            title: conversation.title.clone(),
            author_id: conversation.owner_id,
        },
    )
}

pub fn from_user(user: &User) -> ActivityRecord {
    ActivityRecord::new(
        user.id,
        user.created_at,
        ActivityKind::UserJoined {
            display_name: user.username.clone(),
        },
    )
}

/// Never fails: an unresolvable conversation becomes
/// [`UNKNOWN_CONVERSATION`] and is reported in [`Built::dangling`].
pub fn from_message<R>(message: &Message, resolver: &R) -> Built
where
    R: ReferenceResolver + ?Sized,
{
    let (conversation_title, dangling) =
        match resolver.resolve_conversation_title(message.conversation_id) {
            Lookup::Found(title) => (title, None),
            Lookup::NotFound => (
                UNKNOWN_CONVERSATION.to_string(),
                Some(DanglingReference::ConversationNotFound(message.conversation_id)),
            ),
            Lookup::Unavailable => (
                UNKNOWN_CONVERSATION.to_string(),
                Some(DanglingReference::ConversationUnavailable(message.conversation_id)),
            ),
        };

    if let Some(reason) = &dangling {
        warn!("Message {} recorded with placeholder title: {}", message.id, reason);
    }

    let record = ActivityRecord::new(
        message.id,
        message.created_at,
        ActivityKind::MessageSent {
            author_id: message.author_id,
            conversation_id: message.conversation_id,
            conversation_title,
            content: message.content.clone(),
        },
    );

    Built { record, dangling }
}

/// Build a message record under a caller-supplied title, for messages that
/// no stored conversation backs (fixtures, imports).
pub fn from_message_with_title(message: &Message, title: &str) -> ActivityRecord {
    from_message(message, &FixedTitle(title)).record
}
