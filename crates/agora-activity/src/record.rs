use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Something that happened, tied to exactly one source entity.
///
/// Records are built by [`crate::factory`] and never change afterwards.
/// Variant data is only reachable through [`ActivityRecord::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    id: Uuid,
    created_at: DateTime<Utc>,
    kind: ActivityKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ActivityKind {
    /// A conversation was started
    ConversationCreated { title: String, author_id: Uuid },

    /// A message was posted. `conversation_title` is the title at the time
    /// the record was built, not a live reference.
    MessageSent {
        author_id: Uuid,
        conversation_id: Uuid,
        conversation_title: String,
        content: String,
    },

    /// A user registered
    UserJoined { display_name: String },
}

/// Discriminator of an [`ActivityKind`], without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActivityVariant {
    ConversationCreated,
    MessageSent,
    UserJoined,
}

impl ActivityRecord {
    /// Timestamps are truncated to whole seconds.
    pub(crate) fn new(id: Uuid, created_at: DateTime<Utc>, kind: ActivityKind) -> Self {
        Self {
            id,
            created_at: created_at.trunc_subsecs(0),
            kind,
        }
    }

    pub fn variant(&self) -> ActivityVariant {
        self.kind.variant()
    }

    /// Seconds since the Unix epoch.
    pub fn creation_time(&self) -> i64 {
        self.created_at.timestamp()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Id of the underlying user, conversation or message.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &ActivityKind {
        &self.kind
    }
}

impl ActivityKind {
    pub fn variant(&self) -> ActivityVariant {
        match self {
            Self::ConversationCreated { .. } => ActivityVariant::ConversationCreated,
            Self::MessageSent { .. } => ActivityVariant::MessageSent,
            Self::UserJoined { .. } => ActivityVariant::UserJoined,
        }
    }
}
