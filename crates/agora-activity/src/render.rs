use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;
use uuid::Uuid;

use crate::UNKNOWN_USER;
use crate::factory::DanglingReference;
use crate::record::{ActivityKind, ActivityRecord};
use crate::resolver::{Lookup, ReferenceResolver};

/// US short date and time, e.g. `6/1/18 5:30 AM`.
const TIME_FORMAT: &str = "%-m/%-d/%y %-I:%M %p";

/// Turns activity records into feed lines such as
/// `6/1/18 5:30 AM PDT: Alice joined!`.
///
/// Author names are looked up through the resolver on every render.
pub struct TimelineRenderer<'a, R: ?Sized> {
    resolver: &'a R,
    zone: Tz,
}

impl<'a, R> TimelineRenderer<'a, R>
where
    R: ReferenceResolver + ?Sized,
{
    pub fn new(resolver: &'a R, zone: Tz) -> Self {
        Self { resolver, zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn render(&self, record: &ActivityRecord) -> String {
        let stamp = self.timestamp(record.created_at());

        match record.kind() {
            ActivityKind::ConversationCreated { title, author_id } => {
                let author = self.author_name(record.id(), *author_id);
                format!("{}: {} created a new conversation: {}", stamp, author, title)
            }
            ActivityKind::MessageSent {
                author_id,
                conversation_title,
                content,
                ..
            } => {
                let author = self.author_name(record.id(), *author_id);
                format!(
                    "{}: {} sent a message in {}: \"{}\"",
                    stamp, author, conversation_title, content
                )
            }
            ActivityKind::UserJoined { display_name } => {
                format!("{}: {} joined!", stamp, display_name)
            }
        }
    }

    pub fn render_all<'r, I>(&self, records: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'r ActivityRecord>,
    {
        records.into_iter().map(|record| self.render(record)).collect()
    }

    /// Formatted time followed by the configured zone's abbreviation at that
    /// instant (`PST` or `PDT` for America/Los_Angeles).
    pub fn timestamp(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&self.zone);
        format!("{} {}", local.format(TIME_FORMAT), local.format("%Z"))
    }

    fn author_name(&self, record_id: Uuid, author_id: Uuid) -> String {
        let dangling = match self.resolver.resolve_author_name(author_id) {
            Lookup::Found(name) => return name,
            Lookup::NotFound => DanglingReference::AuthorNotFound(author_id),
            Lookup::Unavailable => DanglingReference::AuthorUnavailable(author_id),
        };
        warn!("Rendering activity {} with placeholder author: {}", record_id, dangling);
        UNKNOWN_USER.to_string()
    }
}
