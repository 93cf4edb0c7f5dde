use agora_db::Database;
use tracing::warn;
use uuid::Uuid;

/// Outcome of resolving a reference to an entity the caller does not own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    /// The store answered and the entity is not there.
    NotFound,
    /// The store did not answer in time, or failed.
    Unavailable,
}

/// Read-only lookups used while building and rendering activity records.
///
/// Implementations must not panic; every failure is reported as
/// [`Lookup::NotFound`] or [`Lookup::Unavailable`].
pub trait ReferenceResolver {
    fn resolve_author_name(&self, user_id: Uuid) -> Lookup<String>;

    fn resolve_conversation_title(&self, conversation_id: Uuid) -> Lookup<String>;
}

impl ReferenceResolver for Database {
    fn resolve_author_name(&self, user_id: Uuid) -> Lookup<String> {
        match self.get_user(user_id) {
            Ok(Some(user)) => Lookup::Found(user.username),
            Ok(None) => Lookup::NotFound,
            Err(e) => {
                warn!("User lookup for {} failed: {:#}", user_id, e);
                Lookup::Unavailable
            }
        }
    }

    fn resolve_conversation_title(&self, conversation_id: Uuid) -> Lookup<String> {
        match self.get_conversation_by_id(conversation_id) {
            Ok(Some(conversation)) => Lookup::Found(conversation.title),
            Ok(None) => Lookup::NotFound,
            Err(e) => {
                warn!("Conversation lookup for {} failed: {:#}", conversation_id, e);
                Lookup::Unavailable
            }
        }
    }
}

/// Resolver that answers every conversation lookup with the same title.
/// Used to build message records that no stored conversation backs.
#[derive(Debug, Clone, Copy)]
pub struct FixedTitle<'a>(pub &'a str);

impl ReferenceResolver for FixedTitle<'_> {
    fn resolve_author_name(&self, _user_id: Uuid) -> Lookup<String> {
        Lookup::NotFound
    }

    fn resolve_conversation_title(&self, _conversation_id: Uuid) -> Lookup<String> {
        Lookup::Found(self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_db::DEFAULT_LOOKUP_TIMEOUT;
    use agora_types::models::{Conversation, User};
    use chrono::Utc;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn database_resolves_and_reports_absence() {
        let db = Database::open_in_memory(DEFAULT_LOOKUP_TIMEOUT).unwrap();
        let bob = User {
            id: Uuid::new_v4(),
            username: "Bob".into(),
            created_at: Utc::now(),
        };
        db.add_user(&bob).unwrap();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            owner_id: bob.id,
            title: "Book Club".into(),
            created_at: Utc::now(),
        };
        db.add_conversation(&conversation).unwrap();

        assert_eq!(db.resolve_author_name(bob.id), Lookup::Found("Bob".into()));
        assert_eq!(
            db.resolve_conversation_title(conversation.id),
            Lookup::Found("Book Club".into())
        );
        assert_eq!(db.resolve_author_name(Uuid::new_v4()), Lookup::NotFound);
        assert_eq!(db.resolve_conversation_title(Uuid::new_v4()), Lookup::NotFound);
    }

    #[test]
    fn busy_database_is_unavailable_not_hung() {
        let db = Arc::new(Database::open_in_memory(Duration::from_millis(10)).unwrap());

        let (locked_tx, locked_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let holder = {
            let db = db.clone();
            std::thread::spawn(move || {
                db.with_conn(|_| {
                    locked_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    Ok(())
                })
                .unwrap();
            })
        };

        locked_rx.recv().unwrap();
        assert_eq!(db.resolve_author_name(Uuid::new_v4()), Lookup::Unavailable);

        release_tx.send(()).unwrap();
        holder.join().unwrap();
    }

    #[test]
    fn fixed_title_only_knows_the_title() {
        let resolver = FixedTitle("Fixture");
        assert_eq!(
            resolver.resolve_conversation_title(Uuid::new_v4()),
            Lookup::Found("Fixture".into())
        );
        assert_eq!(resolver.resolve_author_name(Uuid::new_v4()), Lookup::NotFound);
    }
}
