//! Activity records: one timeline over conversations being created,
//! messages being sent and users joining.

pub mod factory;
pub mod feed;
pub mod log;
pub mod record;
pub mod render;
pub mod resolver;

pub use factory::{Built, DanglingReference};
pub use feed::Order;
pub use log::ActivityLog;
pub use record::{ActivityKind, ActivityRecord, ActivityVariant};
pub use render::TimelineRenderer;
pub use resolver::{FixedTitle, Lookup, ReferenceResolver};

/// Stands in for a conversation title that could not be resolved.
pub const UNKNOWN_CONVERSATION: &str = "[unknown conversation]";

/// Stands in for an author name that could not be resolved.
pub const UNKNOWN_USER: &str = "[unknown user]";
