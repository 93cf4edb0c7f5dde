use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("username must be 3-32 characters of letters, digits, underscores or spaces")]
    InvalidUsername,
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("user {0} not found")]
    UnknownUser(Uuid),
    #[error("conversation {0} not found")]
    UnknownConversation(Uuid),
    #[error("conversation title must not be empty")]
    EmptyTitle,
    #[error("message content must not be empty")]
    EmptyContent,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub(crate) fn join_error(e: JoinError) -> ApiError {
    error!("spawn_blocking join error: {}", e);
    ApiError::Internal(e.into())
}
