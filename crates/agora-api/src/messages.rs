use chrono::Utc;
use uuid::Uuid;

use agora_activity::factory;
use agora_types::api::{MessageResponse, SendMessageRequest};
use agora_types::models::Message;

use crate::error::{ApiError, join_error};
use crate::state::AppState;

/// Store a message and record it in the activity log. The conversation's
/// title is captured into the record at this point.
pub async fn send_message(
    state: &AppState,
    req: SendMessageRequest,
) -> Result<MessageResponse, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::EmptyContent);
    }

    let message = Message {
        id: Uuid::new_v4(),
        conversation_id: req.conversation_id,
        author_id: req.author_id,
        content: req.content,
        created_at: Utc::now(),
    };

    let db = state.clone();
    let stored = message.clone();
    let built = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        if db.db.get_user(stored.author_id)?.is_none() {
            return Err(ApiError::UnknownUser(stored.author_id));
        }
        if db.db.get_conversation_by_id(stored.conversation_id)?.is_none() {
            return Err(ApiError::UnknownConversation(stored.conversation_id));
        }
        db.db.add_message(&stored)?;
        // The conversation can disappear between the check and this lookup;
        // the factory then falls back to a placeholder title.
        Ok(factory::from_message(&stored, &db.db))
    })
    .await
    .map_err(join_error)??;

    state.activity.record(built.record).await;

    Ok(MessageResponse {
        id: message.id,
        conversation_id: message.conversation_id,
        author_id: message.author_id,
        content: message.content,
        created_at: message.created_at,
    })
}
