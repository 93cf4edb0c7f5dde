use chrono::Utc;
use uuid::Uuid;

use agora_activity::factory;
use agora_types::api::{ConversationResponse, CreateConversationRequest};
use agora_types::models::Conversation;

use crate::error::{ApiError, join_error};
use crate::state::AppState;

pub async fn start_conversation(
    state: &AppState,
    req: CreateConversationRequest,
) -> Result<ConversationResponse, ApiError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::EmptyTitle);
    }

    let conversation = Conversation {
        id: Uuid::new_v4(),
        owner_id: req.owner_id,
        title: title.to_string(),
        created_at: Utc::now(),
    };

    let db = state.clone();
    let stored = conversation.clone();
    tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        if db.db.get_user(stored.owner_id)?.is_none() {
            return Err(ApiError::UnknownUser(stored.owner_id));
        }
        db.db.add_conversation(&stored)?;
        Ok(())
    })
    .await
    .map_err(join_error)??;

    state
        .activity
        .record(factory::from_conversation(&conversation))
        .await;

    Ok(ConversationResponse {
        id: conversation.id,
        owner_id: conversation.owner_id,
        title: conversation.title,
        created_at: conversation.created_at,
    })
}
