use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use agora_activity::factory;
use agora_types::api::{RegisterRequest, RegisterResponse};
use agora_types::models::User;

use crate::error::{ApiError, join_error};
use crate::state::AppState;

/// Register a user and announce that they joined.
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<RegisterResponse, ApiError> {
    if !is_valid_username(&req.username) {
        return Err(ApiError::InvalidUsername);
    }

    let user = User {
        id: Uuid::new_v4(),
        username: req.username,
        created_at: Utc::now(),
    };

    // Run blocking DB work off the async runtime
    let db = state.clone();
    let stored = user.clone();
    tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        if db.db.is_user_registered(&stored.username)? {
            return Err(ApiError::UsernameTaken(stored.username));
        }
        if let Err(e) = db.db.add_user(&stored) {
            // Lost a race with a concurrent registration of the same name
            if agora_db::is_constraint_violation(&e) {
                return Err(ApiError::UsernameTaken(stored.username));
            }
            return Err(e.into());
        }
        Ok(())
    })
    .await
    .map_err(join_error)??;

    info!("Registered user {} ({})", user.username, user.id);
    state.activity.record(factory::from_user(&user)).await;

    Ok(RegisterResponse { user_id: user.id })
}

/// 3-32 characters; ASCII letters, digits, underscores and whitespace only.
pub fn is_valid_username(username: &str) -> bool {
    let len = username.chars().count();
    (3..=32).contains(&len)
        && !username.trim().is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace())
}
