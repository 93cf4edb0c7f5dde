use tracing::info;

use agora_activity::{ActivityRecord, Order, TimelineRenderer, factory, feed};
use agora_types::api::ActivityQuery;

use crate::error::{ApiError, join_error};
use crate::state::AppState;

/// Upper bound on feed lines returned in one listing.
pub const MAX_FEED_LIMIT: u32 = 200;

/// Rendered feed lines, newest first unless the query asks otherwise.
pub async fn list_activity(state: &AppState, query: ActivityQuery) -> Result<Vec<String>, ApiError> {
    let order = if query.oldest_first {
        Order::OldestFirst
    } else {
        Order::NewestFirst
    };
    let limit = query.limit.min(MAX_FEED_LIMIT) as usize;
    let records = state.activity.timeline(order, limit).await;

    // Author names are looked up per render, which hits the database
    let db = state.clone();
    let lines = tokio::task::spawn_blocking(move || {
        TimelineRenderer::new(&db.db, db.zone).render_all(&records)
    })
    .await
    .map_err(join_error)?;

    Ok(lines)
}

/// Rebuild the in-memory log from stored users, conversations and messages,
/// replacing whatever it held, so calling it again does not duplicate records.
///
/// Message titles are resolved against the conversations that exist now, so
/// a message whose conversation was removed comes back with the placeholder
/// title. Returns the number of records rebuilt, before the log's capacity applies.
pub async fn backfill(state: &AppState) -> Result<usize, ApiError> {
    let db = state.clone();
    let records = tokio::task::spawn_blocking(move || -> Result<Vec<ActivityRecord>, ApiError> {
        let users = db.db.all_users()?;
        let conversations = db.db.all_conversations()?;
        let messages = db.db.all_messages()?;

        let users: Vec<ActivityRecord> = users.iter().map(factory::from_user).collect();
        let conversations: Vec<ActivityRecord> =
            conversations.iter().map(factory::from_conversation).collect();
        let messages: Vec<ActivityRecord> = messages
            .iter()
            .map(|message| factory::from_message(message, &db.db).record)
            .collect();

        Ok(feed::merge_timeline(
            [users, conversations, messages],
            Order::OldestFirst,
        ))
    })
    .await
    .map_err(join_error)??;

    let count = records.len();
    state.activity.replace(records).await;
    info!("Backfilled {} activity records", count);
    Ok(count)
}
