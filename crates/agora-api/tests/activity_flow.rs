/// Integration test: register users, start a conversation, post messages and
/// read the rendered feed back through the controllers.

use agora_activity::{ActivityVariant, Order, UNKNOWN_CONVERSATION};
use agora_api::activity::{MAX_FEED_LIMIT, backfill, list_activity};
use agora_api::conversations::start_conversation;
use agora_api::error::ApiError;
use agora_api::messages::send_message;
use agora_api::register::register;
use agora_api::state::{AppState, AppStateInner};
use agora_db::{DEFAULT_LOOKUP_TIMEOUT, Database};
use agora_types::api::{
    ActivityQuery, CreateConversationRequest, RegisterRequest, SendMessageRequest,
};
use uuid::Uuid;

fn state() -> AppState {
    let db = Database::open_in_memory(DEFAULT_LOOKUP_TIMEOUT).unwrap();
    AppStateInner::new(db, chrono_tz::UTC)
}

async fn join(state: &AppState, name: &str) -> Uuid {
    register(
        state,
        RegisterRequest {
            username: name.to_string(),
        },
    )
    .await
    .unwrap()
    .user_id
}

fn oldest_first() -> ActivityQuery {
    ActivityQuery {
        limit: 50,
        oldest_first: true,
    }
}

#[tokio::test]
async fn full_conversation_shows_up_in_feed() {
    let state = state();
    let bob = join(&state, "Bob").await;
    let alice = join(&state, "Alice").await;

    let conversation = start_conversation(
        &state,
        CreateConversationRequest {
            owner_id: bob,
            title: "Book Club".into(),
        },
    )
    .await
    .unwrap();

    send_message(
        &state,
        SendMessageRequest {
            conversation_id: conversation.id,
            author_id: alice,
            content: "chapter 3 tonight".into(),
        },
    )
    .await
    .unwrap();

    let lines = list_activity(&state, oldest_first()).await.unwrap();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].ends_with(": Bob joined!"), "{}", lines[0]);
    assert!(lines[1].ends_with(": Alice joined!"), "{}", lines[1]);
    assert!(lines[2].ends_with(": Bob created a new conversation: Book Club"), "{}", lines[2]);
    assert!(
        lines[3].ends_with(": Alice sent a message in Book Club: \"chapter 3 tonight\""),
        "{}",
        lines[3]
    );
    assert!(lines.iter().all(|line| line.contains(" UTC: ")));

    let newest = list_activity(
        &state,
        ActivityQuery {
            limit: 50,
            oldest_first: false,
        },
    )
    .await
    .unwrap();
    let mut newest_sorted = newest.clone();
    newest_sorted.sort();
    let mut oldest_sorted = lines.clone();
    oldest_sorted.sort();
    assert_eq!(newest_sorted, oldest_sorted);

    let page = list_activity(
        &state,
        ActivityQuery {
            limit: 1,
            oldest_first: false,
        },
    )
    .await
    .unwrap();
    assert_eq!(page, newest[..1]);
}

#[tokio::test]
async fn registration_rejects_taken_and_invalid_names() {
    let state = state();
    join(&state, "Alice").await;

    let taken = register(
        &state,
        RegisterRequest {
            username: "Alice".into(),
        },
    )
    .await;
    assert!(matches!(taken, Err(ApiError::UsernameTaken(name)) if name == "Alice"));

    let invalid = register(
        &state,
        RegisterRequest {
            username: "no!".into(),
        },
    )
    .await;
    assert!(matches!(invalid, Err(ApiError::InvalidUsername)));

    assert_eq!(state.activity.len().await, 1);
}

#[tokio::test]
async fn rejected_writes_record_nothing() {
    let state = state();
    let alice = join(&state, "Alice").await;

    let orphan = start_conversation(
        &state,
        CreateConversationRequest {
            owner_id: Uuid::new_v4(),
            title: "Nobody's".into(),
        },
    )
    .await;
    assert!(matches!(orphan, Err(ApiError::UnknownUser(_))));

    let nowhere = Uuid::new_v4();
    let lost = send_message(
        &state,
        SendMessageRequest {
            conversation_id: nowhere,
            author_id: alice,
            content: "hello?".into(),
        },
    )
    .await;
    assert!(matches!(lost, Err(ApiError::UnknownConversation(id)) if id == nowhere));

    let blank = send_message(
        &state,
        SendMessageRequest {
            conversation_id: nowhere,
            author_id: alice,
            content: "   ".into(),
        },
    )
    .await;
    assert!(matches!(blank, Err(ApiError::EmptyContent)));

    assert_eq!(state.activity.len().await, 1);
}

#[tokio::test]
async fn subscribers_receive_new_activity() {
    let state = state();
    let mut rx = state.activity.subscribe();

    let alice = join(&state, "Alice").await;

    let record = rx.recv().await.unwrap();
    assert_eq!(record.variant(), ActivityVariant::UserJoined);
    assert_eq!(record.id(), alice);
}

#[tokio::test]
async fn backfill_rebuilds_feed_and_marks_removed_conversations() {
    let state = state();
    let bob = join(&state, "Bob").await;
    let conversation = start_conversation(
        &state,
        CreateConversationRequest {
            owner_id: bob,
            title: "Book Club".into(),
        },
    )
    .await
    .unwrap();
    send_message(
        &state,
        SendMessageRequest {
            conversation_id: conversation.id,
            author_id: bob,
            content: "first!".into(),
        },
    )
    .await
    .unwrap();

    // The live record keeps its snapshot after the conversation goes away
    assert!(state.db.remove_conversation(conversation.id).unwrap());
    let live = list_activity(&state, oldest_first()).await.unwrap();
    assert!(live[2].contains("in Book Club"), "{}", live[2]);

    // A fresh process sharing the same store rebuilds from what is left
    let restarted = AppStateInner::new(
        Database::open_in_memory(DEFAULT_LOOKUP_TIMEOUT).unwrap(),
        chrono_tz::UTC,
    );
    for user in state.db.all_users().unwrap() {
        restarted.db.add_user(&user).unwrap();
    }
    for message in state.db.all_messages().unwrap() {
        restarted.db.add_message(&message).unwrap();
    }

    let added = backfill(&restarted).await.unwrap();
    assert_eq!(added, 2);

    let records = restarted.activity.timeline(Order::OldestFirst, 10).await;
    assert_eq!(records[0].variant(), ActivityVariant::UserJoined);
    assert_eq!(records[1].variant(), ActivityVariant::MessageSent);

    let rebuilt = list_activity(&restarted, oldest_first()).await.unwrap();
    assert!(rebuilt[1].contains(UNKNOWN_CONVERSATION), "{}", rebuilt[1]);
    assert!(rebuilt[1].contains("Bob sent a message"), "{}", rebuilt[1]);
}

#[tokio::test]
async fn backfill_twice_does_not_duplicate() {
    let state = state();
    let bob = join(&state, "Bob").await;
    start_conversation(
        &state,
        CreateConversationRequest {
            owner_id: bob,
            title: "Book Club".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(state.activity.len().await, 2);

    assert_eq!(backfill(&state).await.unwrap(), 2);
    assert_eq!(backfill(&state).await.unwrap(), 2);
    assert_eq!(state.activity.len().await, 2);
    assert_eq!(list_activity(&state, oldest_first()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn activity_log_is_bounded_by_feed_limit() {
    let state = state();
    assert_eq!(state.activity.capacity(), MAX_FEED_LIMIT as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_of_one_name_admit_one() {
    let state = state();
    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            register(
                &state,
                RegisterRequest {
                    username: "Dupe".into(),
                },
            )
            .await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(ApiError::UsernameTaken(name)) => assert_eq!(name, "Dupe"),
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(state.activity.len().await, 1);
}
