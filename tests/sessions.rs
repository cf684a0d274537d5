use chrono::Utc;
use tempfile::TempDir;

use sitechat::sessions::{ChatMessage, MessageRole, SessionStore, SqliteSessionStore};

fn message(role: MessageRole, content: &str) -> ChatMessage {
    ChatMessage {
        role,
        content: content.to_string(),
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn store_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("sessions.db");

    let id = {
        let store = SqliteSessionStore::open(&db_path).await.unwrap();
        let session = store
            .create_session("u1", "https://acme.example", "Acme", "en")
            .await
            .unwrap();
        let messages = vec![
            message(MessageRole::User, "What do you sell?"),
            message(MessageRole::Assistant, "Widgets."),
        ];
        store.update_messages(&session.id, &messages).await.unwrap();
        store.pool().close().await;
        session.id
    };

    let store = SqliteSessionStore::open(&db_path).await.unwrap();
    let loaded = store.get_session(&id).await.unwrap().unwrap();
    assert_eq!(loaded.website_title, "Acme");
    assert_eq!(loaded.messages.len(), 2);
    assert_eq!(loaded.messages[1].role, MessageRole::Assistant);
    assert_eq!(loaded.messages[1].content, "Widgets.");
}

#[tokio::test]
async fn listing_is_per_user_most_recent_first() {
    let dir = TempDir::new().unwrap();
    let store = SqliteSessionStore::open(&dir.path().join("sessions.db"))
        .await
        .unwrap();

    let first = store
        .create_session("u1", "https://a.example", "A", "en")
        .await
        .unwrap();
    let second = store
        .create_session("u1", "https://b.example", "B", "hi")
        .await
        .unwrap();
    store
        .create_session("u2", "https://c.example", "C", "en")
        .await
        .unwrap();

    // Updating the first session moves it to the top.
    store
        .update_messages(&first.id, &[message(MessageRole::User, "hi")])
        .await
        .unwrap();

    let sessions = store.list_sessions("u1", 10, 0).await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, first.id);
    assert_eq!(sessions[1].id, second.id);

    let page = store.list_sessions("u1", 1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, second.id);
}

#[tokio::test]
async fn delete_all_clears_only_one_user() {
    let dir = TempDir::new().unwrap();
    let store = SqliteSessionStore::open(&dir.path().join("sessions.db"))
        .await
        .unwrap();

    for url in ["https://a.example", "https://b.example"] {
        store.create_session("u1", url, "T", "en").await.unwrap();
    }
    let kept = store
        .create_session("u2", "https://c.example", "C", "te")
        .await
        .unwrap();

    assert_eq!(store.delete_all_sessions("u1").await.unwrap(), 2);
    assert!(store.list_sessions("u1", 10, 0).await.unwrap().is_empty());
    assert!(store.get_session(&kept.id).await.unwrap().is_some());
}
