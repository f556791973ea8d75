//! Integration tests for context assembly against a real store.

use mentor::config::{ContextConfig, DatabaseConfig};
use mentor::context::ContextAssembler;
use mentor::history::HistoryStore;
use mentor::llm::Role;

async fn store_with(pairs: &[(&str, &str)]) -> (tempfile::TempDir, HistoryStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = dir.path().join("mentor.db").to_string_lossy().to_string();
    let store = HistoryStore::new(&DatabaseConfig::with_url(&url))
        .await
        .expect("HistoryStore::new");
    for (q, a) in pairs {
        store.append(q, a).await.expect("append");
    }
    (dir, store)
}

#[tokio::test]
async fn window_replays_recent_pairs_in_chronological_order() {
    let (_dir, store) = store_with(&[
        ("q1", "a1"),
        ("q2", "a2"),
        ("q3", "a3"),
        ("q4", "a4"),
        ("q5", "a5"),
        ("q6", "a6"),
        ("q7", "a7"),
    ])
    .await;

    let assembler = ContextAssembler::new(ContextConfig {
        window_size: 5,
        max_chars: 24_000,
    });

    let messages = assembler
        .assemble_messages(&store, "q8".to_string())
        .await
        .expect("assemble");

    // 5 pairs -> 10 turns, plus the new prompt.
    assert_eq!(messages.len(), 11);
    assert_eq!(messages[0].content, "q3");
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].content, "a3");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[8].content, "q7");
    assert_eq!(messages[9].content, "a7");
    assert_eq!(messages[10].content, "q8");
    assert_eq!(messages[10].role, Role::User);
}

#[tokio::test]
async fn empty_history_produces_only_the_prompt() {
    let (_dir, store) = store_with(&[]).await;

    let assembler = ContextAssembler::new(ContextConfig::default());
    let messages = assembler
        .assemble_messages(&store, "first question".to_string())
        .await
        .expect("assemble");

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "first question");
}

#[tokio::test]
async fn character_budget_drops_oldest_pairs() {
    let long = "x".repeat(200);
    let (_dir, store) = store_with(&[
        (long.as_str(), long.as_str()),
        ("short q", "short a"),
    ])
    .await;

    // Budget fits the prompt and the short pair but not the long one.
    let assembler = ContextAssembler::new(ContextConfig {
        window_size: 5,
        max_chars: 50,
    });

    let messages = assembler
        .assemble_messages(&store, "now".to_string())
        .await
        .expect("assemble");

    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].content, "short q");
    assert_eq!(messages[1].content, "short a");
    assert_eq!(messages[2].content, "now");
}
