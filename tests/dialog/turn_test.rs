//! End-to-end turn tests with a scripted completion backend.

use std::sync::Arc;

use async_trait::async_trait;

use frontdesk::analytics::{EventSink, TurnEvent};
use frontdesk::dialog::Dialog;
use frontdesk::providers::{CompletionBackend, Role};
use frontdesk::sanitize::Sanitizer;
use frontdesk::session::{ChatKey, SessionStore, Stage, HISTORY_CAPACITY};

use crate::support::{dialog_with, ScriptedBackend, CANNED_REPLY};

#[tokio::test]
async fn first_turn_creates_session_and_strips_greeting() {
    let generated = "Здравствуйте! Если вам сейчас важно разобраться в себе — я рядом.";
    let (store, backend, dialog) = dialog_with(vec![Ok(Some(generated.to_owned()))]);
    let chat = ChatKey(42);

    let reply = dialog
        .handle_turn(chat, Some("Анна"), "Здравствуйте")
        .await
        .expect("turn should complete");

    assert_eq!(reply, "Если вам сейчас важно разобраться в себе — я рядом.");

    let session = store.resolve(chat).await;
    let session = session.lock().await;
    assert_eq!(session.stage(), Stage::Active);

    let history = session.snapshot();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "Здравствуйте");
    assert_eq!(history[1].role, Role::Assistant);
    // History keeps the raw reply, pre-sanitization.
    assert_eq!(history[1].content, generated);

    // The first turn's conditioning entry permits a single greeting, and the
    // triggering message is part of its own context window.
    let request = backend.request(0).await;
    assert_eq!(request[0].role, Role::System);
    assert!(request[0]
        .content
        .contains("поприветствовать клиента один раз"));
    assert_eq!(
        request.last().map(|m| m.content.as_str()),
        Some("Здравствуйте")
    );
}

#[tokio::test]
async fn later_turns_condition_on_active_stage() {
    let (store, backend, dialog) = dialog_with(Vec::new());
    let chat = ChatKey(7);

    dialog
        .handle_turn(chat, None, "Здравствуйте")
        .await
        .expect("first turn should complete");
    dialog
        .handle_turn(chat, None, "Расскажите про форматы")
        .await
        .expect("second turn should complete");

    let second = backend.request(1).await;
    assert_eq!(second[0].role, Role::System);
    assert!(second[0].content.contains("Не используй приветствие"));

    // Once terminal, the stage never reverts.
    let session = store.resolve(chat).await;
    assert_eq!(session.lock().await.stage(), Stage::Active);
}

#[tokio::test]
async fn history_stays_bounded_and_chronological() {
    let (store, _backend, dialog) = dialog_with(Vec::new());
    let chat = ChatKey(1);

    for i in 0..3 {
        dialog
            .handle_turn(chat, None, &format!("вопрос {i}"))
            .await
            .expect("turn should complete");
    }
    {
        let session = store.resolve(chat).await;
        // Under capacity: exactly N*2 messages retained.
        assert_eq!(session.lock().await.history_len(), 6);
    }

    for i in 3..7 {
        dialog
            .handle_turn(chat, None, &format!("вопрос {i}"))
            .await
            .expect("turn should complete");
    }

    let session = store.resolve(chat).await;
    let session = session.lock().await;
    assert_eq!(session.history_len(), HISTORY_CAPACITY);

    // 14 messages were produced; the two oldest turns were evicted.
    let history = session.snapshot();
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "вопрос 2");
    assert_eq!(history[9].role, Role::Assistant);
    assert_eq!(history[9].content, CANNED_REPLY);
}

#[tokio::test]
async fn identities_are_independent() {
    let (store, _backend, dialog) = dialog_with(Vec::new());
    let a = ChatKey(100);
    let b = ChatKey(200);

    dialog
        .handle_turn(b, None, "Добрый день")
        .await
        .expect("turn should complete");
    for _ in 0..5 {
        dialog
            .handle_turn(a, None, "ещё вопрос")
            .await
            .expect("turn should complete");
    }

    // B's session is exactly as its single turn left it.
    let session_b = store.resolve(b).await;
    let session_b = session_b.lock().await;
    assert_eq!(session_b.history_len(), 2);
    assert_eq!(session_b.snapshot()[0].content, "Добрый день");
    assert_eq!(store.session_count().await, 2);
}

#[tokio::test]
async fn concurrent_turns_on_one_identity_serialize() {
    let (store, _backend, dialog) = dialog_with(Vec::new());
    let chat = ChatKey(3);

    // A rapid double-send: both turns complete and history stays paired,
    // user and assistant alternating, whichever message went first.
    let (first, second) = tokio::join!(
        dialog.handle_turn(chat, None, "первое сообщение"),
        dialog.handle_turn(chat, None, "второе сообщение"),
    );
    first.expect("first turn should complete");
    second.expect("second turn should complete");

    let session = store.resolve(chat).await;
    let session = session.lock().await;
    let history = session.snapshot();
    assert_eq!(history.len(), 4);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }
}

#[tokio::test]
async fn failing_analytics_sink_does_not_affect_the_turn() {
    struct FailingSink;

    #[async_trait]
    impl EventSink for FailingSink {
        async fn record(&self, _event: &TurnEvent) -> anyhow::Result<()> {
            anyhow::bail!("sink offline")
        }
    }

    let store = Arc::new(SessionStore::new());
    let backend = Arc::new(ScriptedBackend::new(Vec::new()));
    let dialog = Dialog::new(
        Arc::clone(&store),
        Arc::clone(&backend) as Arc<dyn CompletionBackend>,
        Sanitizer::new(&[]),
        Some(Arc::new(FailingSink)),
    );

    let reply = dialog
        .handle_turn(ChatKey(5), Some("Иван"), "привет")
        .await
        .expect("turn should complete despite sink failure");
    assert!(!reply.is_empty());
}
