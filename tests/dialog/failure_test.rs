//! Failure taxonomy tests: fallback substitution and error propagation.

use frontdesk::dialog::{TurnError, FALLBACK_REPLY};
use frontdesk::providers::{BackendError, Role};
use frontdesk::session::{ChatKey, Stage};

use crate::support::dialog_with;

#[tokio::test]
async fn empty_completion_substitutes_fallback() {
    let (store, _backend, dialog) = dialog_with(vec![Ok(None)]);
    let chat = ChatKey(9);

    let reply = dialog
        .handle_turn(chat, None, "Здравствуйте")
        .await
        .expect("turn should complete");
    assert_eq!(reply, FALLBACK_REPLY);

    // History stays paired and the stage still advances.
    let session = store.resolve(chat).await;
    let session = session.lock().await;
    let history = session.snapshot();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, FALLBACK_REPLY);
    assert_eq!(session.stage(), Stage::Active);
}

#[tokio::test]
async fn upstream_error_status_substitutes_fallback() {
    let (store, _backend, dialog) = dialog_with(vec![Err(BackendError::HttpStatus {
        status: 500,
        body: "overloaded".to_owned(),
    })]);
    let chat = ChatKey(10);

    let reply = dialog
        .handle_turn(chat, None, "запишите меня")
        .await
        .expect("turn should complete with fallback");
    assert_eq!(reply, FALLBACK_REPLY);

    let session = store.resolve(chat).await;
    assert_eq!(session.lock().await.history_len(), 2);
}

#[tokio::test]
async fn parse_failure_propagates_to_the_adapter() {
    let (store, _backend, dialog) =
        dialog_with(vec![Err(BackendError::Parse("bad body".to_owned()))]);
    let chat = ChatKey(11);

    let result = dialog.handle_turn(chat, None, "Здравствуйте").await;
    assert!(matches!(
        result,
        Err(TurnError::Backend(BackendError::Parse(_)))
    ));

    // The same chat keeps working on the next turn.
    let reply = dialog
        .handle_turn(chat, None, "вы здесь?")
        .await
        .expect("retry should complete");
    assert!(!reply.is_empty());

    let session = store.resolve(chat).await;
    assert_eq!(session.lock().await.stage(), Stage::Active);
}
