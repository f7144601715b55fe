//! OpenAI wire format tests.

use frontdesk::providers::openai::{build_request, parse_response};
use frontdesk::providers::{BackendError, ChatMessage, Role};

#[test]
fn build_request_maps_roles_to_wire_names() {
    let messages = vec![
        ChatMessage::new(Role::System, "инструкция"),
        ChatMessage::new(Role::User, "Здравствуйте"),
        ChatMessage::new(Role::Assistant, "Слушаю вас"),
    ];

    let request = build_request("gpt-4", &messages);
    assert_eq!(request.model, "gpt-4");
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[0].role, "system");
    assert_eq!(request.messages[1].role, "user");
    assert_eq!(request.messages[2].role, "assistant");
    assert_eq!(request.messages[1].content, "Здравствуйте");
}

#[test]
fn request_serializes_to_chat_completions_shape() {
    let request = build_request("gpt-4", &[ChatMessage::new(Role::User, "привет")]);
    let json = serde_json::to_value(&request).expect("should serialize");

    assert_eq!(json["model"], "gpt-4");
    assert_eq!(json["messages"][0]["role"], "user");
    assert_eq!(json["messages"][0]["content"], "привет");
}

#[test]
fn parse_response_extracts_first_choice_content() {
    let body = r#"{"choices":[{"message":{"content":"Рад помочь."}}]}"#;
    let text = parse_response(body).expect("should parse");
    assert_eq!(text.as_deref(), Some("Рад помочь."));
}

#[test]
fn parse_response_without_choices_yields_none() {
    assert_eq!(parse_response(r#"{"choices":[]}"#).expect("should parse"), None);
    assert_eq!(parse_response("{}").expect("should parse"), None);
}

#[test]
fn parse_response_without_content_yields_none() {
    let body = r#"{"choices":[{"message":{}}]}"#;
    assert_eq!(parse_response(body).expect("should parse"), None);

    let blank = r#"{"choices":[{"message":{"content":"   "}}]}"#;
    assert_eq!(parse_response(blank).expect("should parse"), None);
}

#[test]
fn parse_response_rejects_invalid_json() {
    let result = parse_response("not json at all");
    assert!(matches!(result, Err(BackendError::Parse(_))));
}
