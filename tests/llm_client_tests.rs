use mathscribe_server::{
    Error,
    config::LlmConfig,
    llm::{GenerativeModel, OpenAiModel, PromptPart},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

mod common;
use common::drawn_canvas;

fn create_test_config(base_url: String) -> LlmConfig {
    LlmConfig {
        base_url,
        api_key: "test-api-key".to_string(),
        model: "gemini-1.5-flash".to_string(),
        ..LlmConfig::default()
    }
}

fn completion(content: Option<&str>) -> Value {
    let choices = match content {
        Some(text) => json!([{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]),
        None => json!([]),
    };

    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gemini-1.5-flash",
        "choices": choices
    })
}

#[tokio::test]
async fn test_generate_returns_first_choice_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(Some("42"))))
        .expect(1)
        .mount(&server)
        .await;

    let model = OpenAiModel::new(create_test_config(server.uri())).unwrap();
    let text = model
        .generate(vec![PromptPart::text("system"), PromptPart::text("6 * 7")])
        .await
        .unwrap();

    assert_eq!(text, "42");
}

#[tokio::test]
async fn test_generate_sends_parts_as_single_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(Some("a line"))))
        .mount(&server)
        .await;

    let model = OpenAiModel::new(create_test_config(server.uri())).unwrap();
    model
        .generate(vec![
            PromptPart::text("system"),
            PromptPart::text("what is this?"),
            PromptPart::Image(drawn_canvas()),
        ])
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "gemini-1.5-flash");

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");

    let content = messages[0]["content"].as_array().unwrap();
    assert_eq!(content.len(), 3);
    assert_eq!(content[0], json!({"type": "text", "text": "system"}));
    assert_eq!(content[1], json!({"type": "text", "text": "what is this?"}));
    assert_eq!(content[2]["type"], "image_url");
    assert!(
        content[2]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
}

#[tokio::test]
async fn test_generate_without_choices_is_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(None)))
        .mount(&server)
        .await;

    let model = OpenAiModel::new(create_test_config(server.uri())).unwrap();
    let result = model.generate(vec![PromptPart::text("hi")]).await;

    assert!(matches!(result, Err(Error::Llm(_))), "{result:?}");
}

#[tokio::test]
async fn test_generate_surfaces_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "API key not valid. Please pass a valid API key.",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let model = OpenAiModel::new(create_test_config(server.uri())).unwrap();
    let err = model
        .generate(vec![PromptPart::text("hi")])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::OpenAi(_)));
    assert!(err.to_string().contains("API key not valid"), "{err}");
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let model = OpenAiModel::new(create_test_config(server.uri())).unwrap();
    let result = model.generate(vec![PromptPart::text("hi")]).await;

    assert!(result.is_err());
}
