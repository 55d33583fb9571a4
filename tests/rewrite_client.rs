use serde_json::json;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

use sourcegate::rewrite::{ChatCompletionsClient, RewriteRequest, RewriteService};

fn request() -> RewriteRequest {
    RewriteRequest {
        title: "وزارة الصحة تطلق حملة تطعيم".to_string(),
        body: "أعلنت وزارة الصحة اليوم عن إطلاق حملة وطنية جديدة للتطعيم.".to_string(),
        source_name_local: "رويترز".to_string(),
        citation_phrase: "وفقاً لوكالة رويترز".to_string(),
        language: Some("ar".to_string()),
    }
}

fn client(server: &MockServer) -> ChatCompletionsClient {
    ChatCompletionsClient::new("sk-test", "gpt-4o-mini", Duration::from_secs(5))
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_complete_returns_message_content() {
    let mock_server = MockServer::start().await;
    let content = r#"{"title":"t","content":"c","excerpt":"e"}"#;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = client(&mock_server).complete(&request()).await.unwrap();
    assert_eq!(text, content);
}

#[tokio::test]
async fn test_prompt_carries_citation_phrase() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{}"}}]
        })))
        .mount(&mock_server)
        .await;

    client(&mock_server).complete(&request()).await.unwrap();

    let received = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("وفقاً لوكالة رويترز"));
    assert_eq!(body["messages"][0]["role"], "system");
}

#[tokio::test]
async fn test_error_status_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).complete(&request()).await.unwrap_err();
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&mock_server)
        .await;

    assert!(client(&mock_server).complete(&request()).await.is_err());
}
