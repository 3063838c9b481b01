use crate::llm::models::openai::{
    build_chat_completions_request_body, create_grok, create_openai, extract_chat_completion_content,
};
use crate::llm::models::provider_base::{ErrorKind, GenerationOptions, Message, ProviderClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_reply(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        })
    }

    #[test]
    fn request_body_passes_roles_through() {
        let messages = vec![Message::system("s"), Message::user("u"), Message::assistant("a")];
        let body = build_chat_completions_request_body("gpt-4o-mini", &messages, &GenerationOptions::default());
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][2]["role"], "assistant");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn extract_content_rejects_missing_or_blank() {
        assert_eq!(extract_chat_completion_content(&chat_reply("hi")).as_deref(), Some("hi"));
        assert!(extract_chat_completion_content(&chat_reply("  ")).is_none());
        assert!(extract_chat_completion_content(&json!({ "choices": [] })).is_none());
        assert!(extract_chat_completion_content(&json!({})).is_none());
    }

    #[tokio::test]
    async fn generate_sends_bearer_and_reads_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({ "model": "gpt-4o", "max_tokens": 256 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Hello there")))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_openai(server.uri(), reqwest::Client::new());
        let options = GenerationOptions::default().with_model("gpt-4o").with_max_tokens(256);
        let r = client.generate(&[Message::user("hi")], "sk-test", &options).await;

        assert!(r.success(), "unexpected failure: {:?}", r.error());
        assert_eq!(r.content(), "Hello there");
        assert_eq!(r.tokens_used(), Some(15));
    }

    #[tokio::test]
    async fn missing_usage_leaves_tokens_unset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .mount(&server)
            .await;

        let client = create_grok(server.uri(), reqwest::Client::new());
        let r = client
            .generate(&[Message::user("hi")], "xai-1", &GenerationOptions::default())
            .await;
        assert!(r.success());
        assert_eq!(r.tokens_used(), None);
    }

    #[tokio::test]
    async fn unauthorized_error_surfaces_vendor_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key" }
            })))
            .mount(&server)
            .await;

        let client = create_openai(server.uri(), reqwest::Client::new());
        let r = client
            .generate(&[Message::user("hi")], "bad", &GenerationOptions::default())
            .await;

        assert!(!r.success());
        assert_eq!(r.error_code(), Some(ErrorKind::Unauthorized));
        let err = r.error().unwrap_or_default();
        assert!(err.starts_with("OpenAI API error (401"), "got {}", err);
        assert!(err.contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn grok_errors_carry_grok_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
            .mount(&server)
            .await;

        let client = create_grok(server.uri(), reqwest::Client::new());
        let r = client
            .generate(&[Message::user("hi")], "xai-1", &GenerationOptions::default())
            .await;
        assert_eq!(r.error_code(), Some(ErrorKind::RateLimited));
        assert!(r.error().unwrap_or_default().starts_with("Grok API error (429"));
    }

    #[tokio::test]
    async fn error_member_on_success_status_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "message": "Rate limit reached for requests" },
                "choices": [{ "message": { "content": "ignored" } }]
            })))
            .mount(&server)
            .await;

        let client = create_openai(server.uri(), reqwest::Client::new());
        let r = client
            .generate(&[Message::user("hi")], "sk", &GenerationOptions::default())
            .await;
        assert!(!r.success());
        assert_eq!(r.error_code(), Some(ErrorKind::RateLimited));
    }

    #[tokio::test]
    async fn test_credential_accepts_clean_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({ "max_tokens": 5, "messages": [{ "role": "user", "content": "Hi" }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Hello")))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_openai(server.uri(), reqwest::Client::new());
        assert!(client.test_credential("sk-good", None).await);
    }

    #[tokio::test]
    async fn test_credential_rejects_error_flagged_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "message": "invalid key" },
                "choices": [{ "message": { "content": "Hello" } }]
            })))
            .mount(&server)
            .await;

        let client = create_openai(server.uri(), reqwest::Client::new());
        assert!(!client.test_credential("sk-bad", None).await);
    }

    #[tokio::test]
    async fn test_credential_rejects_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = create_openai(server.uri(), reqwest::Client::new());
        assert!(!client.test_credential("sk", None).await);
    }

    #[tokio::test]
    async fn test_credential_is_false_when_unreachable() {
        let client = create_openai("http://127.0.0.1:9".to_string(), reqwest::Client::new());
        assert!(!client.test_credential("sk", None).await);
    }
}
