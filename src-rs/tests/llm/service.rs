use crate::config::AiSettings;
use crate::cons::provider_cons::ProviderId;
use crate::llm::models::provider_base::{ErrorKind, GenerationOptions, Message};
use crate::llm::prompts::AnalysisTemplate;
use crate::llm::service::AiService;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(json: &str) -> AiSettings {
        AiSettings::from_json(json).expect("settings json")
    }

    fn service(json: &str) -> AiService {
        AiService::with_http_client(settings(json), reqwest::Client::new())
    }

    fn chat_reply(content: &str) -> serde_json::Value {
        json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }],
            "usage": { "total_tokens": 21 }
        })
    }

    #[tokio::test]
    async fn no_active_provider_fails_locally() {
        let svc = service("{}");
        let r = svc
            .generate(&[Message::user("hi")], &GenerationOptions::default())
            .await;
        assert!(!r.success());
        assert_eq!(r.error(), Some("No AI provider selected"));
        assert_eq!(r.error_code(), Some(ErrorKind::Unknown));
    }

    #[tokio::test]
    async fn missing_key_makes_no_http_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("never")))
            .expect(0)
            .mount(&server)
            .await;

        let svc = service(r#"{"provider":"openai","apiKeys":{"openai":"  "}}"#)
            .with_endpoint(ProviderId::OpenAI, server.uri());
        let r = svc
            .generate(&[Message::user("hi")], &GenerationOptions::default())
            .await;

        assert!(!r.success());
        assert_eq!(r.error(), Some("API key not configured for OpenAI"));
        assert_eq!(r.error_code(), Some(ErrorKind::Unknown));
    }

    #[tokio::test]
    async fn empty_messages_make_no_http_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("never")))
            .expect(0)
            .mount(&server)
            .await;

        let svc = service(r#"{"provider":"openai","apiKeys":{"openai":"sk"}}"#)
            .with_endpoint(ProviderId::OpenAI, server.uri());
        let r = svc.generate(&[], &GenerationOptions::default()).await;
        assert!(!r.success());
        assert_eq!(r.error_code(), Some(ErrorKind::Unknown));
    }

    #[tokio::test]
    async fn generate_uses_active_provider_key_and_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-live"))
            .and(body_partial_json(json!({ "model": "gpt-x" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("done")))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(
            r#"{"provider":"openai","apiKeys":{"openai":" sk-live "},"useCustomModel":true,"customModel":"gpt-x"}"#,
        )
        .with_endpoint(ProviderId::OpenAI, server.uri());
        let r = svc
            .generate(&[Message::user("hi")], &GenerationOptions::default())
            .await;
        assert!(r.success(), "unexpected failure: {:?}", r.error());
        assert_eq!(r.content(), "done");
        assert_eq!(r.tokens_used(), Some(21));
    }

    #[tokio::test]
    async fn custom_model_does_not_leak_to_other_providers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_partial_json(json!({ "model": "claude-custom" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{ "type": "text", "text": "from claude" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(
            r#"{
                "provider": "openai",
                "apiKeys": { "openai": "sk", "claude": "sk-ant" },
                "models": { "claude": "claude-custom" },
                "useCustomModel": true,
                "customModel": "gpt-x"
            }"#,
        )
        .with_endpoint(ProviderId::Claude, server.uri());

        assert_eq!(svc.resolve_model(ProviderId::OpenAI), "gpt-x");
        assert_eq!(svc.resolve_model(ProviderId::Claude), "claude-custom");
        assert_eq!(svc.resolve_model(ProviderId::Grok), "grok-2-latest");

        let r = svc
            .generate_with_provider(ProviderId::Claude, &[Message::user("hi")], &GenerationOptions::default())
            .await;
        assert_eq!(r.content(), "from claude");
    }

    #[tokio::test]
    async fn explicit_option_model_wins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "model": "gpt-4.1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(r#"{"provider":"openai","apiKeys":{"openai":"sk"}}"#)
            .with_endpoint(ProviderId::OpenAI, server.uri());
        let r = svc
            .generate(&[Message::user("hi")], &GenerationOptions::default().with_model("gpt-4.1"))
            .await;
        assert!(r.success());
    }

    #[tokio::test]
    async fn summarize_wraps_content_in_language_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("résumé")))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(r#"{"provider":"grok","apiKeys":{"grok":"xai"}}"#)
            .with_endpoint(ProviderId::Grok, server.uri());
        let r = svc
            .summarize("Long article text", Some("French"), &GenerationOptions::default())
            .await;
        assert!(r.success());

        let requests = server.received_requests().await.expect("recording enabled");
        let body: serde_json::Value = requests[0].body_json().expect("json body");
        assert_eq!(body["messages"][0]["role"], "system");
        let user = body["messages"][1]["content"].as_str().unwrap_or_default();
        assert!(user.contains("in French"));
        assert!(user.ends_with("Long article text"));
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected_locally() {
        let svc = service(r#"{"provider":"openai","apiKeys":{"openai":"sk"}}"#)
            .with_endpoint(ProviderId::OpenAI, "http://127.0.0.1:9");
        let r = svc
            .generate_with_prompt("   ", "content", &GenerationOptions::default())
            .await;
        assert_eq!(r.error(), Some("Prompt is empty"));
    }

    #[tokio::test]
    async fn analyze_with_template_targets_requested_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("- point")))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(r#"{"provider":"claude","apiKeys":{"glm":"rawkey"},"defaultLanguage":"Spanish"}"#)
            .with_endpoint(ProviderId::Glm, server.uri());
        let r = svc
            .analyze_with_template(AnalysisTemplate::KeyPoints, "text", Some(ProviderId::Glm))
            .await;
        assert!(r.success(), "unexpected failure: {:?}", r.error());

        let requests = server.received_requests().await.expect("recording enabled");
        let body: serde_json::Value = requests[0].body_json().expect("json body");
        let user = body["messages"][1]["content"].as_str().unwrap_or_default();
        assert!(user.contains("key points"));
        assert!(user.contains("Spanish"));
    }

    #[tokio::test]
    async fn test_provider_without_key_is_false_and_offline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Hi")))
            .expect(0)
            .mount(&server)
            .await;

        let svc = service("{}").with_endpoint(ProviderId::OpenAI, server.uri());
        assert!(!svc.test_provider(ProviderId::OpenAI).await);
        assert!(!svc.test_credential(ProviderId::OpenAI, "  ").await);
    }

    #[tokio::test]
    async fn test_credential_checks_unsaved_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer sk-new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Hi")))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service("{}").with_endpoint(ProviderId::OpenAI, server.uri());
        assert!(svc.test_credential(ProviderId::OpenAI, "sk-new").await);
        assert!(!svc.is_configured(ProviderId::OpenAI));
    }

    #[tokio::test]
    async fn test_provider_checks_the_resolved_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk"))
            .and(body_partial_json(json!({ "model": "gpt-team", "max_tokens": 5 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Hi")))
            .expect(2)
            .mount(&server)
            .await;

        let svc = service(r#"{"provider":"openai","apiKeys":{"openai":"sk"},"models":{"openai":"gpt-team"}}"#)
            .with_endpoint(ProviderId::OpenAI, server.uri());
        assert!(svc.test_provider(ProviderId::OpenAI).await);
        assert!(svc.test_credential(ProviderId::OpenAI, "sk").await);
    }

    #[tokio::test]
    async fn snapshot_dispatch_ignores_later_swap() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer sk-old"))
            .and(body_partial_json(json!({ "model": "gpt-old" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("old")))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(r#"{"provider":"openai","apiKeys":{"openai":"sk-old"},"models":{"openai":"gpt-old"}}"#)
            .with_endpoint(ProviderId::OpenAI, server.uri());
        let snapshot = svc.settings();
        svc.update_settings(settings(
            r#"{"provider":"openai","apiKeys":{"openai":"sk-new"},"models":{"openai":"gpt-new"}}"#,
        ));

        let r = svc
            .generate_with_snapshot(&snapshot, ProviderId::OpenAI, &[Message::user("hi")], &GenerationOptions::default())
            .await;
        assert!(r.success(), "unexpected failure: {:?}", r.error());
        assert_eq!(r.content(), "old");
    }

    #[test]
    fn list_providers_reports_state() {
        let svc = service(r#"{"provider":"claude","apiKeys":{"claude":"k"}}"#);
        let rows = svc.list_providers();
        assert_eq!(rows.len(), 5);
        let claude = rows.iter().find(|r| r.id == ProviderId::Claude).expect("claude row");
        assert!(claude.configured);
        assert!(claude.active);
        assert_eq!(claude.resolved_model, "claude-3-5-sonnet-20241022");
        assert!(rows.iter().filter(|r| r.id != ProviderId::Claude).all(|r| !r.configured && !r.active));
    }

    #[test]
    fn update_settings_swaps_whole_snapshot() {
        let svc = service(r#"{"provider":"claude","apiKeys":{"claude":"k"}}"#);
        let before = svc.settings();

        svc.update_settings(settings(r#"{"provider":"gemini","apiKeys":{"gemini":"g"}}"#));

        assert_eq!(before.provider, Some(ProviderId::Claude));
        assert_eq!(before.api_key(ProviderId::Claude), Some("k"));
        assert_eq!(svc.active_provider(), Some(ProviderId::Gemini));
        assert!(!svc.is_configured(ProviderId::Claude));
        assert!(svc.is_configured(ProviderId::Gemini));
    }
}
