use crate::cons::provider_cons::ProviderId;
use crate::llm::models::provider_base::ErrorKind;
use crate::llm::models::provider_handle::{
    create_client, GenerationOptions, Message, ProviderClient, ProviderClientFactory,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[cfg(test)]
mod tests {
    use super::*;

    /// Vendor-shaped success reply whose content container is empty.
    fn empty_container(provider: ProviderId) -> Value {
        match provider {
            ProviderId::Gemini => json!({ "candidates": [] }),
            ProviderId::Claude => json!({ "type": "message", "content": [] }),
            ProviderId::Grok | ProviderId::OpenAI | ProviderId::Glm => json!({ "choices": [] }),
        }
    }

    async fn generate_against(provider: ProviderId, template: ResponseTemplate) -> crate::NeutralResponse {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(template)
            .expect(1)
            .mount(&server)
            .await;
        let client = create_client(provider, server.uri(), reqwest::Client::new());
        client
            .generate(&[Message::user("hi")], "key", &GenerationOptions::default())
            .await
    }

    #[test]
    fn factory_defaults_to_registry_endpoints() {
        let mut factory = ProviderClientFactory::new(reqwest::Client::new());
        for id in ProviderId::ALL {
            assert_eq!(factory.endpoint(id), id.config().endpoint_base);
        }
        factory.set_endpoint(ProviderId::Claude, "http://localhost:8080");
        assert_eq!(factory.endpoint(ProviderId::Claude), "http://localhost:8080");
        assert_eq!(factory.endpoint(ProviderId::OpenAI), "https://api.openai.com/v1");
    }

    #[test]
    fn client_for_builds_matching_adapter() {
        let factory = ProviderClientFactory::new(reqwest::Client::new());
        for id in ProviderId::ALL {
            assert_eq!(factory.client_for(id).provider(), id);
        }
    }

    #[tokio::test]
    async fn empty_content_container_is_no_response_for_all_providers() {
        for provider in ProviderId::ALL {
            let r = generate_against(
                provider,
                ResponseTemplate::new(200).set_body_json(empty_container(provider)),
            )
            .await;
            assert!(!r.success(), "{} should fail", provider);
            assert_eq!(r.error_code(), Some(ErrorKind::NoResponse), "{}", provider);
            assert_eq!(
                r.error().map(str::to_string),
                Some(format!("{} returned no content", provider.vendor_label()))
            );
        }
    }

    #[tokio::test]
    async fn missing_content_container_is_no_response_for_all_providers() {
        for provider in ProviderId::ALL {
            let r = generate_against(provider, ResponseTemplate::new(200).set_body_json(json!({}))).await;
            assert_eq!(r.error_code(), Some(ErrorKind::NoResponse), "{}", provider);
        }
    }

    #[tokio::test]
    async fn status_401_is_unauthorized_for_all_providers() {
        for provider in ProviderId::ALL {
            let r = generate_against(
                provider,
                ResponseTemplate::new(401).set_body_json(json!({ "error": { "message": "invalid key" } })),
            )
            .await;
            assert_eq!(r.error_code(), Some(ErrorKind::Unauthorized), "{}", provider);
            let err = r.error().unwrap_or_default();
            assert!(
                err.starts_with(&format!("{} API error (401", provider.vendor_label())),
                "{}: {}",
                provider,
                err
            );
            assert!(err.contains("invalid key"));
        }
    }

    #[tokio::test]
    async fn status_429_is_rate_limited_for_all_providers() {
        for provider in ProviderId::ALL {
            let r = generate_against(provider, ResponseTemplate::new(429)).await;
            assert_eq!(r.error_code(), Some(ErrorKind::RateLimited), "{}", provider);
        }
    }

    #[tokio::test]
    async fn slow_vendor_is_classified_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .expect("client");
        let client = create_client(ProviderId::OpenAI, server.uri(), http);
        let r = client
            .generate(&[Message::user("hi")], "key", &GenerationOptions::default())
            .await;
        assert_eq!(r.error_code(), Some(ErrorKind::Timeout));
        assert!(r.error().unwrap_or_default().starts_with("OpenAI request failed"));
    }
}
