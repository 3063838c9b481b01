use crate::cons::provider_cons::ProviderId;
use crate::llm::models::provider_base::{ErrorKind, GenerationOptions, NeutralResponse, Role};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_has_content_and_no_error() {
        let r = NeutralResponse::ok("hello", Some(12));
        assert!(r.success());
        assert_eq!(r.content(), "hello");
        assert_eq!(r.tokens_used(), Some(12));
        assert!(r.error().is_none());
        assert!(r.error_code().is_none());
    }

    #[test]
    fn ok_with_blank_content_degrades_to_no_response() {
        let r = NeutralResponse::ok("  \n", Some(3));
        assert!(!r.success());
        assert!(r.content().is_empty());
        assert!(r.tokens_used().is_none());
        assert_eq!(r.error_code(), Some(ErrorKind::NoResponse));
        assert!(r.error().is_some());
    }

    #[test]
    fn failure_always_carries_an_error() {
        let r = NeutralResponse::failure(ErrorKind::Timeout, "");
        assert!(!r.success());
        assert!(r.content().is_empty());
        assert_eq!(r.error(), Some("Request failed (timeout)"));
        assert_eq!(r.error_code(), Some(ErrorKind::Timeout));
    }

    #[test]
    fn serializes_camel_case_and_snake_case_codes() {
        let failed = serde_json::to_value(NeutralResponse::failure(ErrorKind::RateLimited, "slow down"))
            .expect("serialize");
        assert_eq!(failed["success"], false);
        assert_eq!(failed["errorCode"], "rate_limited");
        assert_eq!(failed["error"], "slow down");
        assert!(failed.get("tokensUsed").is_none());

        let ok = serde_json::to_value(NeutralResponse::ok("x", Some(7))).expect("serialize");
        assert_eq!(ok["tokensUsed"], 7);
        assert!(ok.get("errorCode").is_none());
    }

    #[test]
    fn generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.temperature, 0.7);
        assert_eq!(opts.max_tokens, 4096);
        assert_eq!(opts.model_or_default(ProviderId::Claude), "claude-3-5-sonnet-20241022");
        assert_eq!(
            opts.clone().with_model("  ").model_or_default(ProviderId::OpenAI),
            "gpt-4o-mini"
        );
        assert_eq!(opts.with_model("gpt-x").model_or_default(ProviderId::OpenAI), "gpt-x");
    }

    #[test]
    fn generation_options_parse_from_host_json() {
        let opts: GenerationOptions =
            serde_json::from_str(r#"{"model":"m","maxTokens":100,"stream":true}"#).expect("parse");
        assert_eq!(opts.model.as_deref(), Some("m"));
        assert_eq!(opts.max_tokens, 100);
        assert_eq!(opts.temperature, 0.7);
        assert_eq!(opts.stream, Some(true));
    }

    #[test]
    fn role_names_are_a_closed_set() {
        assert_eq!(Role::from_name(" Assistant "), Some(Role::Assistant));
        assert_eq!(Role::from_name("model"), Some(Role::Assistant));
        assert_eq!(Role::from_name("system"), Some(Role::System));
        assert_eq!(Role::from_name("tool"), None);
        assert_eq!(Role::from_name(""), None);
    }

    #[test]
    fn credential_probe_keeps_requested_model() {
        let probe = GenerationOptions::credential_probe(Some("gemini-1.5-pro"));
        assert_eq!(probe.max_tokens, 5);
        assert_eq!(probe.model_or_default(ProviderId::Gemini), "gemini-1.5-pro");
        assert_eq!(
            GenerationOptions::credential_probe(None).model_or_default(ProviderId::Gemini),
            ProviderId::Gemini.config().default_model
        );
    }
}
