mod common;

use pagesnap_common::{LlmConfig, PagesnapError};
use pagesnap_llm::gemini::GeminiClient;
use pagesnap_llm::ollama::OllamaClient;
use pagesnap_llm::openai::OpenAiClient;
use pagesnap_llm::traits::LlmClient;
use pagesnap_llm::{CompletionBackend, CompletionRequest, ModelRouter, ProviderOverride};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(text: &str) -> serde_json::Value {
    json!({
        "model": "gpt-4o-mini",
        "choices": [{ "message": { "role": "assistant", "content": text } }],
        "usage": { "total_tokens": 12 }
    })
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "totalTokenCount": 7 }
    })
}

fn request(model: &str, provider: Option<ProviderOverride>) -> CompletionRequest {
    CompletionRequest {
        system_prompt: "format it".to_string(),
        user_prompt: "page text".to_string(),
        model: model.to_string(),
        max_output_tokens: 800,
        provider,
    }
}

#[tokio::test]
async fn openai_client_sends_system_and_user_messages() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 50,
            "messages": [
                { "role": "system", "content": "sys" },
                { "role": "user", "content": "hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new("sk-test".into(), "gpt-4o-mini".into())
        .unwrap()
        .with_base_url(server.uri());
    let resp = client
        .generate("hello", Some("sys"), Some(50), None)
        .await
        .unwrap();

    assert_eq!(resp.text, "hi there");
    assert_eq!(resp.tokens_used, Some(12));
}

#[tokio::test]
async fn openai_error_envelope_surfaces_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "model not found" }
        })))
        .mount(&server)
        .await;

    let client = OpenAiClient::new("sk-test".into(), "nope".into())
        .unwrap()
        .with_base_url(server.uri());
    let err = client.generate("x", None, None, None).await.unwrap_err();

    assert!(matches!(err, PagesnapError::Agent(ref m) if m.contains("model not found")));
}

#[tokio::test]
async fn gemini_client_strips_prefix_and_passes_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(query_param("key", "g-key"))
        .and(body_partial_json(json!({
            "systemInstruction": { "parts": [{ "text": "sys" }] },
            "generationConfig": { "maxOutputTokens": 64 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("gemini says")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("g-key".into(), "gemini/gemini-1.5-flash".into())
        .unwrap()
        .with_base_url(server.uri());
    let resp = client
        .generate("hello", Some("sys"), Some(64), None)
        .await
        .unwrap();

    assert_eq!(resp.text, "gemini says");
    assert_eq!(resp.tokens_used, Some(7));
}

#[tokio::test]
async fn gemini_safety_block_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k".into(), "gemini-pro".into())
        .unwrap()
        .with_base_url(server.uri());
    let err = client.generate("x", None, None, None).await.unwrap_err();

    assert!(err.to_string().contains("safety"));
}

#[tokio::test]
async fn ollama_generate_posts_system_and_token_cap() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "prompt": "page text",
            "system": "sys",
            "stream": false,
            "options": { "num_predict": 32 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "hi",
            "eval_count": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&format!("{}/", server.uri()), "llama3".into()).unwrap();
    let reply = client
        .generate("page text", Some("sys"), Some(32), None)
        .await
        .unwrap();

    assert_eq!(reply.text, "hi");
    assert_eq!(reply.tokens_used, Some(5));
    assert_eq!(client.model_name(), "llama3");
}

#[tokio::test]
async fn ollama_http_error_is_an_agent_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri(), "missing".into()).unwrap();
    let err = client.generate("x", None, None, None).await.unwrap_err();

    assert!(matches!(err, PagesnapError::Agent(ref msg) if msg.contains("404")));
}

#[tokio::test]
async fn router_sends_requested_model_to_ollama() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "qwen2",
            "system": "format it",
            "options": { "num_predict": 800 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "local" })))
        .expect(1)
        .mount(&server)
        .await;

    let router = ModelRouter::new(LlmConfig::Ollama {
        base_url: server.uri(),
        model: "llama3".into(),
    });
    let text = router.complete(&request("qwen2", None)).await.unwrap();

    assert_eq!(text, "local");
}

#[tokio::test]
async fn router_uses_default_provider_with_requested_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "gpt-4.1", "max_tokens": 800 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("formatted")))
        .expect(1)
        .mount(&server)
        .await;

    let router = ModelRouter::new(LlmConfig::OpenAi {
        api_key: "sk-test".into(),
        model: "gpt-4o-mini".into(),
        base_url: Some(server.uri()),
    });
    let text = router.complete(&request("gpt-4.1", None)).await.unwrap();

    assert_eq!(text, "formatted");
}

#[tokio::test]
async fn router_sends_gemini_override_to_gemini() {
    let openai = MockServer::start().await;
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("wrong provider")))
        .expect(0)
        .mount(&openai)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .and(query_param("key", "explicit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("from gemini")))
        .expect(1)
        .mount(&gemini)
        .await;

    let router = ModelRouter::new(LlmConfig::OpenAi {
        api_key: "sk-test".into(),
        model: "gpt-4o-mini".into(),
        base_url: Some(openai.uri()),
    })
    .with_gemini(Some("configured".into()), Some(gemini.uri()));

    let override_ = ProviderOverride::Gemini {
        api_key: Some("explicit".into()),
    };
    let text = router
        .complete(&request("gemini-1.5-pro", Some(override_)))
        .await
        .unwrap();

    assert_eq!(text, "from gemini");
}

#[tokio::test]
async fn router_falls_back_to_configured_gemini_key() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("key", "configured"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("ok")))
        .expect(1)
        .mount(&gemini)
        .await;

    let router = ModelRouter::new(LlmConfig::None)
        .with_gemini(Some("configured".into()), Some(gemini.uri()));
    let text = router
        .complete(&request(
            "gemini-1.5-pro",
            Some(ProviderOverride::Gemini { api_key: None }),
        ))
        .await
        .unwrap();

    assert_eq!(text, "ok");
}

#[tokio::test]
async fn router_without_any_provider_is_a_config_error() {
    let router = ModelRouter::new(LlmConfig::None);
    let err = router.complete(&request("gpt-4o-mini", None)).await.unwrap_err();
    assert!(matches!(err, PagesnapError::Config(_)));

    let err = router
        .complete(&request(
            "gemini-1.5-pro",
            Some(ProviderOverride::Gemini { api_key: None }),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, PagesnapError::Config(_)));
}
