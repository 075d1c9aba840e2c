//! Dispatch router: nickname + prompt in, uniform [`ChatResult`] out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use super::error::{DispatchError, ValidationError};
use super::ollama::OllamaProvider;
use super::openai::OpenAICompatibleProvider;
use super::provider::LLMProvider;
use super::registry::PersonaRegistry;
use super::types::{ChatRequest, ChatResult, ProviderKind};
use crate::config::ProvidersConfig;

/// Routes persona chats to the transport for their provider kind.
pub struct Dispatcher {
    registry: PersonaRegistry,
    providers: HashMap<ProviderKind, Arc<dyn LLMProvider>>,
    /// Provider kinds left unregistered because their credential is absent,
    /// with the environment variable that should hold it.
    unconfigured: HashMap<ProviderKind, String>,
}

impl Dispatcher {
    /// A dispatcher with no transports registered.
    pub fn new(registry: PersonaRegistry) -> Self {
        Self {
            registry,
            providers: HashMap::new(),
            unconfigured: HashMap::new(),
        }
    }

    /// Build transports from config, reading credentials from the process environment.
    pub fn from_env(
        registry: PersonaRegistry,
        config: &ProvidersConfig,
    ) -> Result<Self, reqwest::Error> {
        Self::from_lookup(registry, config, |name| std::env::var(name).ok())
    }

    /// Build transports from config, reading credentials through `lookup`.
    ///
    /// The local transport is always registered; its key is optional. The
    /// cloud transport is only registered when its key is present and
    /// non-empty, otherwise dispatching to it yields a configuration error.
    pub fn from_lookup<F>(
        registry: PersonaRegistry,
        config: &ProvidersConfig,
        lookup: F,
    ) -> Result<Self, reqwest::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        let secret = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut dispatcher = Self::new(registry);

        let local_key = secret(&config.local.api_key_env);
        info!(
            base_url = %config.local.base_url,
            authenticated = local_key.is_some(),
            "Registered local inference provider"
        );
        dispatcher.register(
            ProviderKind::LocalInference,
            Arc::new(OllamaProvider::new(
                client.clone(),
                config.local.base_url.clone(),
                local_key,
            )),
        );

        match secret(&config.cloud.api_key_env) {
            Some(api_key) => {
                let provider =
                    OpenAICompatibleProvider::new(client, config.cloud.base_url.clone(), api_key)
                        .with_sampling(config.cloud.temperature, config.cloud.max_tokens);
                dispatcher.register(ProviderKind::CloudCompletion, Arc::new(provider));
                info!(base_url = %config.cloud.base_url, "Registered cloud completion provider");
            }
            None => {
                if dispatcher.registry.uses(ProviderKind::CloudCompletion) {
                    warn!(
                        env = %config.cloud.api_key_env,
                        "Cloud completion provider not configured; cloud personas will return errors"
                    );
                }
                dispatcher.mark_unconfigured(
                    ProviderKind::CloudCompletion,
                    config.cloud.api_key_env.clone(),
                );
            }
        }

        Ok(dispatcher)
    }

    /// Register a provider implementation for a kind.
    pub fn register(&mut self, kind: ProviderKind, implementation: Arc<dyn LLMProvider>) {
        self.unconfigured.remove(&kind);
        self.providers.insert(kind, implementation);
    }

    /// Record that `kind` has no transport because `env` is unset.
    pub fn mark_unconfigured(&mut self, kind: ProviderKind, env: String) {
        self.providers.remove(&kind);
        self.unconfigured.insert(kind, env);
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    /// Chat with the persona named `nickname`.
    ///
    /// Only blank input is returned as `Err`. Every other failure (unknown
    /// nickname, missing credential, transport or decoding problem) comes
    /// back as `ChatResult::Error`.
    pub async fn chat(&self, nickname: &str, prompt: &str) -> Result<ChatResult, ValidationError> {
        let request = ChatRequest::new(nickname, prompt)?;

        Ok(match self.dispatch(&request).await {
            Ok(text) => ChatResult::Response(text),
            Err(e) => {
                warn!(nickname = %request.nickname, error = %e, "Chat dispatch failed");
                ChatResult::Error(e.to_string())
            }
        })
    }

    async fn dispatch(&self, request: &ChatRequest) -> Result<String, DispatchError> {
        let entry = self
            .registry
            .resolve(&request.nickname)
            .ok_or_else(|| DispatchError::UnknownNickname(request.nickname.clone()))?;

        let provider = self.provider_for(entry.provider_kind)?;
        debug!(
            nickname = %entry.nickname,
            model = %entry.model_id,
            provider = %entry.provider_kind,
            "Dispatching chat"
        );

        Ok(provider.complete(&entry.model_id, &request.prompt).await?)
    }

    fn provider_for(&self, kind: ProviderKind) -> Result<Arc<dyn LLMProvider>, DispatchError> {
        if let Some(provider) = self.providers.get(&kind) {
            return Ok(provider.clone());
        }
        match self.unconfigured.get(&kind) {
            Some(env) => Err(DispatchError::NotConfigured {
                kind,
                env: env.clone(),
            }),
            None => Err(DispatchError::UnknownProvider(kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMError;
    use crate::llm::mock::{self, Recorder};
    use async_trait::async_trait;
    use axum::Json;
    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport double that counts calls and replays a canned outcome.
    struct StubProvider {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, String)>>,
        reply: fn() -> Result<String, LLMError>,
    }

    impl StubProvider {
        fn new(reply: fn() -> Result<String, LLMError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                reply,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LLMProvider for StubProvider {
        async fn complete(&self, model: &str, prompt: &str) -> Result<String, LLMError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            (self.reply)()
        }
    }

    fn dispatcher_with(local: Arc<StubProvider>, cloud: Arc<StubProvider>) -> Dispatcher {
        let mut dispatcher = Dispatcher::new(PersonaRegistry::default());
        dispatcher.register(ProviderKind::LocalInference, local);
        dispatcher.register(ProviderKind::CloudCompletion, cloud);
        dispatcher
    }

    fn pong() -> Result<String, LLMError> {
        Ok("pong".to_string())
    }

    fn four() -> Result<String, LLMError> {
        Ok("4".to_string())
    }

    fn server_error() -> Result<String, LLMError> {
        Err(LLMError::Api {
            status: 500,
            message: "internal".to_string(),
        })
    }

    fn missing_content() -> Result<String, LLMError> {
        Err(LLMError::MissingField("choices[0].message.content"))
    }

    #[tokio::test]
    async fn test_local_persona_round_trip() {
        let local = StubProvider::new(pong);
        let cloud = StubProvider::new(four);
        let dispatcher = dispatcher_with(local.clone(), cloud.clone());

        let result = dispatcher.chat("Peter", "ping").await.unwrap();
        assert_eq!(result, ChatResult::Response("pong".to_string()));
        assert_eq!(local.calls(), 1);
        assert_eq!(cloud.calls(), 0);
        assert_eq!(
            local.seen.lock().unwrap()[0],
            ("llama3".to_string(), "ping".to_string())
        );
    }

    #[tokio::test]
    async fn test_cloud_persona_round_trip() {
        let local = StubProvider::new(pong);
        let cloud = StubProvider::new(four);
        let dispatcher = dispatcher_with(local.clone(), cloud.clone());

        let result = dispatcher.chat("Alex", "2+2?").await.unwrap();
        assert_eq!(result, ChatResult::Response("4".to_string()));
        assert_eq!(cloud.calls(), 1);
        assert_eq!(local.calls(), 0);
        assert_eq!(cloud.seen.lock().unwrap()[0].0, "gpt-4o");
    }

    #[tokio::test]
    async fn test_unknown_nickname_makes_no_calls() {
        let local = StubProvider::new(pong);
        let cloud = StubProvider::new(four);
        let dispatcher = dispatcher_with(local.clone(), cloud.clone());

        for nickname in ["Zed", "peter", "Sophia"] {
            let result = dispatcher.chat(nickname, "hi").await.unwrap();
            match result {
                ChatResult::Error(msg) => {
                    assert_eq!(msg, format!("No model for {nickname}"));
                }
                other => panic!("expected error, got {other:?}"),
            }
        }
        assert_eq!(local.calls(), 0);
        assert_eq!(cloud.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_input_is_a_validation_error() {
        let local = StubProvider::new(pong);
        let cloud = StubProvider::new(four);
        let dispatcher = dispatcher_with(local.clone(), cloud.clone());

        assert_eq!(
            dispatcher.chat("", "hi").await,
            Err(ValidationError::EmptyNickname)
        );
        assert_eq!(
            dispatcher.chat("Peter", "").await,
            Err(ValidationError::EmptyPrompt)
        );
        assert_eq!(local.calls() + cloud.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_error_result() {
        let dispatcher = dispatcher_with(StubProvider::new(pong), StubProvider::new(server_error));

        let result = dispatcher.chat("Alex", "hi").await.unwrap();
        assert!(result.is_error());
        assert_eq!(
            result,
            ChatResult::Error("api error (status 500): internal".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_field_becomes_error_result() {
        let dispatcher =
            dispatcher_with(StubProvider::new(pong), StubProvider::new(missing_content));

        let result = dispatcher.chat("Alex", "hi").await.unwrap();
        assert_eq!(
            result,
            ChatResult::Error("response is missing field 'choices[0].message.content'".to_string())
        );
    }

    #[tokio::test]
    async fn test_unregistered_kind_is_unknown_provider() {
        let mut dispatcher = Dispatcher::new(PersonaRegistry::default());
        dispatcher.register(ProviderKind::LocalInference, StubProvider::new(pong));

        let result = dispatcher.chat("Alex", "hi").await.unwrap();
        assert_eq!(
            result,
            ChatResult::Error("Unknown provider: cloud_completion".to_string())
        );
    }

    // --- Wire-level dispatch against mock provider servers ---

    fn providers_config(local_url: &str, cloud_url: &str) -> ProvidersConfig {
        let mut config = ProvidersConfig::default();
        config.request_timeout_seconds = 5;
        config.local.base_url = local_url.to_string();
        config.cloud.base_url = cloud_url.to_string();
        config
    }

    async fn spawn_ollama() -> (String, Recorder) {
        async fn generate(
            State(recorder): State<Recorder>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> Json<Value> {
            recorder.record(&headers, body);
            Json(json!({"response": "pong"}))
        }

        let recorder = Recorder::default();
        let app = Router::new()
            .route("/api/generate", post(generate))
            .with_state(recorder.clone());
        (mock::spawn(app).await, recorder)
    }

    async fn spawn_failing_cloud() -> (String, Recorder) {
        async fn completions(
            State(recorder): State<Recorder>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> (StatusCode, &'static str) {
            recorder.record(&headers, body);
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream failure")
        }

        let recorder = Recorder::default();
        let app = Router::new()
            .route("/chat/completions", post(completions))
            .with_state(recorder.clone());
        (mock::spawn(app).await, recorder)
    }

    #[tokio::test]
    async fn test_local_persona_without_key_still_calls_out() {
        let (local_url, local) = spawn_ollama().await;
        let config = providers_config(&local_url, "http://127.0.0.1:9");
        let dispatcher =
            Dispatcher::from_lookup(PersonaRegistry::default(), &config, |_| None).unwrap();

        let result = dispatcher.chat("Peter", "ping").await.unwrap();
        assert_eq!(result, ChatResult::Response("pong".to_string()));

        let calls = local.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].authorization.is_none());
    }

    #[tokio::test]
    async fn test_cloud_persona_without_key_is_configuration_error() {
        let (cloud_url, cloud) = spawn_failing_cloud().await;
        let config = providers_config("http://127.0.0.1:9", &cloud_url);
        let dispatcher = Dispatcher::from_lookup(PersonaRegistry::default(), &config, |name| {
            (name == "OPENAI_API_KEY").then(|| "  ".to_string())
        })
        .unwrap();

        let result = dispatcher.chat("Alex", "hi").await.unwrap();
        assert_eq!(
            result,
            ChatResult::Error(
                "Provider cloud_completion is not configured: OPENAI_API_KEY is not set"
                    .to_string()
            )
        );
        assert!(cloud.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cloud_http_500_is_error_result() {
        let (cloud_url, cloud) = spawn_failing_cloud().await;
        let config = providers_config("http://127.0.0.1:9", &cloud_url);
        let dispatcher = Dispatcher::from_lookup(PersonaRegistry::default(), &config, |name| {
            (name == "OPENAI_API_KEY").then(|| "sk-live".to_string())
        })
        .unwrap();

        let result = dispatcher.chat("Alex", "hi").await.unwrap();
        match result {
            ChatResult::Error(msg) => assert!(msg.contains("500"), "got {msg}"),
            other => panic!("expected error, got {other:?}"),
        }
        let calls = cloud.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].authorization.as_deref(), Some("Bearer sk-live"));
    }

    #[tokio::test]
    async fn test_unreachable_local_server_is_error_result() {
        let config = providers_config("http://127.0.0.1:9", "http://127.0.0.1:9");
        let dispatcher =
            Dispatcher::from_lookup(PersonaRegistry::default(), &config, |_| None).unwrap();

        let result = dispatcher.chat("Sarah", "hi").await.unwrap();
        assert!(result.is_error());
    }
}
