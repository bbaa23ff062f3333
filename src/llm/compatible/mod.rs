//! Generic OpenAI-compatible provider.
//! Most hosted LLM APIs accept the same `/chat/completions` request, so one
//! implementation covers OpenAI, OpenRouter, Groq, Mistral and self-hosted gateways.

mod types;

use self::types::{ChatRequest, ChatResponse, Message};
use super::http_client::{build_provider_client, build_provider_client_with_timeout};
use super::scrub::{api_error, transport_error};
use super::traits::{GenerateFuture, Provider, ensure_sendable};
use super::types::Response;
use crate::error::GenerationError;
use crate::prompt::Instruction;
use reqwest::Client;
use tracing::debug;

pub struct OpenAiCompatibleProvider {
    pub(crate) name: String,
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    /// Pre-computed chat completions URL.
    cached_chat_url: String,
    model: String,
    temperature: f64,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        name: &str,
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        temperature: f64,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let cached_chat_url = if base_url.ends_with("chat/completions") {
            base_url.clone()
        } else {
            format!("{base_url}/chat/completions")
        };

        Self {
            name: name.to_string(),
            cached_auth_header: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(|k| format!("Bearer {k}")),
            cached_chat_url,
            model: model.to_string(),
            temperature,
            client: build_provider_client(),
        }
    }

    /// Replace the HTTP client with one using a different request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = build_provider_client_with_timeout(timeout_secs);
        self
    }

    pub fn chat_completions_url(&self) -> &str {
        &self.cached_chat_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, instruction: &'a Instruction) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: instruction.as_str(),
            }],
            temperature: self.temperature,
        }
    }

    async fn call_api(&self, instruction: &Instruction) -> Result<ChatResponse, GenerationError> {
        let request = self.build_request(instruction);
        let mut builder = self.client.post(self.chat_completions_url()).json(&request);
        if let Some(auth) = &self.cached_auth_header {
            builder = builder.header("Authorization", auth);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&self.name, &e))?;

        if !response.status().is_success() {
            return Err(api_error(&self.name, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedReply {
                provider: self.name.clone(),
                message: e.to_string(),
            })
    }

    fn extract_response(&self, chat: ChatResponse) -> Result<Response, GenerationError> {
        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GenerationError::EmptyReply {
                provider: self.name.clone(),
            })?;

        let mut response = Response::text_only(text);
        if let Some(usage) = chat.usage {
            response = response.with_usage(usage.prompt_tokens, usage.completion_tokens);
        }
        if let Some(model) = chat.model {
            response = response.with_model(model);
        }
        Ok(response)
    }
}

impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate<'a>(&'a self, instruction: &'a Instruction) -> GenerateFuture<'a> {
        Box::pin(async move {
            ensure_sendable(instruction)?;
            debug!(provider = %self.name, model = %self.model, "sending chat completion");
            let chat = self.call_api(instruction).await?;
            self.extract_response(chat)
        })
    }
}
