use super::http_client::build_provider_client_with_timeout;
use super::scrub::{api_error, transport_error};
use super::traits::{GenerateFuture, Provider, ensure_sendable};
use super::types::Response;
use crate::error::GenerationError;
use crate::prompt::Instruction;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Local models run slowly on modest hardware.
const OLLAMA_TIMEOUT_SECS: u64 = 300;

pub struct OllamaProvider {
    base_url: String,
    model: String,
    temperature: f64,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
    prompt_eval_count: Option<u64>,
    eval_count: Option<u64>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaProvider {
    pub fn new(base_url: Option<&str>, model: &str, temperature: f64) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(DEFAULT_OLLAMA_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            temperature,
            client: build_provider_client_with_timeout(OLLAMA_TIMEOUT_SECS),
        }
    }

    /// Replace the HTTP client with one using a different request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = build_provider_client_with_timeout(timeout_secs);
        self
    }

    fn build_request<'a>(&'a self, instruction: &'a Instruction) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: instruction.as_str(),
            }],
            stream: false,
            options: Options {
                temperature: self.temperature,
            },
        }
    }

    async fn call_api(&self, instruction: &Instruction) -> Result<ChatResponse, GenerationError> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&self.build_request(instruction))
            .send()
            .await
            .map_err(|e| match transport_error("ollama", &e) {
                GenerationError::Unreachable { provider, message } => {
                    GenerationError::Unreachable {
                        provider,
                        message: format!("{message}. Is Ollama running? (ollama serve)"),
                    }
                }
                other => other,
            })?;

        if !response.status().is_success() {
            return Err(api_error("ollama", response).await);
        }

        response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedReply {
                provider: "ollama".into(),
                message: e.to_string(),
            })
    }
}

impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn generate<'a>(&'a self, instruction: &'a Instruction) -> GenerateFuture<'a> {
        Box::pin(async move {
            ensure_sendable(instruction)?;
            debug!(model = %self.model, "sending ollama chat");
            let chat = self.call_api(instruction).await?;
            if chat.message.content.trim().is_empty() {
                return Err(GenerationError::EmptyReply {
                    provider: "ollama".into(),
                });
            }

            let mut response = Response::text_only(chat.message.content);
            if let (Some(input), Some(output)) = (chat.prompt_eval_count, chat.eval_count) {
                response = response.with_usage(input, output);
            }
            if let Some(model) = chat.model {
                response = response.with_model(model);
            }
            Ok(response)
        })
    }
}
