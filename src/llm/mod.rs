pub mod compatible;
pub mod factory;
pub mod http_client;
pub mod ollama;
pub mod scripted;
pub mod scrub;
pub mod traits;
pub mod types;

pub use compatible::OpenAiCompatibleProvider;
pub use factory::{create_provider, hosted_base_url, resolve_api_key};
pub use http_client::{build_provider_client, build_provider_client_with_timeout};
pub use ollama::OllamaProvider;
pub use scripted::ScriptedProvider;
pub use scrub::{redact_secrets, sanitize_error_body};
pub use traits::{GenerateFuture, Provider};
pub use types::Response;
