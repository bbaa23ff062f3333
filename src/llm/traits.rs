use super::types::Response;
use crate::error::GenerationError;
use crate::prompt::Instruction;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`Provider::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Response, GenerationError>> + Send + 'a>>;

/// A text-generation backend: one instruction in, one response out.
///
/// Implementations make exactly one backend call per `generate` and never
/// retry on their own; retry policy belongs to the caller.
pub trait Provider: Send + Sync {
    /// Provider identifier used in logs and errors (e.g. "openai", "ollama").
    fn name(&self) -> &str;

    fn generate<'a>(&'a self, instruction: &'a Instruction) -> GenerateFuture<'a>;

    /// Warm up the HTTP connection pool.
    fn warmup(&self) -> Pin<Box<dyn Future<Output = Result<(), GenerationError>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }
}

/// Reject empty or whitespace-only instructions before any backend call.
pub fn ensure_sendable(instruction: &Instruction) -> Result<(), GenerationError> {
    if instruction.is_blank() {
        return Err(GenerationError::EmptyInstruction);
    }
    Ok(())
}
