use super::traits::{GenerateFuture, Provider, ensure_sendable};
use super::types::Response;
use crate::error::GenerationError;
use crate::prompt::Instruction;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Offline provider that replays scripted replies in order.
///
/// Every instruction it accepts is recorded, so callers can assert on what
/// would have been sent to a real backend.
pub struct ScriptedProvider {
    name: String,
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    received: Mutex<Vec<Instruction>>,
}

impl ScriptedProvider {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::from_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    /// Script a mix of replies and failures.
    pub fn from_results(replies: impl IntoIterator<Item = Result<String, GenerationError>>) -> Self {
        Self {
            name: "scripted".to_string(),
            replies: Mutex::new(replies.into_iter().collect()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Instructions accepted so far, oldest first.
    pub fn received(&self) -> Vec<Instruction> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn remaining(&self) -> usize {
        self.lock_replies().len()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, GenerationError>>> {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_reply(&self, instruction: &Instruction) -> Result<Response, GenerationError> {
        ensure_sendable(instruction)?;
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(instruction.clone());

        match self.lock_replies().pop_front() {
            Some(Ok(text)) if text.trim().is_empty() => Err(GenerationError::EmptyReply {
                provider: self.name.clone(),
            }),
            Some(Ok(text)) => Ok(Response::text_only(text).with_model(self.name.clone())),
            Some(Err(err)) => Err(err),
            None => Err(GenerationError::Exhausted),
        }
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate<'a>(&'a self, instruction: &'a Instruction) -> GenerateFuture<'a> {
        let result = self.next_reply(instruction);
        Box::pin(async move { result })
    }
}
