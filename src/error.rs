use std::fmt;
use thiserror::Error;

use crate::refine::{Phase, RefinementAttempt};

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `negprompt`.
///
/// Each subsystem defines its own error enum. Library callers can match on
/// these to decide what to report; binary code uses `anyhow::Result` for
/// ad-hoc context chains.
#[derive(Debug, Error)]
pub enum NegPromptError {
    // ── Template ────────────────────────────────────────────────────────
    #[error("template: {0}")]
    Template(#[from] TemplateError),

    // ── Generation backend ──────────────────────────────────────────────
    #[error("generation: {0}")]
    Generation(#[from] GenerationError),

    // ── Constraint evaluation ───────────────────────────────────────────
    #[error("evaluation: {0}")]
    Evaluation(#[from] EvaluationError),

    // ── Config ──────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Refinement cycle ────────────────────────────────────────────────
    #[error(transparent)]
    Cycle(#[from] Box<CycleError>),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Template errors ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("missing value for slot '{slot}'")]
    MissingSlot { slot: String },

    #[error("placeholder '{{{placeholder}}}' has no declared slot")]
    UndeclaredPlaceholder { placeholder: String },

    #[error("slot '{slot}' is declared but never used in the pattern")]
    UnusedSlot { slot: String },

    #[error("slot '{slot}' is declared more than once")]
    DuplicateSlot { slot: String },

    #[error("'{name}' is not a valid slot name")]
    InvalidSlotName { name: String },

    #[error("unbalanced brace at byte {offset}")]
    UnbalancedBrace { offset: usize },

    #[error("template not found: {name}")]
    UnknownTemplate { name: String },

    #[error("template render failed: {0}")]
    Engine(String),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        // Tera nests the useful message in the source chain.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        Self::Engine(message)
    }
}

// ─── Generation errors ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("refusing to send an empty instruction")]
    EmptyInstruction,

    #[error("provider {provider} unreachable: {message}")]
    Unreachable { provider: String, message: String },

    #[error("provider {provider} authentication failed")]
    Auth { provider: String },

    #[error("provider {provider} rate-limited{}", retry_hint(*retry_after_secs))]
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
    },

    #[error("provider {provider} request failed ({status}): {message}")]
    Request {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("provider {provider} returned a malformed reply: {message}")]
    MalformedReply { provider: String, message: String },

    #[error("provider {provider} returned an empty reply")]
    EmptyReply { provider: String },

    #[error("scripted provider has no replies left")]
    Exhausted,
}

fn retry_hint(retry_after_secs: Option<u64>) -> String {
    retry_after_secs.map_or_else(String::new, |secs| format!(" (retry after {secs}s)"))
}

// ─── Evaluation errors ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("constraint '{constraint}' could not be evaluated: {message}")]
    Predicate { constraint: String, message: String },
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Refinement cycle failure ────────────────────────────────────────────────

/// Pipeline stage inside one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Render,
    Generate,
    Evaluate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Render => "render",
            Self::Generate => "generate",
            Self::Evaluate => "evaluate",
        })
    }
}

/// Why a stage inside a cycle failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// A fatal error that aborted a refinement cycle.
///
/// `attempts` holds every attempt that completed before the failure, so a
/// failure in a refined phase still hands back the initial attempt.
#[derive(Debug, Error)]
#[error("{phase} phase failed at {stage} stage: {source}")]
pub struct CycleError {
    pub phase: Phase,
    pub stage: Stage,
    #[source]
    pub source: StageFailure,
    pub attempts: Vec<RefinementAttempt>,
}

impl CycleError {
    pub fn completed_attempts(&self) -> &[RefinementAttempt] {
        &self.attempts
    }
}
