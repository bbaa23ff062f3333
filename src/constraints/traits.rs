use crate::error::EvaluationError;
use serde::Serialize;

/// Outcome of checking one constraint against a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    /// Terms responsible for a failure, in the order they were detected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub offending_terms: Vec<String>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            offending_terms: Vec::new(),
        }
    }

    pub fn fail<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            passed: false,
            offending_terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_bool(passed: bool) -> Self {
        if passed { Self::pass() } else { Self::fail(Vec::<String>::new()) }
    }
}

/// A named predicate over response text.
///
/// Implementations must be pure functions of the text: no shared mutable
/// state, no dependence on other constraints. `check` must be total over any
/// string, the empty string included; an `Err` means the constraint itself is
/// misconfigured.
pub trait Constraint: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, response: &str) -> Result<Verdict, EvaluationError>;
}
