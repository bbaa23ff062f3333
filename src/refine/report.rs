use crate::constraints::EvaluationResult;
use crate::llm::Response;
use crate::prompt::{Instruction, SlotValues};
use serde::{Serialize, Serializer};
use std::fmt::{self, Write as _};

/// Position of an attempt within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Initial,
    /// 1-based index of the refinement.
    Refined(u32),
}

impl Phase {
    pub fn is_initial(self) -> bool {
        matches!(self, Self::Initial)
    }

    pub fn next(self) -> Self {
        match self {
            Self::Initial => Self::Refined(1),
            Self::Refined(n) => Self::Refined(n.saturating_add(1)),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => f.write_str("initial"),
            Self::Refined(n) => write!(f, "refined#{n}"),
        }
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One render → generate → evaluate pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinementAttempt {
    pub phase: Phase,
    pub parameters: SlotValues,
    pub instruction: Instruction,
    pub response: Response,
    pub evaluation: EvaluationResult,
}

impl RefinementAttempt {
    pub fn passed(&self) -> bool {
        self.evaluation.all_passed()
    }
}

/// Every attempt of a completed cycle, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub attempts: Vec<RefinementAttempt>,
    /// Outcome of the last attempt only.
    pub final_passed: bool,
}

impl CycleReport {
    pub fn new(attempts: Vec<RefinementAttempt>) -> Self {
        let final_passed = attempts.last().is_some_and(RefinementAttempt::passed);
        Self {
            attempts,
            final_passed,
        }
    }

    pub fn initial(&self) -> Option<&RefinementAttempt> {
        self.attempts.first()
    }

    pub fn last(&self) -> Option<&RefinementAttempt> {
        self.attempts.last()
    }

    pub fn refined(&self) -> impl Iterator<Item = &RefinementAttempt> {
        self.attempts.iter().filter(|a| !a.phase.is_initial())
    }

    pub fn render_text_summary(&self) -> String {
        let mut lines = vec![
            "negative prompt cycle".to_string(),
            format!("attempts: {}", self.attempts.len()),
        ];
        for attempt in &self.attempts {
            lines.push(String::new());
            lines.push(format!(
                "[{}] {}",
                attempt.phase,
                if attempt.passed() { "PASS" } else { "FAIL" }
            ));
            lines.push(format!("instruction: {}", attempt.instruction));
            lines.push(format!("response: {}", attempt.response.as_str().trim()));
            for (name, verdict) in attempt.evaluation.iter() {
                let mut line = format!(
                    "  {name}: {}",
                    if verdict.passed { "pass" } else { "fail" }
                );
                if !verdict.offending_terms.is_empty() {
                    let _ = write!(line, " ({})", verdict.offending_terms.join(", "));
                }
                lines.push(line);
            }
        }
        lines.push(String::new());
        lines.push(format!(
            "final: {}",
            if self.final_passed { "passed" } else { "failed" }
        ));
        lines.join("\n")
    }
}
