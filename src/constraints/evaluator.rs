use super::set::ConstraintSet;
use super::traits::Verdict;
use crate::error::EvaluationError;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// One verdict per constraint of the set that produced it, in set order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EvaluationResult {
    verdicts: IndexMap<String, Verdict>,
}

impl EvaluationResult {
    /// `None` when no constraint of that name was evaluated.
    pub fn passed(&self, name: &str) -> Option<bool> {
        self.verdicts.get(name).map(|v| v.passed)
    }

    pub fn verdict(&self, name: &str) -> Option<&Verdict> {
        self.verdicts.get(name)
    }

    /// True for an empty set as well.
    pub fn all_passed(&self) -> bool {
        self.verdicts.values().all(|v| v.passed)
    }

    /// Names of failed constraints, in set order.
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.verdicts
            .iter()
            .filter(|(_, v)| !v.passed)
            .map(|(name, _)| name.as_str())
    }

    /// Offending terms of every failed constraint, in set order.
    pub fn offending_terms(&self) -> impl Iterator<Item = &str> {
        self.verdicts
            .values()
            .filter(|v| !v.passed)
            .flat_map(|v| v.offending_terms.iter().map(String::as_str))
    }

    pub fn as_bool_map(&self) -> IndexMap<String, bool> {
        self.verdicts
            .iter()
            .map(|(name, v)| (name.clone(), v.passed))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Verdict)> {
        self.verdicts.iter().map(|(name, v)| (name.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

impl FromIterator<(String, Verdict)> for EvaluationResult {
    fn from_iter<I: IntoIterator<Item = (String, Verdict)>>(iter: I) -> Self {
        Self {
            verdicts: iter.into_iter().collect(),
        }
    }
}

/// Score `response` against every constraint in `constraints`.
///
/// A constraint that cannot judge the response aborts the whole evaluation.
pub fn evaluate(
    response: &str,
    constraints: &ConstraintSet,
) -> Result<EvaluationResult, EvaluationError> {
    let verdicts = constraints
        .iter()
        .map(|constraint| -> Result<(String, Verdict), EvaluationError> {
            let verdict = constraint.check(response)?;
            debug!(
                constraint = constraint.name(),
                passed = verdict.passed,
                "constraint checked"
            );
            Ok((constraint.name().to_string(), verdict))
        })
        .collect::<Result<IndexMap<_, _>, _>>()?;
    Ok(EvaluationResult { verdicts })
}
