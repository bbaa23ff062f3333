use crate::config::{DEFAULT_MAX_REFINEMENT_ATTEMPTS, DEFAULT_STYLISTIC_QUALIFIER, RefinementConfig};
use crate::constraints::EvaluationResult;
use crate::prompt::SlotValues;

pub const DEFAULT_EXCLUDED_SLOT: &str = "excluded_words";
pub const DEFAULT_STYLE_SLOT: &str = "style";

/// How a failed attempt's parameters are nudged before the next attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementPolicy {
    /// Refined attempts allowed after the initial one; `0` disables refinement.
    pub max_refinement_attempts: u32,
    /// Appended to the style slot on refinement; empty disables it.
    pub stylistic_qualifier: String,
    pub excluded_slot: String,
    pub style_slot: String,
}

impl Default for RefinementPolicy {
    fn default() -> Self {
        Self {
            max_refinement_attempts: DEFAULT_MAX_REFINEMENT_ATTEMPTS,
            stylistic_qualifier: DEFAULT_STYLISTIC_QUALIFIER.to_string(),
            excluded_slot: DEFAULT_EXCLUDED_SLOT.to_string(),
            style_slot: DEFAULT_STYLE_SLOT.to_string(),
        }
    }
}

impl From<&RefinementConfig> for RefinementPolicy {
    fn from(config: &RefinementConfig) -> Self {
        Self {
            max_refinement_attempts: config.max_refinement_attempts,
            stylistic_qualifier: config.stylistic_qualifier.trim().to_string(),
            ..Self::default()
        }
    }
}

impl RefinementPolicy {
    pub fn with_max_refinement_attempts(mut self, attempts: u32) -> Self {
        self.max_refinement_attempts = attempts;
        self
    }

    pub fn with_stylistic_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.stylistic_qualifier = qualifier.into();
        self
    }

    /// Parameters for the next attempt.
    ///
    /// Offending terms of every failed constraint are appended to the excluded
    /// slot (comma-separated, skipping terms already listed, ignoring case) and
    /// the qualifier is appended to the style slot unless already there. A
    /// fully passing evaluation returns the parameters unchanged.
    pub fn refine(&self, parameters: &SlotValues, evaluation: &EvaluationResult) -> SlotValues {
        let mut refined = parameters.clone();
        if evaluation.all_passed() {
            return refined;
        }

        let excluded = append_unique(
            parameters.get(&self.excluded_slot),
            evaluation.offending_terms(),
        );
        if let Some(excluded) = excluded {
            refined.insert(self.excluded_slot.clone(), excluded);
        }

        let qualifier = self.stylistic_qualifier.trim();
        if !qualifier.is_empty()
            && let Some(style) =
                append_unique(parameters.get(&self.style_slot), std::iter::once(qualifier))
        {
            refined.insert(self.style_slot.clone(), style);
        }

        refined
    }
}

/// Extend a comma-separated list with `additions` not already present.
/// `None` when nothing was added.
fn append_unique<'a>(
    current: Option<&str>,
    additions: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let mut items: Vec<String> = current
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect();
    let original_len = items.len();

    for addition in additions.map(str::trim).filter(|a| !a.is_empty()) {
        let lowered = addition.to_lowercase();
        if !items.iter().any(|item| item.to_lowercase() == lowered) {
            items.push(addition.to_string());
        }
    }

    (items.len() > original_len).then(|| items.join(", "))
}
