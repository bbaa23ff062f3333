use super::traits::{Constraint, Verdict};
use crate::error::EvaluationError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const WORD_COUNT: &str = "word_count";
pub const NO_EXCLUDED_WORDS: &str = "no_excluded_words";
pub const NO_ANALOGIES: &str = "no_analogies";

/// Whole-word "as" / "like". A lexical proxy for analogies: literal uses of
/// either word trip it too.
static ANALOGY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:as|like)\b").unwrap_or_else(|e| panic!("analogy pattern: {e}"))
});

/// Terms handed to refinement when `no_analogies` fails.
pub const ANALOGY_TERMS: [&str; 2] = ["like", "as"];

/// Passes when the response has at most `max` whitespace-delimited words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCount {
    pub max: usize,
}

impl WordCount {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Constraint for WordCount {
    fn name(&self) -> &str {
        WORD_COUNT
    }

    fn check(&self, response: &str) -> Result<Verdict, EvaluationError> {
        Ok(Verdict::from_bool(
            response.split_whitespace().count() <= self.max,
        ))
    }
}

/// Passes when no forbidden word or phrase appears as a case-insensitive
/// substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoExcludedWords {
    words: Vec<String>,
    lowered: Vec<String>,
}

impl NoExcludedWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        let lowered = words.iter().map(|w| w.to_lowercase()).collect();
        Self { words, lowered }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl Constraint for NoExcludedWords {
    fn name(&self) -> &str {
        NO_EXCLUDED_WORDS
    }

    fn check(&self, response: &str) -> Result<Verdict, EvaluationError> {
        // A blank entry would match every response.
        if let Some(index) = self.lowered.iter().position(|w| w.trim().is_empty()) {
            return Err(EvaluationError::Predicate {
                constraint: NO_EXCLUDED_WORDS.into(),
                message: format!("forbidden word #{index} is blank"),
            });
        }

        let haystack = response.to_lowercase();
        let hits: Vec<&str> = self
            .words
            .iter()
            .zip(&self.lowered)
            .filter(|(_, lowered)| haystack.contains(lowered.as_str()))
            .map(|(original, _)| original.as_str())
            .collect();

        if hits.is_empty() {
            Ok(Verdict::pass())
        } else {
            Ok(Verdict::fail(hits))
        }
    }
}

/// Passes when neither "as" nor "like" occurs as a whole word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoAnalogies;

impl Constraint for NoAnalogies {
    fn name(&self) -> &str {
        NO_ANALOGIES
    }

    fn check(&self, response: &str) -> Result<Verdict, EvaluationError> {
        if ANALOGY_MARKER.is_match(response) {
            Ok(Verdict::fail(ANALOGY_TERMS))
        } else {
            Ok(Verdict::pass())
        }
    }
}

type FalliblePredicate = dyn Fn(&str) -> Result<bool, String> + Send + Sync;

/// A caller-supplied predicate registered under its own name.
pub struct PredicateConstraint {
    name: String,
    predicate: Box<FalliblePredicate>,
}

impl PredicateConstraint {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::fallible(name, move |response| Ok(predicate(response)))
    }

    /// A predicate that may report it cannot judge the response.
    pub fn fallible<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl fmt::Debug for PredicateConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateConstraint")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Constraint for PredicateConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, response: &str) -> Result<Verdict, EvaluationError> {
        (self.predicate)(response)
            .map(Verdict::from_bool)
            .map_err(|message| EvaluationError::Predicate {
                constraint: self.name.clone(),
                message,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn word_count_boundary() {
        let c = WordCount::new(100);
        assert!(c.check(&words(100)).unwrap().passed);
        assert!(!c.check(&words(101)).unwrap().passed);
    }

    #[test]
    fn word_count_splits_on_any_whitespace() {
        let c = WordCount::new(3);
        assert!(c.check("  one\ttwo\n\nthree  ").unwrap().passed);
        assert!(!c.check("one two three four").unwrap().passed);
        assert!(c.check("").unwrap().passed);
    }

    #[test]
    fn zero_max_only_accepts_blank_text() {
        let c = WordCount::new(0);
        assert!(c.check("   ").unwrap().passed);
        assert!(!c.check("a").unwrap().passed);
    }

    #[test]
    fn excluded_words_are_case_insensitive() {
        let c = NoExcludedWords::new(["robot"]);
        let verdict = c.check("This uses a Robot.").unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.offending_terms, ["robot"]);
        assert!(c.check("This uses a neural network.").unwrap().passed);
    }

    #[test]
    fn excluded_words_match_substrings_and_phrases() {
        let c = NoExcludedWords::new(["robot", "Science Fiction", "human-like"]);
        let verdict = c
            .check("Robotics borrows from science fiction and human-like agents.")
            .unwrap();
        assert_eq!(
            verdict.offending_terms,
            ["robot", "Science Fiction", "human-like"]
        );
    }

    #[test]
    fn empty_exclusion_list_always_passes() {
        let c = NoExcludedWords::new(Vec::<String>::new());
        assert!(c.check("anything at all").unwrap().passed);
        assert!(c.check("").unwrap().passed);
    }

    #[test]
    fn blank_forbidden_word_is_a_predicate_error() {
        let c = NoExcludedWords::new(["robot", " "]);
        let err = c.check("text").unwrap_err();
        assert_eq!(
            err,
            EvaluationError::Predicate {
                constraint: "no_excluded_words".into(),
                message: "forbidden word #1 is blank".into(),
            }
        );
    }

    #[test]
    fn analogies_detected_as_whole_words() {
        let c = NoAnalogies;
        let verdict = c.check("It behaves like water").unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.offending_terms, ["like", "as"]);

        assert!(!c.check("As noted, it works.").unwrap().passed);
        assert!(!c.check("fast AS lightning").unwrap().passed);
    }

    #[test]
    fn analogy_markers_inside_words_are_ignored() {
        let c = NoAnalogies;
        assert!(c.check("Likewise, it performs well").unwrap().passed);
        assert!(c.check("It was unlikely; the task has a basis.").unwrap().passed);
        assert!(c.check("").unwrap().passed);
    }

    #[test]
    fn literal_like_still_fails() {
        assert!(!NoAnalogies.check("Users like the interface.").unwrap().passed);
    }

    #[test]
    fn predicate_constraint_wraps_closures() {
        let c = PredicateConstraint::new("ends_with_period", |r| r.trim_end().ends_with('.'));
        assert_eq!(c.name(), "ends_with_period");
        assert!(c.check("Done.").unwrap().passed);
        assert!(!c.check("Done").unwrap().passed);
    }

    #[test]
    fn fallible_predicate_errors_name_the_constraint() {
        let c = PredicateConstraint::fallible("needs_config", |_| Err("threshold unset".into()));
        let err = c.check("x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "constraint 'needs_config' could not be evaluated: threshold unset"
        );
    }
}
