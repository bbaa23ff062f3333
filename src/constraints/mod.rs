pub mod builtin;
pub mod evaluator;
pub mod set;
pub mod traits;

pub use builtin::{
    NO_ANALOGIES, NO_EXCLUDED_WORDS, NoAnalogies, NoExcludedWords, PredicateConstraint,
    WORD_COUNT, WordCount,
};
pub use evaluator::{EvaluationResult, evaluate};
pub use set::ConstraintSet;
pub use traits::{Constraint, Verdict};
