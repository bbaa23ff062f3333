#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod constraints;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod refine;

pub use config::Config;
pub use constraints::{Constraint, ConstraintSet, EvaluationResult, evaluate};
pub use error::{CycleError, NegPromptError};
pub use llm::{Provider, Response, create_provider};
pub use prompt::{Instruction, SlotValues, Template, render};
pub use refine::{
    CycleReport, RefinementAttempt, RefinementController, RefinementPolicy,
    run_negative_prompt_cycle,
};
