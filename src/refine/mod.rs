pub mod controller;
pub mod policy;
pub mod report;

pub use controller::{RefinementController, run_negative_prompt_cycle};
pub use policy::{DEFAULT_EXCLUDED_SLOT, DEFAULT_STYLE_SLOT, RefinementPolicy};
pub use report::{CycleReport, Phase, RefinementAttempt};
