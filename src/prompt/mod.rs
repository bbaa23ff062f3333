mod catalog;
mod engine;
mod slots;
mod template;

pub use catalog::{NEGATIVE_DESCRIPTION, NEGATIVE_EXPLANATION, NEGATIVE_SUMMARY, TemplateCatalog};
pub use engine::TeraEngine;
pub use slots::SlotValues;
pub use template::{Instruction, Template, render};
