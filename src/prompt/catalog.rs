use super::engine::TeraEngine;
use super::slots::SlotValues;
use super::template::{Instruction, Template};
use crate::error::TemplateError;
use indexmap::IndexMap;

pub const NEGATIVE_DESCRIPTION: &str = "negative_description";
pub const NEGATIVE_SUMMARY: &str = "negative_summary";
pub const NEGATIVE_EXPLANATION: &str = "negative_explanation";

const NEGATIVE_DESCRIPTION_PATTERN: &str =
    "Write a {style} description of {topic}. Exclude: {excluded_words}.";

const NEGATIVE_SUMMARY_PATTERN: &str = "\
Summarize {topic} in a {style} tone.
Do not mention any of the following: {excluded_words}.";

const NEGATIVE_EXPLANATION_PATTERN: &str = "\
Explain {topic} to a newcomer in a {style} way.
Avoid these words and ideas entirely: {excluded_words}.
Answer in plain prose without lists.";

/// Named instruction templates registered with a shared tera engine.
pub struct TemplateCatalog {
    engine: TeraEngine,
    templates: IndexMap<String, Template>,
}

impl TemplateCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self {
            engine: TeraEngine::new(),
            templates: IndexMap::new(),
        }
    }

    /// A catalog preloaded with the built-in negative-prompt templates.
    pub fn with_builtins() -> Result<Self, TemplateError> {
        let mut catalog = Self::new();
        for (name, pattern) in [
            (NEGATIVE_DESCRIPTION, NEGATIVE_DESCRIPTION_PATTERN),
            (NEGATIVE_SUMMARY, NEGATIVE_SUMMARY_PATTERN),
            (NEGATIVE_EXPLANATION, NEGATIVE_EXPLANATION_PATTERN),
        ] {
            catalog.register(name, Template::parse(pattern)?)?;
        }
        Ok(catalog)
    }

    /// Register (or replace) `template` under `name`.
    pub fn register(&mut self, name: &str, template: Template) -> Result<(), TemplateError> {
        self.engine.add_template(name, &template.tera_source())?;
        self.templates.insert(name.to_string(), template);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(name, t)| (name.as_str(), t))
    }

    /// Render the template registered under `name`.
    pub fn render(&self, name: &str, values: &SlotValues) -> Result<Instruction, TemplateError> {
        let template = self.get(name).ok_or_else(|| TemplateError::UnknownTemplate {
            name: name.to_string(),
        })?;
        let context = template.context_for(values)?;
        self.engine.render(name, &context).map(Instruction::new)
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new()
    }
}
