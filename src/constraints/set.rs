use super::builtin::{NoAnalogies, NoExcludedWords, WordCount};
use super::traits::Constraint;
use crate::config::ConstraintsConfig;
use indexmap::IndexMap;
use std::fmt;

/// Insertion-ordered mapping from constraint name to constraint.
#[derive(Default)]
pub struct ConstraintSet {
    constraints: IndexMap<String, Box<dyn Constraint>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `word_count`, `no_excluded_words` and `no_analogies`, in that order.
    pub fn standard(config: &ConstraintsConfig) -> Self {
        Self::new()
            .with(WordCount::new(config.max_word_count))
            .with(NoExcludedWords::new(config.forbidden_words.iter().cloned()))
            .with(NoAnalogies)
    }

    pub fn with(mut self, constraint: impl Constraint + 'static) -> Self {
        self.insert(constraint);
        self
    }

    /// Add a constraint under its own name. A constraint already registered
    /// under that name is replaced and keeps its position; it is returned.
    pub fn insert(&mut self, constraint: impl Constraint + 'static) -> Option<Box<dyn Constraint>> {
        self.insert_boxed(Box::new(constraint))
    }

    pub fn insert_boxed(&mut self, constraint: Box<dyn Constraint>) -> Option<Box<dyn Constraint>> {
        self.constraints
            .insert(constraint.name().to_string(), constraint)
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Constraint>> {
        self.constraints.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Constraint> {
        self.constraints.get(name).map(|c| &**c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constraints.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constraints.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Constraint> {
        self.constraints.values().map(|c| &**c)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
