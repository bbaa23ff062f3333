use super::engine::TeraEngine;
use super::slots::SlotValues;
use crate::error::TemplateError;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tera::Context;

/// Words the tera expression parser treats specially; they cannot be slot names.
const RESERVED_NAMES: [&str; 10] = [
    "true", "false", "True", "False", "and", "or", "not", "in", "is", "loop",
];

const LITERAL_PREFIX: &str = "__literal_";

/// A fully rendered instruction, ready to be sent to a generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Instruction(String);

impl Instruction {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for empty or whitespace-only text, which backends must not receive.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(String),
}

/// An instruction pattern with `{slot}` placeholders and its declared slots.
///
/// `{{` and `}}` in the pattern stand for literal braces. Every placeholder
/// has a declared slot and every declared slot appears at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    slots: Vec<String>,
    pattern: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Build a template from an explicit slot list, checking it against the pattern.
    pub fn new<S: Into<String>>(
        slots: impl IntoIterator<Item = S>,
        pattern: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        let pattern = pattern.into();
        let slots: Vec<String> = slots.into_iter().map(Into::into).collect();

        let mut seen = HashSet::new();
        for slot in &slots {
            validate_slot_name(slot)?;
            if !seen.insert(slot.as_str()) {
                return Err(TemplateError::DuplicateSlot { slot: slot.clone() });
            }
        }

        let segments = parse_segments(&pattern)?;
        let used = placeholders_in_order(&segments);

        if let Some(undeclared) = used.iter().find(|name| !seen.contains(name.as_str())) {
            return Err(TemplateError::UndeclaredPlaceholder {
                placeholder: undeclared.clone(),
            });
        }
        if let Some(unused) = slots.iter().find(|slot| !used.contains(slot)) {
            return Err(TemplateError::UnusedSlot { slot: unused.clone() });
        }

        Ok(Self {
            slots,
            pattern,
            segments,
        })
    }

    /// Build a template whose slots are its placeholders, in order of first appearance.
    pub fn parse(pattern: impl Into<String>) -> Result<Self, TemplateError> {
        let pattern = pattern.into();
        let segments = parse_segments(&pattern)?;
        let slots = placeholders_in_order(&segments);
        Ok(Self {
            slots,
            pattern,
            segments,
        })
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// First declared slot without a value, in declaration order.
    pub fn first_missing_slot(&self, values: &SlotValues) -> Option<&str> {
        self.slots
            .iter()
            .map(String::as_str)
            .find(|slot| !values.contains(slot))
    }

    /// Fill every placeholder with its value. Extra keys in `values` are ignored.
    pub fn render(&self, values: &SlotValues) -> Result<Instruction, TemplateError> {
        let context = self.context_for(values)?;
        let text = TeraEngine::render_string(&self.tera_source(), &context)?;
        Ok(Instruction(text))
    }

    /// Tera source for this template.
    ///
    /// Placeholders become `{{ slot }}` expressions. Literal runs that tera
    /// could misread (braces, trailing line breaks) are emitted as context
    /// variables so they come back out byte-for-byte.
    pub(crate) fn tera_source(&self) -> String {
        let mut source = String::with_capacity(self.pattern.len() + 16);
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Slot(name) => {
                    source.push_str("{{ ");
                    source.push_str(name);
                    source.push_str(" }}");
                }
                Segment::Literal(text) if needs_injection(text) => {
                    source.push_str("{{ ");
                    source.push_str(LITERAL_PREFIX);
                    source.push_str(&index.to_string());
                    source.push_str(" }}");
                }
                Segment::Literal(text) => source.push_str(text),
            }
        }
        source
    }

    /// Render context: declared slot values plus injected literal runs.
    ///
    /// Fails with `MissingSlot` before anything reaches the engine.
    pub(crate) fn context_for(&self, values: &SlotValues) -> Result<Context, TemplateError> {
        if let Some(slot) = self.first_missing_slot(values) {
            return Err(TemplateError::MissingSlot {
                slot: slot.to_string(),
            });
        }

        let mut context = Context::new();
        for slot in &self.slots {
            context.insert(slot.as_str(), values.get(slot).unwrap_or_default());
        }
        for (index, segment) in self.segments.iter().enumerate() {
            if let Segment::Literal(text) = segment
                && needs_injection(text)
            {
                context.insert(format!("{LITERAL_PREFIX}{index}"), text);
            }
        }
        Ok(context)
    }
}

/// Render `template` with `values`; the free-function form of [`Template::render`].
pub fn render(template: &Template, values: &SlotValues) -> Result<Instruction, TemplateError> {
    template.render(values)
}

fn needs_injection(text: &str) -> bool {
    text.contains(['{', '}']) || text.ends_with(['\n', '\r'])
}

fn validate_slot_name(name: &str) -> Result<(), TemplateError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start
        || !valid_rest
        || name.starts_with("__")
        || RESERVED_NAMES.contains(&name)
    {
        return Err(TemplateError::InvalidSlotName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn placeholders_in_order(segments: &[Segment]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for segment in segments {
        if let Segment::Slot(name) = segment
            && !names.contains(name)
        {
            names.push(name.clone());
        }
    }
    names
}

fn parse_segments(pattern: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().is_some_and(|&(_, next)| next == '}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    if inner == '{' {
                        return Err(TemplateError::UnbalancedBrace { offset });
                    }
                    name.push(inner);
                }
                if !closed {
                    return Err(TemplateError::UnbalancedBrace { offset });
                }
                validate_slot_name(&name)?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Slot(name));
            }
            '}' => return Err(TemplateError::UnbalancedBrace { offset }),
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
