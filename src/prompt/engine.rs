use crate::error::TemplateError;
use tera::{Context, Tera};

/// Tera-backed engine that compiled instruction templates are registered with.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    /// Create an empty engine. Autoescaping is off: instructions are plain text.
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        Self { tera }
    }

    /// Register (or replace) a template source under `name`.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.tera.add_raw_template(name, source)?;
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a registered template with the given context.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, TemplateError> {
        if !self.has_template(name) {
            return Err(TemplateError::UnknownTemplate {
                name: name.to_string(),
            });
        }
        Ok(self.tera.render(name, context)?)
    }

    /// Render a one-off source string without registering it.
    pub fn render_string(source: &str, context: &Context) -> Result<String, TemplateError> {
        Ok(Tera::one_off(source, context, false)?)
    }
}

impl Default for TeraEngine {
    fn default() -> Self {
        Self::new()
    }
}
