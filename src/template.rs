//! Prompt template collaborator interface.
//!
//! Template rendering is external to the core: the client only needs an
//! opaque "template text plus variables in, string out" function. Hosts
//! with a real template engine implement [`TemplateRenderer`] over it;
//! [`VarSubstRenderer`] covers the simple `{{name}}` substitution case.

use std::collections::HashMap;

use crate::Result;

/// Renders prompt text from a template and a set of variables.
///
/// The core treats this as an opaque function; how templates are stored
/// and what syntax they use is entirely up to the implementation.
pub trait TemplateRenderer: Send + Sync {
    /// Render `template` with the given variables.
    fn render(&self, template: &str, vars: &HashMap<String, String>) -> Result<String>;
}

/// Minimal renderer replacing `{{name}}` placeholders.
///
/// Unknown placeholders are left in place rather than erased, which makes
/// missing variables visible in the rendered prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarSubstRenderer;

impl VarSubstRenderer {
    /// Create a new substitution renderer.
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for VarSubstRenderer {
    fn render(&self, template: &str, vars: &HashMap<String, String>) -> Result<String> {
        let mut out = template.to_string();
        for (name, value) in vars {
            out = out.replace(&format!("{{{{{}}}}}", name), value);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renderer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn TemplateRenderer>();
        assert_send_sync::<VarSubstRenderer>();
    }

    #[test]
    fn substitutes_placeholders() {
        let renderer = VarSubstRenderer::new();
        let rendered = renderer
            .render(
                "Hello {{name}}, you are {{mood}}.",
                &vars(&[("name", "Ada"), ("mood", "curious")]),
            )
            .unwrap();
        assert_eq!(rendered, "Hello Ada, you are curious.");
    }

    #[test]
    fn unknown_placeholders_are_preserved() {
        let renderer = VarSubstRenderer::new();
        let rendered = renderer.render("{{missing}} text", &vars(&[])).unwrap();
        assert_eq!(rendered, "{{missing}} text");
    }

    #[test]
    fn plain_text_passes_through() {
        let renderer = VarSubstRenderer::new();
        let rendered = renderer.render("no placeholders", &vars(&[("x", "y")])).unwrap();
        assert_eq!(rendered, "no placeholders");
    }
}
