//! Component registry and artifact invocation
//!
//! Container components named in the source map to plain HTML elements with
//! a class the theme styles. Invoking an artifact that names a component
//! missing from the registry fails at that point, not at compile time.

use std::collections::HashMap;

use super::evaluator::{Artifact, Node};
use super::Diagnostic;
use crate::transform::{MDX_VIEWER, PRINT_SLIDE, SLIDE_PAGE, TITLE_SLIDE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub element: &'static str,
    pub class: &'static str,
}

#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    components: HashMap<String, Component>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(MDX_VIEWER, "article", "mdx-viewer");
        registry.register(SLIDE_PAGE, "section", "slide-page");
        registry.register(PRINT_SLIDE, "section", "print-slide");
        registry.register(TITLE_SLIDE, "header", "title-slide");
        registry
    }
}

impl ComponentRegistry {
    pub fn empty() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, element: &'static str, class: &'static str) {
        self.components
            .insert(name.to_string(), Component { element, class });
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }
}

impl Artifact {
    /// Expand component nodes into HTML
    pub fn invoke(&self, registry: &ComponentRegistry) -> Result<String, Diagnostic> {
        let mut out = String::new();
        let mut stack: Vec<&'static str> = Vec::new();

        for node in &self.nodes {
            match node {
                Node::Markup(html) => out.push_str(html),
                Node::Open { name, attrs } => {
                    let (element, class) = resolve(registry, name)?;
                    out.push('<');
                    out.push_str(element);
                    if let Some(class) = class {
                        out.push_str(" class=\"");
                        out.push_str(class);
                        out.push('"');
                    }
                    if !attrs.is_empty() {
                        out.push(' ');
                        out.push_str(attrs);
                    }
                    out.push_str(">\n");
                    stack.push(element);
                }
                Node::Close { .. } => {
                    if let Some(element) = stack.pop() {
                        out.push_str("</");
                        out.push_str(element);
                        out.push_str(">\n");
                    }
                }
            }
        }
        Ok(out)
    }
}

fn resolve(
    registry: &ComponentRegistry,
    name: &str,
) -> Result<(&'static str, Option<&'static str>), Diagnostic> {
    if let Some(component) = registry.get(name) {
        return Ok((component.element, Some(component.class)));
    }
    if name.starts_with(|c: char| c.is_ascii_uppercase()) {
        return Err(Diagnostic::invoke(format!(
            "Expected component `{name}` to be defined: you likely forgot to import, pass, or provide it."
        )));
    }
    intrinsic(name)
        .map(|element| (element, None))
        .ok_or_else(|| Diagnostic::invoke(format!("Unknown element `<{name}>`")))
}

fn intrinsic(name: &str) -> Option<&'static str> {
    Some(match name {
        "div" => "div",
        "section" => "section",
        "article" => "article",
        "header" => "header",
        "footer" => "footer",
        "aside" => "aside",
        "main" => "main",
        _ => return None,
    })
}
