//! Presentation shell
//!
//! Picks the view for a format and wraps the rendered artifact in a full
//! HTML page:
//!
//! - `DocumentView` (`format=doc`): content is placed in a hidden container
//!   and laid out into print pages by the paged.js previewer.
//! - `DefaultView`: themed passthrough.
//!
//! Compile and invocation failures render inline as a diagnostic. Anything
//! that fails the page itself goes to [`Shell::error_page`], which offers a retry.

pub mod templates;
pub mod theme;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{Result, ViewerError};
use crate::params::Format;
use crate::render::{ComponentRegistry, Diagnostic, RenderContainer};

/// Where pages poll for new renders
pub const GENERATION_PATH: &str = "/api/view/generation";

#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub print_stylesheet: String,
    /// Script exposing `Paged.Previewer`; required for the document view
    pub paginator_script: Option<String>,
    /// How often the page checks for a newer render (milliseconds)
    pub poll_ms: u64,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            print_stylesheet: "/pdf.css".to_string(),
            paginator_script: Some("https://unpkg.com/pagedjs/dist/paged.js".to_string()),
            poll_ms: 2_000,
        }
    }
}

/// What is being shown, for the page chrome
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub view_key: &'a str,
    pub format: Format,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewKind {
    Document,
    Default,
}

impl From<Format> for ViewKind {
    fn from(format: Format) -> Self {
        match format {
            Format::Doc => ViewKind::Document,
            _ => ViewKind::Default,
        }
    }
}

#[derive(Serialize)]
struct PageData<'a> {
    title: &'a str,
    css: &'a str,
    format: &'a str,
    generation: u64,
    generation_url: String,
    poll_ms: u64,
    body: &'a str,
}

#[derive(Serialize)]
struct DocumentData<'a> {
    content: &'a str,
    stylesheet: &'a str,
    script: &'a str,
}

#[derive(Serialize)]
struct DiagnosticData {
    message: String,
}

#[derive(Serialize)]
struct ErrorData<'a> {
    css: &'a str,
    message: &'a str,
    method: &'a str,
    action: &'a str,
}

/// How the error page's retry button behaves
#[derive(Debug, Clone)]
pub enum Retry {
    /// Reload this URL
    Reload(String),
    /// POST to this URL to re-run the render pipeline
    Rerender(String),
}

/// Page renderer holding the compiled templates
pub struct Shell {
    handlebars: Handlebars<'static>,
    options: ShellOptions,
}

impl Shell {
    pub fn new(options: ShellOptions) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        for (name, template) in [
            (templates::PAGE, templates::PAGE_TEMPLATE),
            (templates::DOCUMENT, templates::DOCUMENT_TEMPLATE),
            (templates::DIAGNOSTIC, templates::DIAGNOSTIC_TEMPLATE),
            (templates::ERROR, templates::ERROR_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| ViewerError::Presentation(format!("template {name}: {e}")))?;
        }

        Ok(Self {
            handlebars,
            options,
        })
    }

    pub fn options(&self) -> &ShellOptions {
        &self.options
    }

    /// Render the page for the current state of a view
    ///
    /// Without a render container the body is empty; the page reloads itself
    /// once one exists.
    pub fn present(
        &self,
        ctx: PageContext<'_>,
        render: Option<&RenderContainer>,
        registry: &ComponentRegistry,
    ) -> Result<String> {
        let Some(container) = render else {
            return self.page("", "", ctx);
        };

        let title = container
            .artifact()
            .and_then(|a| a.title())
            .unwrap_or_default()
            .to_string();

        let content = match preview(container, registry) {
            Ok(html) => html,
            Err(diagnostic) => self.render(
                templates::DIAGNOSTIC,
                &DiagnosticData {
                    message: diagnostic.to_string(),
                },
            )?,
        };

        let body = match ViewKind::from(ctx.format) {
            ViewKind::Default => content,
            ViewKind::Document => self.document_view(&content)?,
        };

        self.page(&title, &body, ctx)
    }

    /// Top-level failure page with a "Try again" action
    pub fn error_page(&self, message: &str, retry: &Retry) -> Result<String> {
        let (method, action) = match retry {
            Retry::Reload(href) => ("get", href.as_str()),
            Retry::Rerender(href) => ("post", href.as_str()),
        };
        self.render(
            templates::ERROR,
            &ErrorData {
                css: theme::THEME_CSS,
                message,
                method,
                action,
            },
        )
    }

    fn document_view(&self, content: &str) -> Result<String> {
        let script = self.options.paginator_script.as_deref().ok_or_else(|| {
            ViewerError::Presentation("document view needs a paginator script".to_string())
        })?;

        self.render(
            templates::DOCUMENT,
            &DocumentData {
                content,
                stylesheet: &self.options.print_stylesheet,
                script,
            },
        )
    }

    fn page(&self, title: &str, body: &str, ctx: PageContext<'_>) -> Result<String> {
        let view: String = url::form_urlencoded::byte_serialize(ctx.view_key.as_bytes()).collect();
        self.render(
            templates::PAGE,
            &PageData {
                title,
                css: theme::THEME_CSS,
                format: ctx.format.as_str(),
                generation: ctx.generation,
                generation_url: format!("{GENERATION_PATH}?view={view}"),
                poll_ms: self.options.poll_ms,
                body,
            },
        )
    }

    fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(name, data)
            .map_err(|e| ViewerError::Presentation(e.to_string()))
    }
}

/// Invoke the compiled artifact once; both failure stages land here.
pub fn preview(
    container: &RenderContainer,
    registry: &ComponentRegistry,
) -> std::result::Result<String, Diagnostic> {
    match &container.outcome {
        Ok(artifact) => artifact.invoke(registry),
        Err(diagnostic) => Err(diagnostic.clone()),
    }
}
