//! Render pipeline
//!
//! Turns a `ViewConfig` into a `RenderContainer`. Compilation runs on the
//! blocking pool; any failure there, including a panic, becomes a single
//! fatal diagnostic on the container. Invocation happens later in the
//! presentation shell and reports failures through the same `Diagnostic`.

pub mod components;
pub mod debounce;
pub mod evaluator;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

pub use components::{Component, ComponentRegistry};
pub use debounce::Debouncer;
pub use evaluator::{compile, Artifact, EvaluateOptions, Node};

/// Placeholder source shown before any content arrives
pub const DEFAULT_VALUE: &str = "# No Content Loaded\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    pub gfm: bool,
    pub frontmatter: bool,
    pub unwrap_images: bool,
    pub value: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            frontmatter: true,
            unwrap_images: true,
            value: DEFAULT_VALUE.to_string(),
        }
    }
}

impl ViewConfig {
    /// Same flags, new source text
    pub fn with_value(&self, value: String) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Compile,
    Invoke,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub fatal: bool,
    pub stage: Stage,
}

impl Diagnostic {
    pub fn compile(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: true,
            stage: Stage::Compile,
        }
    }

    pub fn invoke(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: true,
            stage: Stage::Invoke,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.stage {
            Stage::Compile => "compile",
            Stage::Invoke => "invoke",
        };
        write!(f, "[{stage}] {}", self.message)
    }
}

/// One evaluation attempt: the source it was built from, the compiled
/// artifact or the failure, and the messages collected along the way.
#[derive(Debug, Clone)]
pub struct RenderContainer {
    pub source: String,
    pub outcome: Result<Arc<Artifact>, Diagnostic>,
    pub messages: Vec<Diagnostic>,
}

impl RenderContainer {
    fn failed(source: String, diagnostic: Diagnostic) -> Self {
        let mut container = Self {
            source,
            outcome: Err(diagnostic.clone()),
            messages: Vec::new(),
        };
        container.push_message(diagnostic);
        container
    }

    pub fn push_message(&mut self, diagnostic: Diagnostic) {
        if !self.messages.contains(&diagnostic) {
            self.messages.push(diagnostic);
        }
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.outcome.as_ref().ok().map(Arc::as_ref)
    }

    pub fn is_fatal(&self) -> bool {
        self.messages.iter().any(|m| m.fatal)
    }
}

/// Evaluate a config into a render container
pub async fn evaluate(config: &ViewConfig) -> RenderContainer {
    let options = EvaluateOptions::from(config);
    let source = config.value.clone();
    let compile_source = source.clone();

    let result = tokio::task::spawn_blocking(move || compile(&compile_source, options)).await;

    match result {
        Ok(Ok(artifact)) => RenderContainer {
            source,
            outcome: Ok(Arc::new(artifact)),
            messages: Vec::new(),
        },
        Ok(Err(diagnostic)) => {
            warn!(error = %diagnostic, "Evaluation failed");
            RenderContainer::failed(source, diagnostic)
        }
        Err(e) => {
            warn!(error = %e, "Evaluation task failed");
            RenderContainer::failed(source, Diagnostic::compile(e.to_string()))
        }
    }
}
