//! Markdown evaluation
//!
//! Compiles transformed source into an [`Artifact`]: frontmatter data plus a
//! flat list of rendered markdown fragments and container component tags.
//! A line that holds nothing but a container tag (`<SlidePage>`,
//! `</MDXViewer>`, `<div>`) becomes a component node; everything between
//! those lines is rendered with pulldown-cmark.
//!
//! Component names are only resolved later, at invocation time.

use std::sync::OnceLock;

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde_yaml::Mapping;

use super::{Diagnostic, ViewConfig};
use crate::transform::frontmatter;

/// Lowercase elements that may wrap markdown the way components do
const INTRINSIC_CONTAINERS: &[&str] = &[
    "div", "section", "article", "header", "footer", "aside", "main",
];

/// Which markdown extensions run, derived from a `ViewConfig`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluateOptions {
    pub gfm: bool,
    pub frontmatter: bool,
    pub unwrap_images: bool,
}

impl From<&ViewConfig> for EvaluateOptions {
    fn from(config: &ViewConfig) -> Self {
        Self {
            gfm: config.gfm,
            frontmatter: config.frontmatter,
            unwrap_images: config.unwrap_images,
        }
    }
}

impl EvaluateOptions {
    fn markdown_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_TASKLISTS);
            options.insert(Options::ENABLE_FOOTNOTES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        options
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Rendered HTML for a markdown segment
    Markup(String),
    Open { name: String, attrs: String },
    Close { name: String },
}

/// Compiled document, ready to be invoked against a component registry
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub frontmatter: Mapping,
    pub nodes: Vec<Node>,
}

impl Artifact {
    /// `title` from frontmatter, when it is a string
    pub fn title(&self) -> Option<&str> {
        self.frontmatter.get("title").and_then(|v| v.as_str())
    }
}

fn tag_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*<(/?)([A-Za-z][A-Za-z0-9_.]*)((?:\s[^>]*)?)>\s*$")
            .expect("container tag pattern is valid")
    })
}

fn is_container(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase()) || INTRINSIC_CONTAINERS.contains(&name)
}

/// Compile source text into an artifact
pub fn compile(source: &str, options: EvaluateOptions) -> Result<Artifact, Diagnostic> {
    let (data, body) = if options.frontmatter {
        let matter = frontmatter::parse(source).map_err(|e| Diagnostic::compile(e.to_string()))?;
        (matter.data, matter.content)
    } else {
        (Mapping::new(), source.to_string())
    };

    let mut nodes = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut segment = String::new();
    let mut fence: Option<&str> = None;

    for (idx, line) in body.lines().enumerate() {
        let trimmed = line.trim_start();
        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
        } else if trimmed.starts_with("```") {
            fence = Some("```");
        } else if trimmed.starts_with("~~~") {
            fence = Some("~~~");
        } else if let Some(caps) = tag_line_regex().captures(line) {
            let name = &caps[2];
            let self_closing = caps[3].trim_end().ends_with('/');
            if is_container(name) && !self_closing {
                flush_segment(&mut segment, &mut nodes, options);
                if caps[1].is_empty() {
                    open.push(name.to_string());
                    nodes.push(Node::Open {
                        name: name.to_string(),
                        attrs: caps[3].trim().to_string(),
                    });
                } else {
                    match open.pop() {
                        Some(expected) if expected == name => {}
                        Some(expected) => {
                            return Err(Diagnostic::compile(format!(
                                "{}: Unexpected closing tag `</{name}>`, expected corresponding closing tag for `<{expected}>`",
                                idx + 1
                            )))
                        }
                        None => {
                            return Err(Diagnostic::compile(format!(
                                "{}: Unexpected closing tag `</{name}>` without an opening tag",
                                idx + 1
                            )))
                        }
                    }
                    nodes.push(Node::Close {
                        name: name.to_string(),
                    });
                }
                continue;
            }
        }
        segment.push_str(line);
        segment.push('\n');
    }
    flush_segment(&mut segment, &mut nodes, options);

    if let Some(unclosed) = open.pop() {
        return Err(Diagnostic::compile(format!(
            "Expected a closing tag for `<{unclosed}>` before the end of the document"
        )));
    }

    Ok(Artifact {
        frontmatter: data,
        nodes,
    })
}

fn flush_segment(segment: &mut String, nodes: &mut Vec<Node>, options: EvaluateOptions) {
    if segment.trim().is_empty() {
        segment.clear();
        return;
    }
    nodes.push(Node::Markup(render_markdown(segment, options)));
    segment.clear();
}

fn render_markdown(text: &str, options: EvaluateOptions) -> String {
    let events: Vec<Event<'_>> = Parser::new_ext(text, options.markdown_options()).collect();
    let events = if options.unwrap_images {
        unwrap_images(events)
    } else {
        events
    };
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Drop the paragraph around paragraphs that hold only images
fn unwrap_images(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut i = 0;
    while i < events.len() {
        if matches!(events[i], Event::Start(Tag::Paragraph)) {
            let end = events[i + 1..]
                .iter()
                .position(|e| matches!(e, Event::End(TagEnd::Paragraph)))
                .map(|offset| i + 1 + offset);
            if let Some(end) = end {
                if only_images(&events[i + 1..end]) {
                    out.extend(events[i + 1..end].iter().cloned());
                    i = end + 1;
                    continue;
                }
            }
        }
        out.push(events[i].clone());
        i += 1;
    }
    out
}

fn only_images(inner: &[Event<'_>]) -> bool {
    let mut depth = 0usize;
    let mut saw_image = false;
    for event in inner {
        match event {
            Event::Start(Tag::Image { .. }) => {
                depth += 1;
                saw_image = true;
            }
            Event::End(TagEnd::Image) => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            Event::Text(text) if text.trim().is_empty() => {}
            Event::SoftBreak | Event::HardBreak => {}
            _ => return false,
        }
    }
    saw_image
}
