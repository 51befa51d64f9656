//! Format transformer
//!
//! Rewrites fetched markdown for a target format: wraps the body in the
//! container component for that format, strips or keeps sections, and merges
//! the page query into the document frontmatter.
//!
//! | format      | body                                                        |
//! |-------------|-------------------------------------------------------------|
//! | `ppt`       | `<SlidePage>` wrapper                                       |
//! | `doc`       | `<div>` wrapper, `---` tokens removed                       |
//! | `ppt-print` | `<PrintSlide>` wrapper                                      |
//! | default     | `<TitleSlide>` sections removed, `---` removed, `<MDXViewer>` |
//!
//! The transformation is a pure function of its inputs.

pub mod frontmatter;

use regex::Regex;
use serde_yaml::Mapping;

use crate::error::TransformError;
use crate::params::{Format, PARMS_KEY};

pub const SLIDE_PAGE: &str = "SlidePage";
pub const PRINT_SLIDE: &str = "PrintSlide";
pub const MDX_VIEWER: &str = "MDXViewer";
pub const TITLE_SLIDE: &str = "TitleSlide";

/// Produce the source text handed to the render pipeline
pub fn transform(format: Format, raw: &str, page_query: &Mapping) -> Result<String, TransformError> {
    let frontmatter::Matter { data, content } = frontmatter::parse(raw)?;

    let body = match format {
        Format::Ppt => wrap(SLIDE_PAGE, &content),
        Format::Doc => wrap("div", &strip_delimiters(&content)),
        Format::PptPrint => wrap(PRINT_SLIDE, &content),
        Format::Default => {
            let without_title = remove_section(&content, TITLE_SLIDE);
            wrap(MDX_VIEWER, &strip_delimiters(&without_title))
        }
    };

    frontmatter::stringify(&body, &merge_metadata(data, page_query))
}

/// Page query over document frontmatter; the query wins, `parms` is dropped.
pub fn merge_metadata(mut data: Mapping, page_query: &Mapping) -> Mapping {
    for (key, value) in page_query {
        if key.as_str() == Some(PARMS_KEY) {
            continue;
        }
        data.insert(key.clone(), value.clone());
    }
    data
}

/// Remove every `<tag ...>...</tag>` section, matching lazily across lines
pub fn remove_section(text: &str, tag: &str) -> String {
    let tag = regex::escape(tag);
    let pattern = format!(r"(?s)<{tag}(?:\s[^>]*)?>.*?</{tag}>");
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, "").into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "Section pattern failed to compile");
            text.to_string()
        }
    }
}

fn strip_delimiters(text: &str) -> String {
    text.replace(frontmatter::DELIMITER, "")
}

fn wrap(tag: &str, body: &str) -> String {
    format!("<{tag}>\n{body}\n</{tag}>")
}
