//! YAML frontmatter split and re-serialization
//!
//! A document may start with a block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Weekly sync
//! ---
//! # Agenda
//! ```
//!
//! An opening delimiter without a closing one makes the whole remainder
//! frontmatter.

use serde_yaml::{Mapping, Value};

use crate::error::TransformError;

pub const DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq)]
pub struct Matter {
    pub data: Mapping,
    pub content: String,
}

/// Split a document into frontmatter data and body
pub fn parse(input: &str) -> Result<Matter, TransformError> {
    let Some(after_open) = opening_delimiter(input) else {
        return Ok(Matter {
            data: Mapping::new(),
            content: input.to_string(),
        });
    };

    let close_marker = format!("\n{DELIMITER}");
    let (block, rest) = if let Some(rest) = after_open.strip_prefix(DELIMITER) {
        ("", rest)
    } else {
        match after_open.find(&close_marker) {
            Some(idx) => (
                &after_open[..idx],
                &after_open[idx + close_marker.len()..],
            ),
            None => (after_open, ""),
        }
    };

    // Anything else on the closing line belongs to the delimiter.
    let content = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => "",
    };

    let data = match serde_yaml::from_str::<Value>(block)? {
        Value::Null => Mapping::new(),
        Value::Mapping(map) => map,
        other => return Err(TransformError::NotAMapping(value_kind(&other))),
    };

    Ok(Matter {
        data,
        content: content.to_string(),
    })
}

/// Text after the opening `---` line, if the document starts with one
fn opening_delimiter(input: &str) -> Option<&str> {
    let rest = input.strip_prefix(DELIMITER)?;
    if rest.starts_with('-') {
        return None;
    }
    match rest.find('\n') {
        Some(idx) if rest[..idx].trim().is_empty() => Some(&rest[idx + 1..]),
        None if rest.trim().is_empty() => Some(""),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Reattach `data` as frontmatter in front of `content`
///
/// Empty data emits no block. The result always ends with a newline.
pub fn stringify(content: &str, data: &Mapping) -> Result<String, TransformError> {
    let mut out = String::with_capacity(content.len() + 64);
    if !data.is_empty() {
        let yaml = serde_yaml::to_string(data)?;
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&yaml);
        if !yaml.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
    }
    out.push_str(content);
    if !content.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}
