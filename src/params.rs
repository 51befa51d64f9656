//! Page parameters derived from the view request
//!
//! A view path looks like `/output/pad/team/notes?format=ppt&title=Demo`:
//! the first segment selects the source, the rest is the location, and the
//! query string (plus the raw segment list under `parms`) becomes the page
//! query that is merged into document frontmatter.

use std::fmt;

use serde_yaml::{Mapping, Value};
use url::form_urlencoded;

use crate::error::{Result, ViewerError};

/// Query key holding the raw path segments
pub const PARMS_KEY: &str = "parms";

/// Where the document text comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    File,
    Pad,
    None,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::File => "file",
            Source::Pad => "pad",
            Source::None => "none",
        }
    }
}

/// Output format selected by the `format` query parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Format {
    #[default]
    Default,
    Doc,
    Ppt,
    PptPrint,
}

impl Format {
    /// Unrecognized tags fall back to `Default`.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "doc" => Format::Doc,
            "ppt" => Format::Ppt,
            "ppt-print" => Format::PptPrint,
            _ => Format::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Default => "default",
            Format::Doc => "doc",
            Format::Ppt => "ppt",
            Format::PptPrint => "ppt-print",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageParams {
    pub source: Source,
    pub location: String,
    pub format: Format,
    /// Every query parameter in request order, plus `parms`
    pub query: Mapping,
}

impl PageParams {
    /// Build from the wildcard path (without the `/output/` prefix) and the
    /// decoded query pairs.
    ///
    /// A single segment carries no location, so nothing is fetched.
    pub fn from_request(path: &str, pairs: &[(String, String)]) -> Result<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.iter().any(|s| *s == "..") {
            return Err(ViewerError::InvalidPath(path.to_string()));
        }

        let (source, location) = if segments.len() > 1 {
            let source = match segments[0] {
                "file" => Source::File,
                "pad" => Source::Pad,
                other => return Err(ViewerError::UnknownSource(other.to_string())),
            };
            (source, segments[1..].join("/"))
        } else {
            (Source::None, String::new())
        };

        let mut query = Mapping::new();
        for (key, value) in pairs {
            let key = Value::String(key.clone());
            let value = Value::String(value.clone());
            match query.get_mut(&key) {
                Some(Value::Sequence(seq)) => seq.push(value),
                Some(existing) => {
                    let first = existing.clone();
                    *existing = Value::Sequence(vec![first, value]);
                }
                None => {
                    query.insert(key, value);
                }
            }
        }
        query.insert(
            Value::String(PARMS_KEY.to_string()),
            Value::Sequence(
                segments
                    .iter()
                    .map(|s| Value::String((*s).to_string()))
                    .collect(),
            ),
        );

        let format = match query.get("format") {
            Some(Value::String(tag)) => Format::parse(tag),
            Some(Value::Sequence(tags)) => tags
                .first()
                .and_then(Value::as_str)
                .map(Format::parse)
                .unwrap_or_default(),
            _ => Format::Default,
        };

        Ok(Self {
            source,
            location,
            format,
            query,
        })
    }

    /// Stable identity of a mounted view
    ///
    /// Location segments and query pairs are form-encoded, so two requests
    /// share a key only when their location and query are identical.
    pub fn view_key(&self) -> String {
        let location = self
            .location
            .split('/')
            .map(|segment| form_urlencoded::byte_serialize(segment.as_bytes()).collect::<String>())
            .collect::<Vec<_>>()
            .join("/");
        let mut key = format!("{}/{}", self.source.as_str(), location);

        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (k, v) in &self.query {
            let Some(k) = k.as_str() else { continue };
            if k == PARMS_KEY {
                continue;
            }
            match v {
                Value::Sequence(items) => {
                    for item in items {
                        query.append_pair(k, &scalar(item));
                    }
                }
                other => {
                    query.append_pair(k, &scalar(other));
                }
            }
            any = true;
        }
        if any {
            key.push('?');
            key.push_str(&query.finish());
        }
        key
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pad_path() {
        let params =
            PageParams::from_request("pad/team/notes", &pairs(&[("format", "ppt")])).unwrap();
        assert_eq!(params.source, Source::Pad);
        assert_eq!(params.location, "team/notes");
        assert_eq!(params.format, Format::Ppt);
        assert_eq!(params.query.get("format"), Some(&Value::from("ppt")));
        assert_eq!(
            params.query.get(PARMS_KEY),
            Some(&Value::Sequence(vec![
                Value::from("pad"),
                Value::from("team"),
                Value::from("notes")
            ]))
        );
    }

    #[test]
    fn test_single_segment_is_idle() {
        let params = PageParams::from_request("pad", &[]).unwrap();
        assert_eq!(params.source, Source::None);
        assert!(params.location.is_empty());
        assert_eq!(params.format, Format::Default);
    }

    #[test]
    fn test_unknown_source() {
        let err = PageParams::from_request("ftp/x", &[]).unwrap_err();
        assert!(matches!(err, ViewerError::UnknownSource(s) if s == "ftp"));
    }

    #[test]
    fn test_parent_segments_rejected() {
        assert!(matches!(
            PageParams::from_request("file/../secret.md", &[]),
            Err(ViewerError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_repeated_query_keys() {
        let params = PageParams::from_request(
            "file/a.md",
            &pairs(&[("tag", "x"), ("tag", "y"), ("tag", "z")]),
        )
        .unwrap();
        assert_eq!(
            params.query.get("tag"),
            Some(&Value::Sequence(vec![
                Value::from("x"),
                Value::from("y"),
                Value::from("z")
            ]))
        );
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("doc"), Format::Doc);
        assert_eq!(Format::parse("ppt-print"), Format::PptPrint);
        assert_eq!(Format::parse("print"), Format::Default);
        assert_eq!(Format::PptPrint.to_string(), "ppt-print");
    }

    #[test]
    fn test_view_key_ignores_parms() {
        let params =
            PageParams::from_request("file/docs/a.md", &pairs(&[("format", "doc")])).unwrap();
        assert_eq!(params.view_key(), "file/docs/a.md?format=doc");
    }

    #[test]
    fn test_view_key_distinguishes_encoded_query() {
        let split = PageParams::from_request("file/a.md", &pairs(&[("a", "1"), ("b", "2")])).unwrap();
        let packed = PageParams::from_request("file/a.md", &pairs(&[("a", "1&b=2")])).unwrap();
        assert_ne!(split.query, packed.query);
        assert_ne!(split.view_key(), packed.view_key());
        assert_eq!(split.view_key(), "file/a.md?a=1&b=2");
        assert_eq!(packed.view_key(), "file/a.md?a=1%26b%3D2");
    }

    #[test]
    fn test_view_key_distinguishes_location_from_query() {
        let in_path = PageParams::from_request("file/a?b=", &[]).unwrap();
        let in_query = PageParams::from_request("file/a", &pairs(&[("b", "")])).unwrap();
        assert_ne!(in_path.view_key(), in_query.view_key());
    }

    #[test]
    fn test_view_key_keeps_repeated_keys() {
        let params =
            PageParams::from_request("pad/notes", &pairs(&[("tag", "x"), ("tag", "y")])).unwrap();
        assert_eq!(params.view_key(), "pad/notes?tag=x&tag=y");
    }
}
