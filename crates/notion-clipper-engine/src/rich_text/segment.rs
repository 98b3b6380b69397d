use serde::ser::{Serialize, SerializeMap, Serializer};

use super::link::sanitize_url;
use crate::token::Annotations;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Text,
    Equation,
    Link { url: String },
}

/// An inline-formatted run of text, equation or link.
///
/// Construct through [`text`](Self::text), [`equation`](Self::equation) or
/// [`link`](Self::link); `link` refuses non-http(s) URLs and yields a text
/// segment instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextSegment {
    pub kind: SegmentKind,
    pub content: String,
    pub annotations: Annotations,
}

impl RichTextSegment {
    pub fn text(content: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            kind: SegmentKind::Text,
            content: content.into(),
            annotations,
        }
    }

    pub fn equation(expression: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            kind: SegmentKind::Equation,
            content: expression.into(),
            annotations,
        }
    }

    pub fn link(content: impl Into<String>, url: &str, annotations: Annotations) -> Self {
        match sanitize_url(url) {
            Some(url) => Self {
                kind: SegmentKind::Link { url },
                content: content.into(),
                annotations,
            },
            None => Self::text(content, annotations),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            SegmentKind::Link { url } => Some(url),
            _ => None,
        }
    }

    /// Whether `other` can be appended to `self` without changing meaning.
    pub fn can_merge(&self, other: &RichTextSegment) -> bool {
        self.annotations == other.annotations
            && match (&self.kind, &other.kind) {
                (SegmentKind::Text, SegmentKind::Text) => true,
                (SegmentKind::Link { url: a }, SegmentKind::Link { url: b }) => a == b,
                _ => false,
            }
    }
}

/// Concatenated plain text of a segment list.
pub fn plain_text(segments: &[RichTextSegment]) -> String {
    segments.iter().map(|s| s.content.as_str()).collect()
}

/// Splits segments whose content exceeds `max_chars` characters.
pub fn split_long_segments(segments: Vec<RichTextSegment>, max_chars: usize) -> Vec<RichTextSegment> {
    let max_chars = max_chars.max(1);
    let mut out = Vec::with_capacity(segments.len());
    for seg in segments {
        if seg.content.chars().count() <= max_chars {
            out.push(seg);
            continue;
        }
        let chars: Vec<char> = seg.content.chars().collect();
        for chunk in chars.chunks(max_chars) {
            out.push(RichTextSegment {
                kind: seg.kind.clone(),
                content: chunk.iter().collect(),
                annotations: seg.annotations,
            });
        }
    }
    out
}

struct ApiAnnotations<'a>(&'a Annotations);

impl Serialize for ApiAnnotations<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let a = self.0;
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry("bold", &a.bold)?;
        map.serialize_entry("italic", &a.italic)?;
        map.serialize_entry("strikethrough", &a.strikethrough)?;
        map.serialize_entry("underline", &a.underline)?;
        map.serialize_entry("code", &a.code)?;
        map.serialize_entry("color", "default")?;
        map.end()
    }
}

struct TextBody<'a> {
    content: &'a str,
    url: Option<&'a str>,
}

impl Serialize for TextBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("content", self.content)?;
        if let Some(url) = self.url {
            map.serialize_entry("link", &LinkBody(url))?;
        }
        map.end()
    }
}

struct LinkBody<'a>(&'a str);

impl Serialize for LinkBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("url", self.0)?;
        map.end()
    }
}

struct EquationBody<'a>(&'a str);

impl Serialize for EquationBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("expression", self.0)?;
        map.end()
    }
}

/// Serializes in the document API's rich text object shape.
impl Serialize for RichTextSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match &self.kind {
            SegmentKind::Equation => {
                map.serialize_entry("type", "equation")?;
                map.serialize_entry("equation", &EquationBody(&self.content))?;
            }
            kind => {
                let url = match kind {
                    SegmentKind::Link { url } => Some(url.as_str()),
                    _ => None,
                };
                map.serialize_entry("type", "text")?;
                map.serialize_entry(
                    "text",
                    &TextBody {
                        content: &self.content,
                        url,
                    },
                )?;
            }
        }
        map.serialize_entry("annotations", &ApiAnnotations(&self.annotations))?;
        map.serialize_entry("plain_text", &self.content)?;
        if let Some(url) = self.url() {
            map.serialize_entry("href", url)?;
        }
        map.end()
    }
}
