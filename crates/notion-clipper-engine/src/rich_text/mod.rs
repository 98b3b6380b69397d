//! # Rich Text
//!
//! Turns inline markdown into a flat list of [`RichTextSegment`]s.
//!
//! ## Architecture
//!
//! The inline rule set (see `rules::inline`) is scanned with the shared
//! [`RuleEngine`]. For every emphasis match whose inner text still contains
//! markers, the inner text is tokenized again and the outer annotations are
//! merged onto every resulting segment.
//!
//! ## Precedence
//!
//! The outermost delimiter wins: `**a *b* c**` is one bold match whose inner
//! text is re-scanned, giving `a ` (bold), `b` (bold, italic), ` c` (bold).
//! Inline code is a raw zone and is never re-scanned.
//!
//! ## Modules
//!
//! - **`segment`**: `RichTextSegment` and its API serialization
//! - **`link`**: URL sanitation (http/https only)

pub mod link;
pub mod segment;

use serde::{Deserialize, Serialize};

pub use segment::{RichTextSegment, SegmentKind, plain_text, split_long_segments};

use crate::rules::{RuleEngine, inline::{has_nested_markers, inline_rules}};
use crate::token::{Annotations, Token, TokenType};

/// Formatting switches applied while building rich text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextOptions {
    /// Keep bold/italic/... flags. When false every segment is plain.
    pub preserve_annotations: bool,
    /// Keep links. When false links become plain text.
    pub preserve_links: bool,
}

impl Default for RichTextOptions {
    fn default() -> Self {
        Self {
            preserve_annotations: true,
            preserve_links: true,
        }
    }
}

pub struct RichTextBuilder {
    rules: &'static RuleEngine,
    options: RichTextOptions,
}

impl Default for RichTextBuilder {
    fn default() -> Self {
        Self::new(RichTextOptions::default())
    }
}

impl RichTextBuilder {
    pub fn new(options: RichTextOptions) -> Self {
        Self {
            rules: inline_rules(),
            options,
        }
    }

    /// Parses `text` into segments. Never returns empty-content segments.
    pub fn build(&self, text: &str) -> Vec<RichTextSegment> {
        let mut raw = vec![];
        self.scan(text, Annotations::default(), None, &mut raw);
        self.finish(raw)
    }

    fn scan(
        &self,
        text: &str,
        parent: Annotations,
        link: Option<&str>,
        out: &mut Vec<RichTextSegment>,
    ) {
        for token in self.rules.tokenize(text) {
            self.emit(token, parent, link, out);
        }
    }

    fn emit(
        &self,
        token: Token,
        parent: Annotations,
        link: Option<&str>,
        out: &mut Vec<RichTextSegment>,
    ) {
        let own = token.metadata.annotations.unwrap_or_default();
        let annotations = own.merged_with(parent);

        match token.token_type {
            TokenType::InlineEquation => {
                out.push(RichTextSegment::equation(token.content, annotations));
            }
            TokenType::Link => {
                let url = token.metadata.url.unwrap_or_default();
                if has_nested_markers(&token.content) {
                    self.scan(&token.content, annotations, Some(&url), out);
                } else {
                    out.push(RichTextSegment::link(token.content, &url, annotations));
                }
            }
            TokenType::AutoLink => {
                let url = token.metadata.url.unwrap_or_else(|| token.content.clone());
                out.push(RichTextSegment::link(token.content, &url, annotations));
            }
            TokenType::BoldItalic
            | TokenType::Bold
            | TokenType::Italic
            | TokenType::Strikethrough
            | TokenType::Underline
                if has_nested_markers(&token.content) =>
            {
                self.scan(&token.content, annotations, link, out);
            }
            _ => out.push(match link {
                Some(url) => RichTextSegment::link(token.content, url, annotations),
                None => RichTextSegment::text(token.content, annotations),
            }),
        }
    }

    fn finish(&self, raw: Vec<RichTextSegment>) -> Vec<RichTextSegment> {
        let mut out: Vec<RichTextSegment> = Vec::with_capacity(raw.len());
        for mut seg in raw {
            if seg.content.is_empty() {
                continue;
            }
            if !self.options.preserve_annotations {
                seg.annotations = Annotations::default();
            }
            if !self.options.preserve_links && matches!(seg.kind, SegmentKind::Link { .. }) {
                seg.kind = SegmentKind::Text;
            }
            match out.last_mut() {
                Some(prev) if prev.can_merge(&seg) => prev.content.push_str(&seg.content),
                _ => out.push(seg),
            }
        }
        out
    }
}
