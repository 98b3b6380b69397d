//! Content type detection for `ContentType::Auto`.
//!
//! Checked in order: a single bare http(s) URL, then any block or inline
//! markdown marker, then the code-language heuristic backed by at least one
//! syntax-only marker. Anything else is text.

use serde::Serialize;

use crate::code_lang::{has_syntax_markers, score_language};
use crate::lexer::Lexer;
use crate::options::ContentType;
use crate::rich_text::link::sanitize_url;
use crate::rules::inline::inline_rules;
use crate::token::TokenType;

/// Minimum heuristic score before unmarked input is treated as code.
pub const CODE_SCORE_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedType {
    Url,
    Markdown,
    Code,
    Text,
}

impl DetectedType {
    /// The detected type an explicit content type maps to, if any.
    pub fn from_content_type(content_type: ContentType) -> Option<Self> {
        match content_type {
            ContentType::Auto => None,
            ContentType::Markdown => Some(Self::Markdown),
            ContentType::Text => Some(Self::Text),
            ContentType::Code => Some(Self::Code),
            ContentType::Url => Some(Self::Url),
        }
    }
}

pub fn detect_content_type(content: &str) -> DetectedType {
    let trimmed = content.trim();
    if !trimmed.is_empty()
        && !trimmed.contains(char::is_whitespace)
        && sanitize_url(trimmed).is_some()
    {
        return DetectedType::Url;
    }
    if has_markdown(content) {
        return DetectedType::Markdown;
    }
    if has_syntax_markers(content)
        && score_language(content).is_some_and(|(_, score)| score >= CODE_SCORE_THRESHOLD)
    {
        return DetectedType::Code;
    }
    DetectedType::Text
}

fn has_markdown(content: &str) -> bool {
    let lexer = Lexer::new();
    let tokens = lexer.lex(content);
    let block_marker = tokens
        .iter()
        .any(|t| !matches!(t.token_type, TokenType::Text) && !t.token_type.is_separator());
    if block_marker {
        return true;
    }
    tokens.iter().filter(|t| t.is(TokenType::Text)).any(|t| {
        inline_rules().tokenize(&t.content).iter().any(|i| {
            matches!(
                i.token_type,
                TokenType::BoldItalic
                    | TokenType::Bold
                    | TokenType::Italic
                    | TokenType::InlineCode
                    | TokenType::Strikethrough
                    | TokenType::Underline
                    | TokenType::Link
                    | TokenType::InlineEquation
            )
        })
    })
}
