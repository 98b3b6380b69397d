//! # Parse Entry Point
//!
//! [`ModernParser`] wires the pieces together:
//!
//! 1. resolve the content type (explicit, or detected)
//! 2. for markdown: lex, then dispatch block parsers until the stream ends
//! 3. convert the AST into API blocks and apply `max_blocks`
//!
//! ## Degradation
//!
//! Parsing never fails on malformed input. A parser that rejects its input
//! is rewound and the line becomes a paragraph. Only when non-empty input
//! yields no node at all is the result marked unsuccessful, and even then it
//! carries one fallback paragraph.

use serde::Serialize;

use crate::ast::{AstNode, NodeKind};
use crate::blocks::convert::Converter;
use crate::blocks::{Block, BlockKind};
use crate::code_lang::{PLAIN_TEXT, normalize_language, score_language};
use crate::detect::{DetectedType, detect_content_type};
use crate::error::ParseError;
use crate::lexer::{Lexer, TokenStream};
use crate::options::ParseOptions;
use crate::parsers::code::truncate_chars;
use crate::parsers::{ParagraphParser, ParseContext, ParserRegistry};
use crate::rich_text::link::sanitize_url;
use crate::rich_text::{RichTextBuilder, RichTextSegment};
use crate::rules::block::block_rules;
use crate::rules::inline::inline_rules;
use crate::token::Annotations;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseMetadata {
    pub detected_type: DetectedType,
    /// AST nodes, descendants included.
    pub node_count: usize,
    /// Top-level blocks returned.
    pub block_count: usize,
    /// Whether `max_blocks` dropped blocks.
    pub truncated: bool,
    /// Input length in characters.
    pub original_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    pub success: bool,
    pub blocks: Vec<Block>,
    pub metadata: ParseMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct ModernParser {
    lexer: Lexer,
    registry: ParserRegistry,
}

impl Default for ModernParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ModernParser {
    pub fn new() -> Self {
        Self {
            lexer: Lexer::new(),
            registry: ParserRegistry::new(),
        }
    }

    /// Like [`new`](Self::new), but first checks both rule sets.
    pub fn validated() -> Result<Self, ParseError> {
        let mut errors = vec![];
        for engine in [block_rules(), inline_rules()] {
            if let Err(mut e) = engine.validate_all_rules() {
                errors.append(&mut e);
            }
        }
        if errors.is_empty() {
            Ok(Self::new())
        } else {
            Err(ParseError::InvalidRules(errors))
        }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    pub fn tokenize(&self, content: &str) -> TokenStream {
        self.lexer.tokenize(content)
    }

    /// Runs the block parsers over `content`, treating it as markdown.
    pub fn parse_nodes(&self, content: &str, options: &ParseOptions) -> Vec<AstNode> {
        let rich_text = RichTextBuilder::new(options.formatting.rich_text());
        let ctx = ParseContext {
            rich_text: &rich_text,
            max_code_length: options.max_code_length,
        };
        let mut stream = self.lexer.tokenize(content);
        let mut nodes = vec![];

        loop {
            stream.skip_separators();
            if !stream.has_next() {
                break;
            }
            let start = stream.position();

            let node = match self.registry.select(&stream) {
                Some(parser) => {
                    log::trace!(
                        "{} at line {}",
                        parser.name(),
                        stream.peek(0).position.line + 1
                    );
                    match parser.parse(&mut stream, &ctx) {
                        Some(node) => Some(node),
                        None => {
                            stream.seek(start);
                            Self::fallback(&mut stream, &ctx)
                        }
                    }
                }
                None => Self::fallback(&mut stream, &ctx),
            };

            if stream.position() == start {
                stream.next();
            }
            nodes.extend(node);
        }
        nodes
    }

    fn fallback(stream: &mut TokenStream, ctx: &ParseContext<'_>) -> Option<AstNode> {
        let token = stream.next()?;
        log::warn!(
            "No parser accepted line {}, keeping it as a paragraph",
            token.position.line + 1
        );
        let raw = token.raw.clone();
        ParagraphParser::paragraph(&raw, ctx)
    }

    pub fn parse(&self, content: &str, options: &ParseOptions) -> ParseResult {
        let detected_type = DetectedType::from_content_type(options.content_type)
            .unwrap_or_else(|| detect_content_type(content));
        let rich_text = RichTextBuilder::new(options.formatting.rich_text());

        let nodes = match detected_type {
            DetectedType::Markdown => self.parse_nodes(content, options),
            DetectedType::Code => code_nodes(content, options),
            DetectedType::Text => text_nodes(content),
            DetectedType::Url => url_nodes(content, &rich_text),
        };
        let node_count = nodes.iter().map(AstNode::count).sum();

        let (mut blocks, error) = if nodes.is_empty() && !content.trim().is_empty() {
            log::warn!("Input produced no blocks, returning it as one paragraph");
            (
                vec![Block::paragraph(vec![RichTextSegment::text(
                    truncate_chars(content.trim(), crate::blocks::MAX_SEGMENT_CHARS).0,
                    Annotations::default(),
                )])],
                Some(ParseError::NoBlocksProduced),
            )
        } else {
            let converter = Converter {
                options: &options.conversion,
                rich_text: &rich_text,
            };
            (converter.convert_all(&nodes), None)
        };
        if detected_type == DetectedType::Url && error.is_none() {
            blocks = bookmark_blocks(blocks);
        }

        let truncated = blocks.len() > options.max_blocks;
        blocks.truncate(options.max_blocks);

        let metadata = ParseMetadata {
            detected_type,
            node_count,
            block_count: blocks.len(),
            truncated,
            original_length: content.chars().count(),
        };
        log::debug!(
            "Parsed {} chars as {:?}: {} nodes, {} blocks{}",
            metadata.original_length,
            metadata.detected_type,
            metadata.node_count,
            metadata.block_count,
            if truncated { " (truncated)" } else { "" }
        );

        ParseResult {
            success: error.is_none(),
            blocks,
            metadata,
            error: error.map(|e| e.to_string()),
        }
    }
}

/// Parses `content` with a fresh [`ModernParser`].
pub fn parse(content: &str, options: &ParseOptions) -> ParseResult {
    ModernParser::new().parse(content, options)
}

/// The whole input as one code block.
fn code_nodes(content: &str, options: &ParseOptions) -> Vec<AstNode> {
    let code = content.trim_matches('\n');
    if code.trim().is_empty() {
        return vec![];
    }
    let language = score_language(code)
        .map(|(lang, _)| lang)
        .or_else(|| {
            options
                .formatting
                .default_code_language
                .as_deref()
                .and_then(normalize_language)
        })
        .unwrap_or(PLAIN_TEXT)
        .to_string();
    let (code, truncated) = truncate_chars(code, options.max_code_length);
    vec![AstNode::new(
        NodeKind::Code {
            language,
            truncated,
        },
        code,
    )]
}

/// One unformatted paragraph per blank-line separated chunk.
fn text_nodes(content: &str) -> Vec<AstNode> {
    let mut nodes = vec![];
    let mut chunk: Vec<&str> = vec![];
    for line in content.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !chunk.is_empty() {
                let text = chunk.join("\n");
                nodes.push(
                    AstNode::new(NodeKind::Paragraph, &text)
                        .with_rich_text(vec![RichTextSegment::text(&text, Annotations::default())]),
                );
                chunk.clear();
            }
        } else {
            chunk.push(line.trim_end());
        }
    }
    nodes
}

/// A bare URL as a linked paragraph; turned into a bookmark after conversion.
fn url_nodes(content: &str, rich_text: &RichTextBuilder) -> Vec<AstNode> {
    let url = content.trim();
    if url.is_empty() {
        return vec![];
    }
    vec![AstNode::new(NodeKind::Paragraph, url).with_rich_text(rich_text.build(url))]
}

fn bookmark_blocks(blocks: Vec<Block>) -> Vec<Block> {
    blocks
        .into_iter()
        .map(|block| {
            let url = match &block.kind {
                BlockKind::Paragraph { rich_text } => rich_text
                    .iter()
                    .map(|s| s.content.as_str())
                    .collect::<String>(),
                _ => return block,
            };
            match sanitize_url(&url) {
                Some(url) => Block::new(BlockKind::Bookmark { url }),
                None => block,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ContentType;
    use crate::rich_text::plain_text;
    use pretty_assertions::assert_eq;

    fn markdown(content: &str) -> ParseResult {
        parse(
            content,
            &ParseOptions {
                content_type: ContentType::Markdown,
                ..Default::default()
            },
        )
    }

    fn types(result: &ParseResult) -> Vec<&'static str> {
        result.blocks.iter().map(Block::type_name).collect()
    }

    #[test]
    fn rules_validate() {
        assert!(ModernParser::validated().is_ok());
    }

    #[test]
    fn mixed_document() {
        let result = markdown(
            "# Title\n\nIntro **text**.\n\n- a\n- b\n\n> [!tip] Hint\n\n```rust\nfn main() {}\n```\n\n---",
        );
        assert!(result.success);
        assert_eq!(
            types(&result),
            vec![
                "heading_1",
                "paragraph",
                "bulleted_list_item",
                "bulleted_list_item",
                "callout",
                "code",
                "divider",
            ]
        );
        assert_eq!(result.metadata.block_count, 7);
        assert_eq!(result.metadata.detected_type, DetectedType::Markdown);
    }

    #[test]
    fn whitespace_only_input_is_empty_success() {
        let result = markdown("  \n\n\t\n");
        assert!(result.success);
        assert!(result.blocks.is_empty());
        assert_eq!(result.error, None);
    }

    #[test]
    fn unclosed_equation_falls_back_to_paragraphs() {
        let result = markdown("$$\nx = 1");
        assert_eq!(types(&result), vec!["paragraph", "paragraph"]);
        assert_eq!(plain_text(result.blocks[0].rich_text()), "$$");
    }

    #[test]
    fn max_blocks_truncates_and_flags() {
        let result = parse(
            "a\n\nb\n\nc",
            &ParseOptions {
                content_type: ContentType::Markdown,
                max_blocks: 2,
                ..Default::default()
            },
        );
        assert_eq!(result.blocks.len(), 2);
        assert!(result.metadata.truncated);
        assert_eq!(result.metadata.node_count, 3);
    }

    #[test]
    fn url_input_becomes_bookmark() {
        let result = parse("https://example.com/post", &ParseOptions::default());
        assert_eq!(result.metadata.detected_type, DetectedType::Url);
        assert_eq!(
            result.blocks,
            vec![Block::new(BlockKind::Bookmark {
                url: "https://example.com/post".to_string()
            })]
        );
    }

    #[test]
    fn code_input_is_one_block() {
        let result = parse(
            "def add(a, b):\n    return a + b\n\nprint(add(1, 2))\n",
            &ParseOptions::default(),
        );
        assert_eq!(result.metadata.detected_type, DetectedType::Code);
        assert_eq!(types(&result), vec!["code"]);
        let BlockKind::Code { language, .. } = &result.blocks[0].kind else {
            panic!("expected code");
        };
        assert_eq!(language, "python");
    }

    #[test]
    fn explicit_code_uses_default_language() {
        let mut options = ParseOptions {
            content_type: ContentType::Code,
            ..Default::default()
        };
        options.formatting.default_code_language = Some("sh".to_string());
        let result = parse("make all", &options);
        let BlockKind::Code { language, .. } = &result.blocks[0].kind else {
            panic!("expected code");
        };
        assert_eq!(language, "shell");
    }

    #[test]
    fn text_input_keeps_markers_literal() {
        let result = parse(
            "**not bold**\nsame paragraph\n\nsecond",
            &ParseOptions {
                content_type: ContentType::Text,
                ..Default::default()
            },
        );
        assert_eq!(types(&result), vec!["paragraph", "paragraph"]);
        assert_eq!(
            plain_text(result.blocks[0].rich_text()),
            "**not bold**\nsame paragraph"
        );
    }
}
