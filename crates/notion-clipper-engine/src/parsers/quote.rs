//! Quote runs, and the quote-vs-toggle decision.
//!
//! A run of `>` lines becomes a quote, unless it is longer than
//! [`TOGGLE_LINE_THRESHOLD`] lines or carries structured content (headings,
//! lists, tables, fences). Then it becomes a toggle: the first line is the
//! title and the remaining lines form one paragraph child.

use super::{BlockParser, ParseContext};
use crate::ast::{AstNode, NodeKind};
use crate::lexer::TokenStream;
use crate::rules::block::{looks_structural, quote_content};
use crate::token::TokenType;

/// Quotes with more lines than this become toggles.
pub const TOGGLE_LINE_THRESHOLD: usize = 3;

pub struct QuoteParser;

impl QuoteParser {
    /// The quote text of a token continuing the run, if it does.
    ///
    /// Callouts and toggle headings open their own structure and end the run.
    fn continuation_line(stream: &TokenStream) -> Option<String> {
        let next = stream.peek_continuation()?;
        match next.token_type {
            TokenType::Quote => Some(next.content.clone()),
            TokenType::ListItem if next.metadata.quoted => {
                Some(quote_content(&next.raw).to_string())
            }
            _ => None,
        }
    }
}

impl BlockParser for QuoteParser {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn priority(&self) -> u32 {
        60
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        stream.peek(0).is(TokenType::Quote)
    }

    fn parse(&self, stream: &mut TokenStream, ctx: &ParseContext<'_>) -> Option<AstNode> {
        let first = stream.next()?.content.clone();
        let mut lines = vec![first];
        while let Some(line) = Self::continuation_line(stream) {
            lines.push(line);
            stream.next_continuation();
        }

        let structured = lines.iter().any(|l| looks_structural(l));
        if lines.len() <= TOGGLE_LINE_THRESHOLD && !structured {
            let content = lines.join("\n");
            return Some(
                AstNode::new(NodeKind::Quote, &content).with_rich_text(ctx.rich_text.build(&content)),
            );
        }

        let title = lines[0].trim().to_string();
        let body = lines[1..].join("\n");
        let body = body.trim();
        let children = if body.is_empty() {
            vec![]
        } else {
            vec![AstNode::new(NodeKind::Paragraph, body).with_rich_text(ctx.rich_text.build(body))]
        };
        Some(
            AstNode::new(NodeKind::Toggle, &title)
                .with_rich_text(ctx.rich_text.build(&title))
                .with_children(children),
        )
    }
}
