use super::{BlockParser, ParseContext};
use crate::ast::{AstNode, NodeKind};
use crate::lexer::TokenStream;
use crate::token::TokenType;

/// Fallback for any line no other parser claimed.
///
/// Plain text keeps its extracted content; any other token is kept verbatim
/// so stray markers are not lost.
pub struct ParagraphParser;

impl ParagraphParser {
    /// Paragraph for `text`, or `None` when it is only whitespace.
    pub fn paragraph(text: &str, ctx: &ParseContext<'_>) -> Option<AstNode> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(AstNode::new(NodeKind::Paragraph, text).with_rich_text(ctx.rich_text.build(text)))
    }
}

impl BlockParser for ParagraphParser {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn priority(&self) -> u32 {
        1
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        !stream.peek(0).token_type.is_separator()
    }

    fn parse(&self, stream: &mut TokenStream, ctx: &ParseContext<'_>) -> Option<AstNode> {
        let token = stream.next()?;
        let text = if token.is(TokenType::Text) {
            &token.content
        } else {
            &token.raw
        };
        let text = text.clone();
        Self::paragraph(&text, ctx)
    }
}
