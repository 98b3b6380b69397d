use super::{BlockParser, ParseContext};
use crate::ast::{AstNode, NodeKind};
use crate::lexer::TokenStream;
use crate::token::TokenType;

pub struct HeadingParser;

impl BlockParser for HeadingParser {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn priority(&self) -> u32 {
        90
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        stream.peek(0).is(TokenType::Heading)
    }

    fn parse(&self, stream: &mut TokenStream, ctx: &ParseContext<'_>) -> Option<AstNode> {
        let token = stream.next()?;
        let level = token.metadata.level.unwrap_or(1);
        let content = token.content.clone();
        Some(
            AstNode::new(
                NodeKind::Heading {
                    level,
                    is_toggleable: false,
                },
                &content,
            )
            .with_rich_text(ctx.rich_text.build(&content)),
        )
    }
}

/// `> # Title` followed by quoted lines: a heading whose body folds away.
///
/// Directly following plain quote lines become the body, joined into one
/// paragraph child.
pub struct ToggleHeadingParser;

impl BlockParser for ToggleHeadingParser {
    fn name(&self) -> &'static str {
        "toggle_heading"
    }

    fn priority(&self) -> u32 {
        92
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        stream.peek(0).is(TokenType::ToggleHeading)
    }

    fn parse(&self, stream: &mut TokenStream, ctx: &ParseContext<'_>) -> Option<AstNode> {
        let token = stream.next()?;
        let level = token.metadata.level.unwrap_or(1);
        let content = token.content.clone();

        let mut body = vec![];
        while let Some(next) = stream.peek_continuation() {
            if !next.is(TokenType::Quote) {
                break;
            }
            body.push(next.content.clone());
            stream.next_continuation();
        }

        let body = body.join("\n");
        let body = body.trim();
        let children = if body.is_empty() {
            vec![]
        } else {
            vec![AstNode::new(NodeKind::Paragraph, body).with_rich_text(ctx.rich_text.build(body))]
        };

        Some(
            AstNode::new(
                NodeKind::Heading {
                    level,
                    is_toggleable: true,
                },
                &content,
            )
            .with_rich_text(ctx.rich_text.build(&content))
            .with_children(children),
        )
    }
}
