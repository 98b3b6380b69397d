use super::{BlockParser, ParseContext};
use crate::ast::{AstNode, NodeKind};
use crate::lexer::TokenStream;
use crate::token::{ListType, TokenType};

/// Bulleted, numbered and todo items, with nesting by indent level.
///
/// Each call consumes one item plus every directly following item that is
/// indented deeper; each of those is parsed by a recursive call, so one call
/// per nesting level builds the whole subtree. The first item at the same or
/// a shallower level ends the subtree.
pub struct ListParser;

impl BlockParser for ListParser {
    fn name(&self) -> &'static str {
        "list"
    }

    fn priority(&self) -> u32 {
        70
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        stream.peek(0).is(TokenType::ListItem)
    }

    fn parse(&self, stream: &mut TokenStream, ctx: &ParseContext<'_>) -> Option<AstNode> {
        let token = stream.next()?;
        let indent_level = token.metadata.indent_level.unwrap_or(0);
        let list_type = token.metadata.list_type.unwrap_or(ListType::Bulleted);
        let checked = match list_type {
            ListType::Todo => Some(token.metadata.checked.unwrap_or(false)),
            _ => None,
        };
        let content = token.content.clone();

        let mut children = vec![];
        while let Some(next) = stream.peek_continuation() {
            let deeper = next.is(TokenType::ListItem)
                && next.metadata.indent_level.unwrap_or(0) > indent_level;
            if !deeper {
                break;
            }
            // Step onto the child's line; the recursive call consumes it.
            stream.next();
            let Some(child) = self.parse(stream, ctx) else {
                break;
            };
            children.push(child);
        }

        Some(
            AstNode::new(
                NodeKind::ListItem {
                    list_type,
                    indent_level,
                    checked,
                },
                &content,
            )
            .with_rich_text(ctx.rich_text.build(&content))
            .with_children(children),
        )
    }
}
