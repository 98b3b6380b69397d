use super::{BlockParser, ParseContext};
use crate::ast::{AstNode, NodeKind};
use crate::lexer::TokenStream;
use crate::token::TokenType;

pub struct DividerParser;

impl BlockParser for DividerParser {
    fn name(&self) -> &'static str {
        "divider"
    }

    fn priority(&self) -> u32 {
        85
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        stream.peek(0).is(TokenType::Divider)
    }

    fn parse(&self, stream: &mut TokenStream, _ctx: &ParseContext<'_>) -> Option<AstNode> {
        stream.next()?;
        Some(AstNode::new(NodeKind::Divider, ""))
    }
}
