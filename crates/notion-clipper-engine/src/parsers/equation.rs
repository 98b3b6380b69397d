use super::{BlockParser, ParseContext};
use crate::ast::{AstNode, NodeKind};
use crate::lexer::TokenStream;
use crate::token::TokenType;

const DELIMITER: &str = "$$";

/// Block equations: `$$ expr $$` on one line, or `$$` ... `$$` across lines.
///
/// An opener without a closer, or delimiters around nothing, is not an
/// equation; `parse` rewinds and returns `None`.
pub struct EquationParser;

impl BlockParser for EquationParser {
    fn name(&self) -> &'static str {
        "equation"
    }

    fn priority(&self) -> u32 {
        88
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        stream.peek(0).is(TokenType::Equation)
    }

    fn parse(&self, stream: &mut TokenStream, _ctx: &ParseContext<'_>) -> Option<AstNode> {
        let start = stream.position();
        let token = stream.next()?;
        let raw = token.raw.trim();
        if raw.len() >= 2 * DELIMITER.len() && raw.ends_with(DELIMITER) {
            let expression = token.content.trim().to_string();
            return Self::equation(stream, start, expression);
        }

        let mut parts = vec![];
        if !token.content.is_empty() {
            parts.push(token.content.clone());
        }
        loop {
            match stream.peek(0).token_type {
                TokenType::Newline => {
                    stream.next();
                }
                TokenType::Eof => {
                    stream.seek(start);
                    return None;
                }
                _ => {
                    let line = stream.peek(0).raw.trim().to_string();
                    stream.next();
                    if let Some(before) = line.strip_suffix(DELIMITER) {
                        if !before.trim().is_empty() {
                            parts.push(before.trim().to_string());
                        }
                        break;
                    }
                    parts.push(line);
                }
            }
        }

        Self::equation(stream, start, parts.join("\n"))
    }
}

impl EquationParser {
    fn equation(stream: &mut TokenStream, start: usize, expression: String) -> Option<AstNode> {
        if expression.trim().is_empty() {
            stream.seek(start);
            return None;
        }
        Some(AstNode::new(NodeKind::Equation, expression))
    }
}
