use super::{BlockParser, ParseContext};
use crate::ast::{AstNode, NodeKind};
use crate::lexer::TokenStream;
use crate::token::TokenType;

/// Presentation of a callout type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalloutStyle {
    pub callout_type: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const fn style(callout_type: &'static str, icon: &'static str, color: &'static str) -> CalloutStyle {
    CalloutStyle {
        callout_type,
        icon,
        color,
    }
}

const STYLES: &[CalloutStyle] = &[
    style("note", "📝", "gray"),
    style("info", "ℹ️", "blue"),
    style("tip", "💡", "green"),
    style("warning", "⚠️", "yellow"),
    style("danger", "🔥", "red"),
    style("error", "❌", "red"),
    style("success", "✅", "green"),
    style("question", "❓", "purple"),
    style("quote", "💬", "gray"),
    style("example", "📋", "brown"),
];

/// Style for a callout type name; unknown types render as notes.
pub fn callout_style(callout_type: &str) -> CalloutStyle {
    STYLES
        .iter()
        .find(|s| s.callout_type.eq_ignore_ascii_case(callout_type))
        .copied()
        .unwrap_or(STYLES[0])
}

/// `> [!type] text`, continued by directly following plain quote lines.
pub struct CalloutParser;

impl BlockParser for CalloutParser {
    fn name(&self) -> &'static str {
        "callout"
    }

    fn priority(&self) -> u32 {
        95
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        stream.peek(0).is(TokenType::Callout)
    }

    fn parse(&self, stream: &mut TokenStream, ctx: &ParseContext<'_>) -> Option<AstNode> {
        let token = stream.next()?;
        let style = callout_style(token.metadata.callout_type.as_deref().unwrap_or_default());
        let mut lines = vec![];
        if !token.content.is_empty() {
            lines.push(token.content.clone());
        }

        while let Some(next) = stream.peek_continuation() {
            if !next.is(TokenType::Quote) {
                break;
            }
            lines.push(next.content.clone());
            stream.next_continuation();
        }

        let content = lines.join("\n");
        Some(
            AstNode::new(
                NodeKind::Callout {
                    callout_type: style.callout_type.to_string(),
                    icon: style.icon,
                    color: style.color,
                },
                &content,
            )
            .with_rich_text(ctx.rich_text.build(&content)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::test_support::parse_with;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("note", "📝", "gray")]
    #[case("WARNING", "⚠️", "yellow")]
    #[case("danger", "🔥", "red")]
    #[case("question", "❓", "purple")]
    #[case("made-up", "📝", "gray")]
    fn styles(#[case] kind: &str, #[case] icon: &str, #[case] color: &str) {
        let s = callout_style(kind);
        assert_eq!((s.icon, s.color), (icon, color));
    }

    #[test]
    fn callout_absorbs_quote_lines() {
        let (node, stream) =
            parse_with(&CalloutParser, "> [!warning] Careful\n> the floor is wet\n\nnext");
        let node = node.unwrap();
        assert_eq!(
            node.kind,
            NodeKind::Callout {
                callout_type: "warning".to_string(),
                icon: "⚠️",
                color: "yellow",
            }
        );
        assert_eq!(node.content, "Careful\nthe floor is wet");
        assert!(stream.peek(0).is(TokenType::Newline));
    }

    #[test]
    fn unknown_type_falls_back_to_note() {
        let (node, _) = parse_with(&CalloutParser, "> [!weird] text");
        let NodeKind::Callout { callout_type, .. } = node.unwrap().kind else {
            panic!("expected callout");
        };
        assert_eq!(callout_type, "note");
    }

    #[test]
    fn title_may_be_empty() {
        let (node, _) = parse_with(&CalloutParser, "> [!tip]\n> body only");
        assert_eq!(node.unwrap().content, "body only");
    }
}
