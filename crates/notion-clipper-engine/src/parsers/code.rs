use super::{BlockParser, ParseContext};
use crate::ast::{AstNode, NodeKind};
use crate::code_lang::resolve_language;
use crate::lexer::TokenStream;
use crate::token::TokenType;

/// A fenced code block, from the opening fence through its closer.
///
/// An unclosed fence runs to the end of the input. The body is cut to
/// `max_code_length` characters after the language has been resolved from
/// the full text.
pub struct CodeParser;

impl BlockParser for CodeParser {
    fn name(&self) -> &'static str {
        "code"
    }

    fn priority(&self) -> u32 {
        100
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        stream.peek(0).is(TokenType::CodeFence)
    }

    fn parse(&self, stream: &mut TokenStream, ctx: &ParseContext<'_>) -> Option<AstNode> {
        let explicit = stream.next()?.metadata.language.clone();

        // `current` is the line being read; `None` while still on the fence line.
        let mut lines: Vec<String> = vec![];
        let mut current: Option<String> = None;
        let mut closed = false;
        loop {
            match stream.peek(0).token_type {
                TokenType::Newline => {
                    lines.extend(current.take());
                    current = Some(String::new());
                }
                TokenType::CodeLine => current = Some(stream.peek(0).content.clone()),
                TokenType::CodeFence => {
                    stream.next();
                    closed = true;
                    break;
                }
                _ => break,
            }
            stream.next();
        }
        if !closed {
            lines.extend(current);
            while lines.last().is_some_and(|l| l.trim().is_empty()) {
                lines.pop();
            }
        }

        let code = lines.join("\n");
        let language = resolve_language(explicit.as_deref(), &code);
        let (code, truncated) = truncate_chars(&code, ctx.max_code_length);
        Some(AstNode::new(
            NodeKind::Code {
                language,
                truncated,
            },
            code,
        ))
    }
}

/// First `max` characters of `s`, and whether anything was cut.
pub fn truncate_chars(s: &str, max: usize) -> (String, bool) {
    match s.char_indices().nth(max) {
        Some((idx, _)) => (s[..idx].to_string(), true),
        None => (s.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parsers::test_support::parse_with;
    use crate::rich_text::RichTextBuilder;
    use pretty_assertions::assert_eq;

    fn code(input: &str) -> (String, String, bool) {
        let (node, _) = parse_with(&CodeParser, input);
        let node = node.unwrap();
        match node.kind {
            NodeKind::Code {
                language,
                truncated,
            } => (language, node.content, truncated),
            other => panic!("expected code, got {other:?}"),
        }
    }

    #[test]
    fn explicit_language() {
        assert_eq!(
            code("```python\nprint(1)\n```"),
            ("python".to_string(), "print(1)".to_string(), false)
        );
    }

    #[test]
    fn keeps_blank_lines_and_indentation() {
        let (_, body, _) = code("```\ndef f():\n\n    return 1\n```");
        assert_eq!(body, "def f():\n\n    return 1");
    }

    #[test]
    fn detects_language_without_fence_name() {
        let (lang, _, _) = code("```\nfn main() {\n    let mut x = 1;\n}\n```");
        assert_eq!(lang, "rust");
    }

    #[test]
    fn unknown_fence_name_falls_back_to_plain_text() {
        let (lang, _, _) = code("```klingon\nqapla\n```");
        assert_eq!(lang, "plain text");
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        let (_, body, _) = code("```\na\nb\n");
        assert_eq!(body, "a\nb");
    }

    #[test]
    fn markdown_inside_fence_is_literal() {
        let (_, body, _) = code("~~~\n# not a heading\n- not a list\n~~~");
        assert_eq!(body, "# not a heading\n- not a list");
    }

    #[test]
    fn closing_fence_is_consumed() {
        let (_, stream) = parse_with(&CodeParser, "```\nx\n```\nafter");
        assert!(stream.peek(0).is(TokenType::Newline));
        assert_eq!(stream.peek(1).raw, "after");
    }

    #[test]
    fn long_code_is_truncated() {
        let mut stream = Lexer::new().tokenize("```\nabcdef\n```");
        let rich_text = RichTextBuilder::default();
        let ctx = ParseContext {
            rich_text: &rich_text,
            max_code_length: 4,
        };
        let node = CodeParser.parse(&mut stream, &ctx).unwrap();
        assert_eq!(node.content, "abcd");
        assert!(matches!(node.kind, NodeKind::Code { truncated: true, .. }));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), ("hé".to_string(), true));
        assert_eq!(truncate_chars("hi", 2), ("hi".to_string(), false));
    }
}
