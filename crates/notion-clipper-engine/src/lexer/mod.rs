//! # Lexer
//!
//! Splits input into physical lines and classifies each one with the block
//! rule set, producing one token per line plus a `Newline` token per line
//! terminator.
//!
//! ## Context
//!
//! Lines are classified independently except inside a fenced code block:
//! once a fence opens, every line is a `CodeLine` until a matching fence
//! closes it. Tables, quotes and lists are not merged here; parsers consume
//! runs of same-kind tokens from the [`TokenStream`].
//!
//! ## Key Invariants
//!
//! - Token spans are contiguous and cover the input exactly; the trailing
//!   `Eof` sentinel is zero-length.
//! - Empty lines produce no line token, only their `Newline`.

pub mod stream;

pub use stream::TokenStream;

use crate::rules::{
    RuleEngine,
    block::{block_rules, closes_fence},
};
use crate::token::{Position, Token, TokenMetadata, TokenType};

pub struct Lexer {
    rules: &'static RuleEngine,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn new() -> Self {
        Self {
            rules: block_rules(),
        }
    }

    /// Tokenizes `input` into a stream ending with an `Eof` sentinel.
    pub fn tokenize(&self, input: &str) -> TokenStream {
        TokenStream::new(self.lex(input))
    }

    pub fn lex(&self, input: &str) -> Vec<Token> {
        let mut out = vec![];
        let mut open_fence: Option<String> = None;
        let mut offset = 0usize;
        let mut line_no = 0usize;

        while offset < input.len() {
            let rest = &input[offset..];
            let (line, terminator) = split_line(rest);

            if !line.is_empty() {
                let position = Position {
                    start: offset,
                    end: offset + line.len(),
                    line: line_no,
                    column: 0,
                };
                let token = match &open_fence {
                    Some(fence) => self.fenced_line(line, fence, position),
                    None => self.classify(line, position),
                };

                if token.is(TokenType::CodeFence) {
                    open_fence = match open_fence {
                        Some(_) => None,
                        None => token.metadata.fence.clone(),
                    };
                }
                out.push(token);
            }
            offset += line.len();

            if !terminator.is_empty() {
                out.push(Token {
                    token_type: TokenType::Newline,
                    content: terminator.to_string(),
                    raw: terminator.to_string(),
                    position: Position {
                        start: offset,
                        end: offset + terminator.len(),
                        line: line_no,
                        column: line.chars().count(),
                    },
                    metadata: TokenMetadata::default(),
                });
                offset += terminator.len();
                line_no += 1;
            }
        }

        let last_column = input
            .rsplit('\n')
            .next()
            .map_or(0, |l| l.chars().count());
        out.push(Token::eof(input.len(), line_no, last_column));
        out
    }

    fn classify(&self, line: &str, position: Position) -> Token {
        match self.rules.find_match(line, 0) {
            Some((rule, m)) => {
                let mut token = self.rules.apply_rule(rule, &m, position);
                // Block rules classify the line; the token always spans all of it.
                token.raw = line.to_string();
                token.position.end = position.end;
                token
            }
            None => Token {
                token_type: TokenType::Text,
                content: line.to_string(),
                raw: line.to_string(),
                position,
                metadata: TokenMetadata::default(),
            },
        }
    }

    fn fenced_line(&self, line: &str, fence: &str, position: Position) -> Token {
        let token_type = if closes_fence(line, fence) {
            TokenType::CodeFence
        } else {
            TokenType::CodeLine
        };
        Token {
            token_type,
            content: if token_type == TokenType::CodeLine {
                line.to_string()
            } else {
                String::new()
            },
            raw: line.to_string(),
            position,
            metadata: TokenMetadata {
                fence: Some(fence.to_string()),
                ..Default::default()
            },
        }
    }
}

/// Splits off the first line, returning `(line, terminator)`.
fn split_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(i) if i > 0 && s.as_bytes()[i - 1] == b'\r' => (&s[..i - 1], &s[i - 1..=i]),
        Some(i) => (&s[..i], &s[i..=i]),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenType> {
        Lexer::new()
            .lex(input)
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    fn assert_covers(input: &str) {
        let tokens = Lexer::new().lex(input);
        let mut expected_start = 0;
        for t in &tokens {
            assert_eq!(t.position.start, expected_start, "gap before {t:?}");
            assert_eq!(&input[t.position.start..t.position.end], t.raw);
            expected_start = t.position.end;
        }
        assert_eq!(expected_start, input.len());
        assert!(tokens.last().unwrap().is(TokenType::Eof));
    }

    #[test]
    fn one_token_per_line_plus_newlines() {
        assert_eq!(
            kinds("# T\n- a\ntext"),
            vec![
                TokenType::Heading,
                TokenType::Newline,
                TokenType::ListItem,
                TokenType::Newline,
                TokenType::Text,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn fenced_lines_are_not_classified() {
        assert_eq!(
            kinds("```\n# not a heading\n```\n# heading"),
            vec![
                TokenType::CodeFence,
                TokenType::Newline,
                TokenType::CodeLine,
                TokenType::Newline,
                TokenType::CodeFence,
                TokenType::Newline,
                TokenType::Heading,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn tilde_fence_ignores_backtick_closer() {
        let k = kinds("~~~\n```\n~~~");
        assert_eq!(k[2], TokenType::CodeLine);
        assert_eq!(k[4], TokenType::CodeFence);
    }

    #[test]
    fn line_numbers_count_newlines() {
        let tokens = Lexer::new().lex("a\n\nb");
        let b = tokens.iter().find(|t| t.raw == "b").unwrap();
        assert_eq!(b.position.line, 2);
        assert_eq!(b.position.column, 0);
    }

    #[test]
    fn coverage_on_mixed_input() {
        assert_covers("# Title\r\n\r\n> quote\n| a | b |\n|---|---|\n   \n```py\nx = 1\n");
        assert_covers("");
        assert_covers("\n\n\n");
        assert_covers("ünïcödé **bold**");
    }
}
