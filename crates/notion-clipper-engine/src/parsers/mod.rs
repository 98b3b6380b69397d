//! # Block Parsers
//!
//! One parser per block family. Each parser peeks at the [`TokenStream`] in
//! [`can_parse`](BlockParser::can_parse) and, once chosen, consumes one or
//! more tokens in [`parse`](BlockParser::parse).
//!
//! ## Dispatch
//!
//! [`ParserRegistry`] holds the parsers sorted by descending priority; the
//! first parser whose `can_parse` accepts the current token wins.
//! [`ParagraphParser`] has the lowest priority and accepts any content token,
//! so dispatch never gets stuck.
//!
//! ## Greedy Runs
//!
//! Multi-line blocks (quotes, callouts, tables, code, nested lists) extend
//! only across lines joined by a single line terminator. A blank line ends
//! the run.

pub mod callout;
pub mod code;
pub mod divider;
pub mod equation;
pub mod heading;
pub mod list;
pub mod media;
pub mod paragraph;
pub mod quote;
pub mod table;

pub use callout::CalloutParser;
pub use code::CodeParser;
pub use divider::DividerParser;
pub use equation::EquationParser;
pub use heading::{HeadingParser, ToggleHeadingParser};
pub use list::ListParser;
pub use media::MediaParser;
pub use paragraph::ParagraphParser;
pub use quote::QuoteParser;
pub use table::TableParser;

use std::cmp::Reverse;

use crate::ast::AstNode;
use crate::lexer::TokenStream;
use crate::rich_text::RichTextBuilder;

/// Default cap on code block length, in characters.
pub const DEFAULT_MAX_CODE_LENGTH: usize = 2000;

/// Shared inputs every parser may need while building nodes.
pub struct ParseContext<'a> {
    pub rich_text: &'a RichTextBuilder,
    pub max_code_length: usize,
}

pub trait BlockParser {
    fn name(&self) -> &'static str;

    fn priority(&self) -> u32;

    /// Whether this parser accepts the token at the cursor. Never consumes.
    fn can_parse(&self, stream: &TokenStream) -> bool;

    /// Consumes tokens and builds a node. `None` signals a structural
    /// failure; the caller rewinds the stream.
    fn parse(&self, stream: &mut TokenStream, ctx: &ParseContext<'_>) -> Option<AstNode>;
}

pub struct ParserRegistry {
    parsers: Vec<Box<dyn BlockParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserRegistry {
    /// The standard parser set.
    pub fn new() -> Self {
        Self::with_parsers(vec![
            Box::new(CodeParser),
            Box::new(CalloutParser),
            Box::new(ToggleHeadingParser),
            Box::new(HeadingParser),
            Box::new(EquationParser),
            Box::new(DividerParser),
            Box::new(TableParser),
            Box::new(MediaParser),
            Box::new(ListParser),
            Box::new(QuoteParser),
            Box::new(ParagraphParser),
        ])
    }

    pub fn with_parsers(mut parsers: Vec<Box<dyn BlockParser>>) -> Self {
        parsers.sort_by_key(|p| Reverse(p.priority()));
        Self { parsers }
    }

    pub fn parsers(&self) -> impl Iterator<Item = &dyn BlockParser> {
        self.parsers.iter().map(|p| p.as_ref())
    }

    /// The highest-priority parser accepting the current token.
    pub fn select(&self, stream: &TokenStream) -> Option<&dyn BlockParser> {
        self.parsers().find(|p| p.can_parse(stream))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use rstest::rstest;

    #[test]
    fn registry_is_sorted_by_priority() {
        let registry = ParserRegistry::new();
        let priorities: Vec<_> = registry.parsers().map(|p| p.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by_key(|p| Reverse(*p));
        assert_eq!(priorities, sorted);
        assert_eq!(registry.parsers().last().map(|p| p.name()), Some("paragraph"));
    }

    #[rstest]
    #[case("```", "code")]
    #[case("> [!note] x", "callout")]
    #[case("> ## x", "toggle_heading")]
    #[case("# x", "heading")]
    #[case("$$ x $$", "equation")]
    #[case("---", "divider")]
    #[case("| a | b |", "table")]
    #[case("![a](https://a.io/a.png)", "media")]
    #[case("- x", "list")]
    #[case("> x", "quote")]
    #[case("plain", "paragraph")]
    fn selects_parser_by_token(#[case] input: &str, #[case] name: &str) {
        let registry = ParserRegistry::new();
        let stream = Lexer::new().tokenize(input);
        assert_eq!(registry.select(&stream).map(|p| p.name()), Some(name));
    }
}
