use crate::token::{Token, TokenType};

/// Position-addressable token stream over a lexed document.
///
/// Parsers look ahead with [`peek`](Self::peek) and only advance once they
/// commit. The stream always ends with an `Eof` token, which is never
/// consumed by [`next`](Self::next).
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.is(TokenType::Eof)) {
            let (offset, line) = tokens
                .last()
                .map_or((0, 0), |t| (t.position.end, t.position.line));
            tokens.push(Token::eof(offset, line, 0));
        }
        Self { tokens, pos: 0 }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to `position`, clamped to the `Eof` token.
    pub fn seek(&mut self, position: usize) {
        self.pos = position.min(self.tokens.len() - 1);
    }

    /// Token `offset` places ahead of the cursor. Past the end yields `Eof`.
    pub fn peek(&self, offset: usize) -> &Token {
        let i = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[i]
    }

    pub fn has_next(&self) -> bool {
        !self.peek(0).is(TokenType::Eof)
    }

    /// Consumes and returns the current token; `None` at `Eof`.
    pub fn next(&mut self) -> Option<&Token> {
        if !self.has_next() {
            return None;
        }
        self.pos += 1;
        Some(&self.tokens[self.pos - 1])
    }

    /// Skips blank lines and line terminators.
    pub fn skip_separators(&mut self) {
        while self.has_next() && self.peek(0).token_type.is_separator() {
            self.pos += 1;
        }
    }

    /// The next line's token if it directly follows the current line, i.e.
    /// the cursor is on a single `Newline` followed by a content line.
    pub fn peek_continuation(&self) -> Option<&Token> {
        if !self.peek(0).is(TokenType::Newline) {
            return None;
        }
        let next = self.peek(1);
        (!next.token_type.is_separator()).then_some(next)
    }

    /// Consumes the terminator and the directly following line token.
    pub fn next_continuation(&mut self) -> Option<&Token> {
        self.peek_continuation()?;
        self.pos += 2;
        Some(&self.tokens[self.pos - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    #[test]
    fn peek_does_not_consume() {
        let s = Lexer::new().tokenize("a\nb");
        assert_eq!(s.peek(0).raw, "a");
        assert_eq!(s.peek(2).raw, "b");
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn peek_past_end_yields_eof() {
        let s = Lexer::new().tokenize("a");
        assert!(s.peek(10).is(TokenType::Eof));
    }

    #[test]
    fn next_stops_at_eof() {
        let mut s = Lexer::new().tokenize("a");
        assert_eq!(s.next().map(|t| t.raw.clone()), Some("a".to_string()));
        assert!(s.next().is_none());
        assert!(!s.has_next());
    }

    #[test]
    fn continuation_requires_single_newline() {
        let mut s = Lexer::new().tokenize("a\nb\n\nc");
        s.next();
        assert_eq!(s.peek_continuation().map(|t| t.raw.as_str()), Some("b"));
        s.next_continuation();
        assert!(s.peek_continuation().is_none());
        s.skip_separators();
        assert_eq!(s.peek(0).raw, "c");
    }

    #[test]
    fn seek_rewinds() {
        let mut s = Lexer::new().tokenize("a\nb");
        let start = s.position();
        s.next();
        s.next();
        s.seek(start);
        assert_eq!(s.peek(0).raw, "a");
        s.seek(99);
        assert!(s.peek(0).is(TokenType::Eof));
    }
}
