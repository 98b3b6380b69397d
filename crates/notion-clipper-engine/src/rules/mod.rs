//! # Rule Engine
//!
//! Priority-ordered pattern matching shared by the line lexer and the inline
//! rich-text tokenizer.
//!
//! ## Model
//!
//! A [`Rule`] pairs a [`Pattern`] (an anchored regex or a matcher function)
//! with the [`TokenType`] it produces and an optional extractor that fills in
//! type-specific token content and metadata.
//!
//! A [`RuleEngine`] owns one rule set, sorted once by descending priority.
//! Equal priorities keep registration order, so the first registered rule
//! wins a tie.
//!
//! ## Modules
//!
//! - **`block`**: line-level rules (headings, lists, fences, tables, ...)
//! - **`inline`**: inline rules (emphasis, links, code spans, equations, ...)
//!
//! ## Key Invariants
//!
//! - Matches are anchored at the cursor; a regex match starting later in the
//!   remaining text is not a match.
//! - A zero-length match is never returned, so a scan driven by
//!   [`RuleEngine::find_match`] always makes progress.

pub mod block;
pub mod inline;

use std::cmp::Reverse;
use std::collections::HashSet;

use regex::Regex;

use crate::error::RuleError;
use crate::token::{Position, Token, TokenMetadata, TokenType};

/// Result of matching a rule at a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'t> {
    /// The consumed text, starting exactly at the cursor.
    pub text: &'t str,
    /// Capture groups, group 0 excluded.
    pub captures: Vec<Option<&'t str>>,
}

impl<'t> RuleMatch<'t> {
    /// A match consuming `text` in full with no captures.
    pub fn whole(text: &'t str) -> Self {
        Self {
            text,
            captures: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Capture group `i` (1-based, like regex groups), or `""` when absent.
    pub fn group(&self, i: usize) -> &'t str {
        self.captures
            .get(i.wrapping_sub(1))
            .copied()
            .flatten()
            .unwrap_or("")
    }
}

/// Matcher function for rules that are awkward to express as a regex.
pub type MatchFn = for<'t> fn(&'t str) -> Option<RuleMatch<'t>>;

/// Custom extraction applied over the base token built from a match.
pub type Extractor = fn(&RuleMatch<'_>) -> Extracted;

/// Output of an [`Extractor`]. `content: None` keeps the matched text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub content: Option<String>,
    pub metadata: TokenMetadata,
}

pub enum Pattern {
    Regex(Regex),
    Function(MatchFn),
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            Pattern::Function(_) => f.write_str("Function"),
        }
    }
}

impl Pattern {
    /// Matches anchored at the start of `rest`.
    fn match_at<'t>(&self, rest: &'t str) -> Option<RuleMatch<'t>> {
        match self {
            Pattern::Regex(re) => {
                let caps = re.captures(rest)?;
                let whole = caps.get(0)?;
                if whole.start() != 0 {
                    return None;
                }
                Some(RuleMatch {
                    text: whole.as_str(),
                    captures: caps.iter().skip(1).map(|m| m.map(|m| m.as_str())).collect(),
                })
            }
            Pattern::Function(f) => f(rest),
        }
    }
}

#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub priority: i32,
    pub pattern: Pattern,
    pub token_type: TokenType,
    pub extract: Option<Extractor>,
}

impl Rule {
    /// Builds a regex rule. Panics on an invalid pattern; rule tables are
    /// compile-time constants.
    pub fn regex(
        name: &'static str,
        priority: i32,
        pattern: &str,
        token_type: TokenType,
        extract: Option<Extractor>,
    ) -> Self {
        Self {
            name,
            priority,
            pattern: Pattern::Regex(Regex::new(pattern).expect("invalid rule regex")),
            token_type,
            extract,
        }
    }

    pub fn function(
        name: &'static str,
        priority: i32,
        matcher: MatchFn,
        token_type: TokenType,
        extract: Option<Extractor>,
    ) -> Self {
        Self {
            name,
            priority,
            pattern: Pattern::Function(matcher),
            token_type,
            extract,
        }
    }
}

/// Which token category a rule set produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSet {
    Block,
    Inline,
}

impl RuleSet {
    fn name(self) -> &'static str {
        match self {
            RuleSet::Block => "block",
            RuleSet::Inline => "inline",
        }
    }

    fn accepts(self, token_type: TokenType) -> bool {
        match self {
            RuleSet::Block => token_type.is_block(),
            RuleSet::Inline => token_type.is_inline(),
        }
    }
}

#[derive(Debug)]
pub struct RuleEngine {
    kind: RuleSet,
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new(kind: RuleSet, rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut rules: Vec<Rule> = rules.into_iter().collect();
        // Stable sort keeps registration order among equal priorities.
        rules.sort_by_key(|r| Reverse(r.priority));
        Self { kind, rules }
    }

    pub fn kind(&self) -> RuleSet {
        self.kind
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Registers a rule after every existing rule of equal or higher priority.
    pub fn add_rule(&mut self, rule: Rule) {
        let at = self
            .rules
            .iter()
            .position(|r| r.priority < rule.priority)
            .unwrap_or(self.rules.len());
        self.rules.insert(at, rule);
    }

    pub fn remove_rule(&mut self, name: &str) -> Option<Rule> {
        let at = self.rules.iter().position(|r| r.name == name)?;
        Some(self.rules.remove(at))
    }

    /// Returns the highest-priority rule matching at `cursor`, with its match.
    pub fn find_match<'t>(&self, text: &'t str, cursor: usize) -> Option<(&Rule, RuleMatch<'t>)> {
        let rest = text.get(cursor..)?;
        if rest.is_empty() {
            return None;
        }
        self.rules.iter().find_map(|rule| {
            let m = rule.pattern.match_at(rest)?;
            if m.is_empty() {
                log::trace!("rule `{}` matched zero characters; skipped", rule.name);
                return None;
            }
            Some((rule, m))
        })
    }

    /// Builds a token from a match, overlaying the rule's extractor output.
    ///
    /// `position` describes where the match starts; its `end` is derived
    /// from the match length.
    pub fn apply_rule(&self, rule: &Rule, m: &RuleMatch<'_>, position: Position) -> Token {
        let mut token = Token {
            token_type: rule.token_type,
            content: m.text.to_string(),
            raw: m.text.to_string(),
            position: Position {
                end: position.start + m.len(),
                ..position
            },
            metadata: TokenMetadata::default(),
        };
        if let Some(extract) = rule.extract {
            let extracted = extract(m);
            if let Some(content) = extracted.content {
                token.content = content;
            }
            token.metadata = extracted.metadata;
        }
        token
    }

    /// Tokenizes `text` from start to end on a single line.
    ///
    /// If no rule matches (a rule set without a catch-all), one character is
    /// consumed as a plain token so the scan still terminates.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut out = vec![];
        let mut cursor = 0usize;
        let mut column = 0usize;
        while cursor < text.len() {
            let position = Position {
                start: cursor,
                end: cursor,
                line: 0,
                column,
            };
            let token = match self.find_match(text, cursor) {
                Some((rule, m)) => self.apply_rule(rule, &m, position),
                None => self.unmatched(text, position),
            };
            column += token.raw.chars().count();
            cursor = token.position.end;
            out.push(token);
        }
        out
    }

    fn unmatched(&self, text: &str, position: Position) -> Token {
        let ch_len = text[position.start..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        let raw = &text[position.start..position.start + ch_len];
        let token_type = match self.kind {
            RuleSet::Block => TokenType::Text,
            RuleSet::Inline => TokenType::PlainText,
        };
        Token {
            token_type,
            content: raw.to_string(),
            raw: raw.to_string(),
            position: Position {
                end: position.start + ch_len,
                ..position
            },
            metadata: TokenMetadata::default(),
        }
    }

    /// Checks one rule's structural well-formedness against this rule set.
    pub fn validate_rule(&self, rule: &Rule) -> Result<(), RuleError> {
        if rule.name.trim().is_empty() {
            return Err(RuleError::EmptyName);
        }
        if let Pattern::Regex(re) = &rule.pattern {
            if re.as_str().is_empty() {
                return Err(RuleError::EmptyPattern {
                    rule: rule.name.to_string(),
                });
            }
            if re.is_match("") {
                return Err(RuleError::ZeroLengthMatch {
                    rule: rule.name.to_string(),
                });
            }
        }
        if !self.kind.accepts(rule.token_type) {
            return Err(RuleError::InvalidTokenType {
                rule: rule.name.to_string(),
                token_type: rule.token_type,
                rule_set: self.kind.name(),
            });
        }
        Ok(())
    }

    /// Validates every rule, collecting one error per failing rule.
    pub fn validate_all_rules(&self) -> Result<(), Vec<RuleError>> {
        let mut errors = vec![];
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if let Err(e) = self.validate_rule(rule) {
                errors.push(e);
                continue;
            }
            if !seen.insert(rule.name) {
                errors.push(RuleError::DuplicateName {
                    rule: rule.name.to_string(),
                });
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            for e in &errors {
                log::warn!("rule validation failed: {e}");
            }
            Err(errors)
        }
    }
}
