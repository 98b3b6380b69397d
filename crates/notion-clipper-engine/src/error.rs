use crate::token::TokenType;

/// A structural problem in a rule definition. Always names the rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("rule has an empty name")]
    EmptyName,
    #[error("rule `{rule}` has an empty pattern")]
    EmptyPattern { rule: String },
    #[error("rule `{rule}` can match the empty string and would not make progress")]
    ZeroLengthMatch { rule: String },
    #[error("rule `{rule}` produces {token_type:?}, which does not belong to the {rule_set} rule set")]
    InvalidTokenType {
        rule: String,
        token_type: TokenType,
        rule_set: &'static str,
    },
    #[error("rule `{rule}` is registered more than once")]
    DuplicateName { rule: String },
}

impl RuleError {
    /// Name of the offending rule, or `""` for nameless rules.
    pub fn rule_name(&self) -> &str {
        match self {
            RuleError::EmptyName => "",
            RuleError::EmptyPattern { rule }
            | RuleError::ZeroLengthMatch { rule }
            | RuleError::InvalidTokenType { rule, .. }
            | RuleError::DuplicateName { rule } => rule,
        }
    }
}

/// Catastrophic parse failure. Reported through `ParseResult::error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no parser produced a block for non-empty input")]
    NoBlocksProduced,
    #[error("invalid rule definitions: {0:?}")]
    InvalidRules(Vec<RuleError>),
}
