//! Inline rules for rich text.
//!
//! Emphasis patterns require their inner text to start and end with a
//! non-space character, so `a * b * c` stays plain text.

use std::sync::OnceLock;

use regex::Regex;

use super::{Extracted, Rule, RuleEngine, RuleMatch, RuleSet};
use crate::token::{Annotations, TokenMetadata, TokenType};

/// Characters that may start an inline construct; plain text stops before them.
pub const SPECIAL_CHARS: &[char] = &['\\', '$', '[', '*', '`', '~', '_'];

/// The shared inline rule engine, built once.
pub fn inline_rules() -> &'static RuleEngine {
    static ENGINE: OnceLock<RuleEngine> = OnceLock::new();
    ENGINE.get_or_init(|| RuleEngine::new(RuleSet::Inline, rules()))
}

fn rules() -> Vec<Rule> {
    vec![
        Rule::regex(
            "escape",
            110,
            r"^\\([\\`*_{}\[\]()#+\-.!|~$>])",
            TokenType::Escape,
            Some(extract_inner),
        ),
        Rule::regex(
            "equation",
            100,
            r"^\$([^\s$](?:[^$\n]*[^\s$])?)\$",
            TokenType::InlineEquation,
            Some(extract_inner),
        ),
        Rule::regex(
            "link",
            90,
            r#"^\[([^\]]+)\]\(((?:[^()\s]|\([^()\s]*\))*)(?:[ \t]+"[^"]*")?\)"#,
            TokenType::Link,
            Some(extract_link),
        ),
        Rule::regex(
            "autolink",
            85,
            r#"^https?://(?:[^\s<>()\[\]]|\([^\s<>()\[\]]*\))*(?:[^\s<>()\[\].,;:!?'"]|\([^\s<>()\[\]]*\))"#,
            TokenType::AutoLink,
            Some(extract_autolink),
        ),
        Rule::regex(
            "bold-italic",
            80,
            r"^\*\*\*(\S(?:.*?\S)?)\*\*\*",
            TokenType::BoldItalic,
            Some(extract_bold_italic),
        ),
        Rule::regex(
            "bold",
            70,
            r"^\*\*([^\s*](?:.*?\S)?)\*\*",
            TokenType::Bold,
            Some(extract_bold),
        ),
        Rule::function(
            "italic",
            60,
            match_italic,
            TokenType::Italic,
            Some(extract_italic),
        ),
        Rule::regex(
            "inline-code",
            50,
            r"^`([^`]+)`",
            TokenType::InlineCode,
            Some(extract_code),
        ),
        Rule::regex(
            "strikethrough",
            40,
            r"^~~(\S(?:.*?\S)?)~~",
            TokenType::Strikethrough,
            Some(extract_strikethrough),
        ),
        Rule::regex(
            "underline",
            30,
            r"^__(\S(?:.*?\S)?)__",
            TokenType::Underline,
            Some(extract_underline),
        ),
        Rule::function(
            "plain-text",
            1,
            match_plain_text,
            TokenType::PlainText,
            None,
        ),
    ]
}

/// Whether `s` contains anything an inline rule other than plain text could
/// match. Used to decide if matched inner text needs a recursive scan.
pub fn has_nested_markers(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\*\S|~~\S|__\S|`[^`]+`|\[[^\]]+\]\(|https?://|\$\S|\\.")
            .expect("Invalid nested-marker regex")
    });
    re.is_match(s)
}

fn starts_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Consumes up to the next special character or URL start; at least one char.
fn match_plain_text(rest: &str) -> Option<RuleMatch<'_>> {
    let mut end = 0usize;
    for (i, c) in rest.char_indices() {
        if i > 0 && (SPECIAL_CHARS.contains(&c) || starts_url(&rest[i..])) {
            break;
        }
        end = i + c.len_utf8();
    }
    (end > 0).then(|| RuleMatch::whole(&rest[..end]))
}

fn star_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|b| **b == b'*').count()
}

/// Single-star emphasis closed by a lone `*`.
///
/// `**` runs inside are bold pairs and never close the italic, so
/// `*a **b** c*` is one italic span. A `***` opener is italic wrapping a
/// bold that starts immediately.
fn match_italic(rest: &str) -> Option<RuleMatch<'_>> {
    let bytes = rest.as_bytes();
    let opener = star_run(bytes, 0);
    let mut bold_open = match opener {
        1 => false,
        3 => true,
        _ => return None,
    };
    if bytes.get(opener).is_none_or(|b| b.is_ascii_whitespace()) {
        return None;
    }

    let italic = move |end: usize, inner_end: usize| RuleMatch {
        text: &rest[..end],
        captures: vec![Some(&rest[1..inner_end])],
    };
    let mut i = opener;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => return None,
            b'*' => {
                let run = star_run(bytes, i);
                let after_text = !bytes[i - 1].is_ascii_whitespace();
                match run {
                    1 if after_text => return Some(italic(i + 1, i)),
                    2 => bold_open = !bold_open,
                    3 if bold_open && after_text => return Some(italic(i + 3, i + 2)),
                    _ => {}
                }
                i += run;
            }
            _ => i += 1,
        }
    }
    None
}

fn annotated(m: &RuleMatch<'_>, annotations: Annotations) -> Extracted {
    Extracted {
        content: Some(m.group(1).to_string()),
        metadata: TokenMetadata {
            annotations: Some(annotations),
            ..Default::default()
        },
    }
}

fn extract_bold_italic(m: &RuleMatch<'_>) -> Extracted {
    annotated(m, Annotations::BOLD_ITALIC)
}

fn extract_bold(m: &RuleMatch<'_>) -> Extracted {
    annotated(m, Annotations::BOLD)
}

fn extract_italic(m: &RuleMatch<'_>) -> Extracted {
    annotated(m, Annotations::ITALIC)
}

fn extract_code(m: &RuleMatch<'_>) -> Extracted {
    annotated(m, Annotations::CODE)
}

fn extract_strikethrough(m: &RuleMatch<'_>) -> Extracted {
    annotated(m, Annotations::STRIKETHROUGH)
}

fn extract_underline(m: &RuleMatch<'_>) -> Extracted {
    annotated(m, Annotations::UNDERLINE)
}

fn extract_inner(m: &RuleMatch<'_>) -> Extracted {
    Extracted {
        content: Some(m.group(1).to_string()),
        metadata: TokenMetadata::default(),
    }
}

fn extract_link(m: &RuleMatch<'_>) -> Extracted {
    Extracted {
        content: Some(m.group(1).to_string()),
        metadata: TokenMetadata {
            url: Some(m.group(2).to_string()),
            ..Default::default()
        },
    }
}

fn extract_autolink(m: &RuleMatch<'_>) -> Extracted {
    Extracted {
        content: None,
        metadata: TokenMetadata {
            url: Some(m.text.to_string()),
            ..Default::default()
        },
    }
}
