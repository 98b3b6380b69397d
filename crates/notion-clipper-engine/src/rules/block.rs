//! Line-level rules.
//!
//! Every rule here is matched against a single physical line (without its
//! terminator) and is expected to consume the whole line. Syntax knowledge
//! about markers lives here so parsers never hardcode `#`, `>` or fences.

use std::sync::OnceLock;

use regex::Regex;

use super::{Extracted, Rule, RuleEngine, RuleMatch, RuleSet};
use crate::token::{ListType, MediaType, TableRowKind, TokenMetadata, TokenType};

/// Columns per list nesting level.
pub const INDENT_WIDTH: usize = 2;
/// Columns a tab expands to when measuring indentation.
pub const TAB_WIDTH: usize = 4;
/// Fewest cells a line needs before it is treated as a table row.
pub const MIN_TABLE_COLUMNS: usize = 2;
/// Headings deeper than this are clamped.
pub const MAX_HEADING_LEVEL: u8 = 3;

pub const QUOTE_PREFIX: char = '>';

/// The shared block rule engine, built once.
pub fn block_rules() -> &'static RuleEngine {
    static ENGINE: OnceLock<RuleEngine> = OnceLock::new();
    ENGINE.get_or_init(|| RuleEngine::new(RuleSet::Block, rules()))
}

fn rules() -> Vec<Rule> {
    vec![
        Rule::regex("blank", 200, r"^[ \t]+$", TokenType::Blank, None),
        Rule::regex(
            "code-fence",
            100,
            r"^[ \t]*(`{3,}|~{3,})[ \t]*([^\s`]*).*$",
            TokenType::CodeFence,
            Some(extract_fence),
        ),
        Rule::regex(
            "callout",
            95,
            r"^[ \t]*>[ \t]*\[!([A-Za-z]+)\][+-]?[ \t]*(.*)$",
            TokenType::Callout,
            Some(extract_callout),
        ),
        Rule::regex(
            "toggle-heading",
            92,
            r"^[ \t]*>[ \t]*(#{1,6})[ \t]+(\S.*?)[ \t]*$",
            TokenType::ToggleHeading,
            Some(extract_toggle_heading),
        ),
        Rule::regex(
            "heading",
            90,
            r"^[ \t]{0,3}(#{1,6})[ \t]+(\S.*?)[ \t]*$",
            TokenType::Heading,
            Some(extract_heading),
        ),
        Rule::regex(
            "equation",
            88,
            r"^[ \t]*\$\$(.*)$",
            TokenType::Equation,
            Some(extract_equation),
        ),
        Rule::regex(
            "divider",
            85,
            r"^[ \t]{0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$",
            TokenType::Divider,
            None,
        ),
        Rule::function(
            "table-row",
            80,
            match_table_row,
            TokenType::TableRow,
            Some(extract_table_row),
        ),
        Rule::regex(
            "image",
            75,
            r#"^[ \t]*!\[([^\]]*)\]\(([^)\s]+)(?:[ \t]+"([^"]*)")?\)[ \t]*$"#,
            TokenType::Media,
            Some(extract_image),
        ),
        Rule::regex(
            "media-file",
            74,
            r"(?i)^[ \t]*(https?://\S+?\.(mp4|mov|webm|avi|mkv|mp3|wav|ogg|m4a|flac|pdf)(?:[?#]\S*)?)[ \t]*$",
            TokenType::Media,
            Some(extract_media_file),
        ),
        Rule::regex(
            "media-video-host",
            74,
            r"(?i)^[ \t]*(https?://(?:www\.)?(?:youtube\.com/watch\S*|youtu\.be/\S+|vimeo\.com/\S+))[ \t]*$",
            TokenType::Media,
            Some(extract_video_host),
        ),
        Rule::regex(
            "list-item",
            70,
            r"^([ \t]*)(?:>([ \t]*))?([-*+]|\d{1,9}[.)])[ \t]+(?:\[([ xX])\](?:[ \t]+|$))?(.*)$",
            TokenType::ListItem,
            Some(extract_list_item),
        ),
        Rule::regex(
            "quote",
            60,
            r"^[ \t]*>.*$",
            TokenType::Quote,
            Some(extract_quote),
        ),
        Rule::regex("text", 1, r"^.+$", TokenType::Text, None),
    ]
}

/// Strips every leading `>` (with optional surrounding spaces) from a line.
///
/// Handles `> text`, `>> nested` and `> > spaced nested`.
///
/// # Returns
/// - `depth`: number of `>` prefixes found (0 if not quoted)
/// - `byte_offset`: index into `s` where content begins
pub fn strip_quote_prefixes(s: &str) -> (u8, usize) {
    let b = s.as_bytes();
    let mut i = 0usize;
    let mut depth = 0u8;

    loop {
        let mut j = i;
        while j < b.len() && (b[j] == b' ' || b[j] == b'\t') {
            j += 1;
        }
        if j < b.len() && b[j] == QUOTE_PREFIX as u8 {
            depth = depth.saturating_add(1);
            i = j + 1;
            if i < b.len() && b[i] == b' ' {
                i += 1;
            }
        } else {
            break;
        }
    }
    (depth, i)
}

/// Text of a quoted line with all `>` prefixes removed.
pub fn quote_content(line: &str) -> &str {
    let (_, idx) = strip_quote_prefixes(line);
    &line[idx..]
}

/// Indentation width in columns, expanding tabs.
pub fn indent_columns(ws: &str) -> usize {
    ws.chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Whether `line` closes a fence opened with `fence` (e.g. "```").
///
/// The closer must use the same character, be at least as long, and carry
/// nothing but whitespace after it.
pub fn closes_fence(line: &str, fence: &str) -> bool {
    let Some(marker) = fence.chars().next() else {
        return false;
    };
    let t = line.trim();
    let run = t.chars().take_while(|&c| c == marker).count();
    run >= fence.chars().count() && run == t.chars().count()
}

/// Splits a `| a | b |` row into trimmed cells. `\|` is a literal pipe.
pub fn split_table_cells(line: &str) -> Vec<String> {
    let t = line.trim();
    let t = t.strip_prefix('|').unwrap_or(t);
    let t = if t.ends_with('|') && !t.ends_with("\\|") {
        &t[..t.len() - 1]
    } else {
        t
    };

    let mut cells = vec![];
    let mut cur = String::new();
    let mut chars = t.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cur.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cur).trim().to_string()),
            _ => cur.push(c),
        }
    }
    cells.push(cur.trim().to_string());
    cells
}

/// Whether every cell is a `---`, `:--`, `--:` or `:-:` alignment marker.
pub fn is_separator_row(cells: &[String]) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^:?-+:?$").expect("Invalid separator regex"));
    !cells.is_empty() && cells.iter().all(|c| re.is_match(c))
}

fn match_table_row(line: &str) -> Option<RuleMatch<'_>> {
    let t = line.trim();
    if t.len() < 2 || !t.starts_with('|') || !t.ends_with('|') {
        return None;
    }
    if split_table_cells(t).len() < MIN_TABLE_COLUMNS {
        return None;
    }
    Some(RuleMatch::whole(line))
}

fn extract_table_row(m: &RuleMatch<'_>) -> Extracted {
    let cells = split_table_cells(m.text);
    let table_type = if is_separator_row(&cells) {
        TableRowKind::Separator
    } else {
        TableRowKind::Data
    };
    Extracted {
        content: Some(m.text.trim().to_string()),
        metadata: TokenMetadata {
            table_type: Some(table_type),
            cells,
            ..Default::default()
        },
    }
}

fn extract_fence(m: &RuleMatch<'_>) -> Extracted {
    let language = m.group(2).to_ascii_lowercase();
    Extracted {
        content: Some(language.clone()),
        metadata: TokenMetadata {
            fence: Some(m.group(1).to_string()),
            language: (!language.is_empty()).then_some(language),
            ..Default::default()
        },
    }
}

fn extract_callout(m: &RuleMatch<'_>) -> Extracted {
    Extracted {
        content: Some(m.group(2).trim_end().to_string()),
        metadata: TokenMetadata {
            callout_type: Some(m.group(1).to_ascii_lowercase()),
            quoted: true,
            ..Default::default()
        },
    }
}

fn heading_level(hashes: &str) -> u8 {
    u8::try_from(hashes.len())
        .unwrap_or(MAX_HEADING_LEVEL)
        .min(MAX_HEADING_LEVEL)
}

fn extract_heading(m: &RuleMatch<'_>) -> Extracted {
    Extracted {
        content: Some(m.group(2).to_string()),
        metadata: TokenMetadata {
            level: Some(heading_level(m.group(1))),
            ..Default::default()
        },
    }
}

fn extract_toggle_heading(m: &RuleMatch<'_>) -> Extracted {
    Extracted {
        content: Some(m.group(2).to_string()),
        metadata: TokenMetadata {
            level: Some(heading_level(m.group(1))),
            quoted: true,
            is_toggleable: true,
            ..Default::default()
        },
    }
}

/// `$$ x $$` yields `x`; a bare `$$` opener or closer yields `""`.
fn extract_equation(m: &RuleMatch<'_>) -> Extracted {
    let rest = m.group(1).trim();
    let inner = rest.strip_suffix("$$").unwrap_or(rest).trim();
    Extracted {
        content: Some(inner.to_string()),
        metadata: TokenMetadata::default(),
    }
}

fn extract_image(m: &RuleMatch<'_>) -> Extracted {
    let caption = match m.group(3) {
        "" => m.group(1),
        title => title,
    };
    Extracted {
        content: Some(caption.to_string()),
        metadata: TokenMetadata {
            url: Some(m.group(2).to_string()),
            media_type: Some(MediaType::Image),
            ..Default::default()
        },
    }
}

fn extract_media_file(m: &RuleMatch<'_>) -> Extracted {
    let media_type = match m.group(2).to_ascii_lowercase().as_str() {
        "mp3" | "wav" | "ogg" | "m4a" | "flac" => MediaType::Audio,
        "pdf" => MediaType::Pdf,
        _ => MediaType::Video,
    };
    Extracted {
        content: Some(String::new()),
        metadata: TokenMetadata {
            url: Some(m.group(1).to_string()),
            media_type: Some(media_type),
            ..Default::default()
        },
    }
}

fn extract_video_host(m: &RuleMatch<'_>) -> Extracted {
    Extracted {
        content: Some(String::new()),
        metadata: TokenMetadata {
            url: Some(m.group(1).to_string()),
            media_type: Some(MediaType::Video),
            ..Default::default()
        },
    }
}

fn extract_list_item(m: &RuleMatch<'_>) -> Extracted {
    let quoted = m.captures.get(1).copied().flatten().is_some();
    let before = indent_columns(m.group(1));
    let total = if quoted {
        // One space after `>` is part of the marker, not indentation.
        before.max(indent_columns(m.group(2)).saturating_sub(1))
    } else {
        before
    };

    let marker = m.group(3);
    let checkbox = m.group(4);
    let (list_type, checked) = if !checkbox.is_empty() {
        (ListType::Todo, Some(checkbox.eq_ignore_ascii_case("x")))
    } else if marker.starts_with(|c: char| c.is_ascii_digit()) {
        (ListType::Numbered, None)
    } else {
        (ListType::Bulleted, None)
    };

    Extracted {
        content: Some(m.group(5).trim_end().to_string()),
        metadata: TokenMetadata {
            indent_level: Some(total / INDENT_WIDTH),
            list_type: Some(list_type),
            checked,
            quoted,
            ..Default::default()
        },
    }
}

fn extract_quote(m: &RuleMatch<'_>) -> Extracted {
    Extracted {
        content: Some(quote_content(m.text).to_string()),
        metadata: TokenMetadata {
            quoted: true,
            ..Default::default()
        },
    }
}

/// Line patterns that turn a quote into a toggle when seen inside it.
pub fn looks_structural(content: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(?:[ \t]{0,3}#{1,6}[ \t]+\S|[ \t]*(?:[-*+]|\d{1,9}[.)])[ \t]+|[ \t]*\|.*\||[ \t]*(?:`{3,}|~{3,}))")
            .expect("Invalid structural-line regex")
    });
    re.is_match(content)
}
