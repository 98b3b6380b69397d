//! Pipe tables.
//!
//! Rows are normalized to the widest row. Separator rows (`|---|:-:|`) are
//! dropped and mark the first row as a column header. Without a separator,
//! headers are inferred:
//!
//! - column header: more than half of the first row's cells start with an
//!   uppercase letter
//! - row header: at least two rows, and more than 80% of first-column cells
//!   are non-numeric text
//!
//! Cell text stays raw here; rich text is built at conversion time.

use super::{BlockParser, ParseContext};
use crate::ast::{AstNode, NodeKind, TableData};
use crate::lexer::TokenStream;
use crate::token::{TableRowKind, Token, TokenType};

pub struct TableParser;

impl TableParser {
    /// Adds a data row; returns true for a separator row instead.
    fn push_row(token: &Token, rows: &mut Vec<Vec<String>>) -> bool {
        if token.metadata.table_type == Some(TableRowKind::Separator) {
            return true;
        }
        rows.push(token.metadata.cells.clone());
        false
    }
}

impl BlockParser for TableParser {
    fn name(&self) -> &'static str {
        "table"
    }

    fn priority(&self) -> u32 {
        80
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        stream.peek(0).is(TokenType::TableRow)
    }

    fn parse(&self, stream: &mut TokenStream, _ctx: &ParseContext<'_>) -> Option<AstNode> {
        let mut rows = vec![];
        let mut raw_lines = vec![];

        let first = stream.next()?;
        raw_lines.push(first.raw.trim().to_string());
        let mut has_separator = Self::push_row(first, &mut rows);

        while let Some(next) = stream.peek_continuation() {
            if !next.is(TokenType::TableRow) {
                break;
            }
            raw_lines.push(next.raw.trim().to_string());
            has_separator |= Self::push_row(next, &mut rows);
            stream.next_continuation();
        }

        // A run of separators alone is not a table.
        if rows.is_empty() {
            return None;
        }

        let table = normalize(rows, has_separator);
        Some(AstNode::new(NodeKind::Table(table), raw_lines.join("\n")))
    }
}

/// Pads or truncates every row to the widest row and infers headers.
pub fn normalize(mut rows: Vec<Vec<String>>, has_separator: bool) -> TableData {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(width, String::new());
    }

    let has_column_header = has_separator || first_row_looks_like_header(&rows);
    let has_row_header = first_column_looks_like_header(&rows);
    TableData {
        width,
        rows,
        has_column_header,
        has_row_header,
    }
}

fn first_row_looks_like_header(rows: &[Vec<String>]) -> bool {
    let Some(first) = rows.first() else {
        return false;
    };
    let upper = first
        .iter()
        .filter(|c| c.chars().next().is_some_and(char::is_uppercase))
        .count();
    !first.is_empty() && upper * 2 > first.len()
}

fn first_column_looks_like_header(rows: &[Vec<String>]) -> bool {
    if rows.len() < 2 {
        return false;
    }
    let text = rows
        .iter()
        .filter_map(|r| r.first())
        .filter(|c| !c.is_empty() && !is_numeric(c))
        .count();
    text * 10 > rows.len() * 8
}

/// Numbers, with optional currency sign, thousands separators or percent.
fn is_numeric(cell: &str) -> bool {
    let t = cell
        .trim()
        .trim_start_matches(['$', '€', '£', '+', '-'])
        .trim_end_matches('%')
        .replace(',', "");
    t.bytes().any(|b| b.is_ascii_digit()) && t.parse::<f64>().is_ok()
}
