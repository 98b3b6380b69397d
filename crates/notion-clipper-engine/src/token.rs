use serde::Serialize;

/// Closed set of token types produced by the block and inline rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    // Line-level tokens
    Heading,
    ToggleHeading,
    ListItem,
    Quote,
    Callout,
    CodeFence,
    CodeLine,
    TableRow,
    Divider,
    Equation,
    Media,
    Text,
    Blank,
    Newline,
    Eof,

    // Inline tokens
    BoldItalic,
    Bold,
    Italic,
    InlineCode,
    Strikethrough,
    Underline,
    Link,
    AutoLink,
    InlineEquation,
    Escape,
    PlainText,
}

impl TokenType {
    /// Whether this type may appear in the line-level (block) rule set.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            TokenType::Heading
                | TokenType::ToggleHeading
                | TokenType::ListItem
                | TokenType::Quote
                | TokenType::Callout
                | TokenType::CodeFence
                | TokenType::CodeLine
                | TokenType::TableRow
                | TokenType::Divider
                | TokenType::Equation
                | TokenType::Media
                | TokenType::Text
                | TokenType::Blank
        )
    }

    /// Whether this type may appear in the inline rule set.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            TokenType::BoldItalic
                | TokenType::Bold
                | TokenType::Italic
                | TokenType::InlineCode
                | TokenType::Strikethrough
                | TokenType::Underline
                | TokenType::Link
                | TokenType::AutoLink
                | TokenType::InlineEquation
                | TokenType::Escape
                | TokenType::PlainText
        )
    }

    /// Structural tokens that separate lines rather than carry content.
    pub fn is_separator(self) -> bool {
        matches!(self, TokenType::Newline | TokenType::Blank | TokenType::Eof)
    }
}

/// Location of a token in the source text.
///
/// `start`/`end` are byte offsets into the full input, `[start, end)`.
/// `line` and `column` are zero-based; `column` counts characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListType {
    Bulleted,
    Numbered,
    Todo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRowKind {
    Data,
    Separator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Pdf,
}

/// Inline style flags carried by inline tokens and rich text segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
}

impl Annotations {
    pub const BOLD: Self = Self::with(true, false, false, false, false);
    pub const ITALIC: Self = Self::with(false, true, false, false, false);
    pub const BOLD_ITALIC: Self = Self::with(true, true, false, false, false);
    pub const STRIKETHROUGH: Self = Self::with(false, false, true, false, false);
    pub const UNDERLINE: Self = Self::with(false, false, false, true, false);
    pub const CODE: Self = Self::with(false, false, false, false, true);

    const fn with(
        bold: bool,
        italic: bool,
        strikethrough: bool,
        underline: bool,
        code: bool,
    ) -> Self {
        Self {
            bold,
            italic,
            strikethrough,
            underline,
            code,
        }
    }

    /// Overlays `parent` onto `self`. Every flag the parent sets is kept.
    #[must_use]
    pub fn merged_with(self, parent: Annotations) -> Annotations {
        Annotations {
            bold: parent.bold || self.bold,
            italic: parent.italic || self.italic,
            strikethrough: parent.strikethrough || self.strikethrough,
            underline: parent.underline || self.underline,
            code: parent.code || self.code,
        }
    }

    pub fn is_plain(self) -> bool {
        self == Annotations::default()
    }
}

/// Type-specific token payload. Fields are `None`/`false` when irrelevant.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TokenMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_level: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callout_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_type: Option<TableRowKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
    /// Fence marker string for code fences (e.g. "```" or "~~~~").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fence: Option<String>,
    /// Table cells for table rows, already split and trimmed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<String>,
    /// Whether the line sits behind a `>` prefix.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub quoted: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_toggleable: bool,
}

/// A classified, positioned span of input text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Extracted payload, e.g. heading text without the `#` marker.
    pub content: String,
    /// Exact text consumed from the input.
    pub raw: String,
    pub position: Position,
    pub metadata: TokenMetadata,
}

impl Token {
    pub fn is(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }

    /// Zero-length end-of-input sentinel.
    pub fn eof(offset: usize, line: usize, column: usize) -> Self {
        Token {
            token_type: TokenType::Eof,
            content: String::new(),
            raw: String::new(),
            position: Position {
                start: offset,
                end: offset,
                line,
                column,
            },
            metadata: TokenMetadata::default(),
        }
    }
}
