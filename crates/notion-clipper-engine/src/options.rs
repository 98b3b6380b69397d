use serde::{Deserialize, Serialize};

use crate::parsers::DEFAULT_MAX_CODE_LENGTH;
use crate::rich_text::RichTextOptions;

pub const DEFAULT_MAX_BLOCKS: usize = 100;

/// How the input should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Detect from the content.
    #[default]
    Auto,
    Markdown,
    Text,
    Code,
    Url,
}

/// Which block families are emitted as such. A disabled family degrades to
/// its nearest plain form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub tables: bool,
    pub callouts: bool,
    pub toggles: bool,
    pub media: bool,
    pub equations: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            tables: true,
            callouts: true,
            toggles: true,
            media: true,
            equations: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingOptions {
    pub preserve_annotations: bool,
    pub preserve_links: bool,
    /// Language for code input when detection finds nothing.
    pub default_code_language: Option<String>,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            preserve_annotations: true,
            preserve_links: true,
            default_code_language: None,
        }
    }
}

impl FormattingOptions {
    pub fn rich_text(&self) -> RichTextOptions {
        RichTextOptions {
            preserve_annotations: self.preserve_annotations,
            preserve_links: self.preserve_links,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub content_type: ContentType,
    /// Cap on top-level blocks in the result.
    pub max_blocks: usize,
    /// Cap on code block length, in characters.
    pub max_code_length: usize,
    pub conversion: ConversionOptions,
    pub formatting: FormattingOptions,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            content_type: ContentType::Auto,
            max_blocks: DEFAULT_MAX_BLOCKS,
            max_code_length: DEFAULT_MAX_CODE_LENGTH,
            conversion: ConversionOptions::default(),
            formatting: FormattingOptions::default(),
        }
    }
}
