//! # Blocks
//!
//! The document API's block objects, as produced from the AST by
//! [`convert`](convert::convert_nodes).
//!
//! A [`Block`] serializes to `{"object": "block", "type": T, "has_children":
//! bool, T: {...}}`, where the body holds the type-specific fields and, when
//! present, a nested `children` array. Nested children are only emitted
//! before the hierarchy pass (`crate::hierarchy`) strips them.

pub mod convert;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::rich_text::RichTextSegment;
use crate::token::MediaType;

/// The API rejects longer rich text contents.
pub const MAX_SEGMENT_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph {
        rich_text: Vec<RichTextSegment>,
    },
    Heading {
        level: u8,
        rich_text: Vec<RichTextSegment>,
        is_toggleable: bool,
    },
    BulletedListItem {
        rich_text: Vec<RichTextSegment>,
    },
    NumberedListItem {
        rich_text: Vec<RichTextSegment>,
    },
    ToDo {
        rich_text: Vec<RichTextSegment>,
        checked: bool,
    },
    Quote {
        rich_text: Vec<RichTextSegment>,
    },
    Toggle {
        rich_text: Vec<RichTextSegment>,
    },
    Callout {
        rich_text: Vec<RichTextSegment>,
        icon: String,
        color: String,
    },
    Code {
        rich_text: Vec<RichTextSegment>,
        language: String,
    },
    Table {
        table_width: usize,
        has_column_header: bool,
        has_row_header: bool,
    },
    TableRow {
        cells: Vec<Vec<RichTextSegment>>,
    },
    Divider,
    Equation {
        expression: String,
    },
    Media {
        media_type: MediaType,
        url: String,
        caption: Vec<RichTextSegment>,
    },
    Bookmark {
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub children: Vec<Block>,
    /// Set when the block has descendants, whether inline or deferred.
    pub has_children: bool,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            children: vec![],
            has_children: false,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = !children.is_empty();
        self.children = children;
        self
    }

    pub fn paragraph(rich_text: Vec<RichTextSegment>) -> Self {
        Self::new(BlockKind::Paragraph { rich_text })
    }

    /// The API `type` discriminator.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Heading { level: 1, .. } => "heading_1",
            BlockKind::Heading { level: 2, .. } => "heading_2",
            BlockKind::Heading { .. } => "heading_3",
            BlockKind::BulletedListItem { .. } => "bulleted_list_item",
            BlockKind::NumberedListItem { .. } => "numbered_list_item",
            BlockKind::ToDo { .. } => "to_do",
            BlockKind::Quote { .. } => "quote",
            BlockKind::Toggle { .. } => "toggle",
            BlockKind::Callout { .. } => "callout",
            BlockKind::Code { .. } => "code",
            BlockKind::Table { .. } => "table",
            BlockKind::TableRow { .. } => "table_row",
            BlockKind::Divider => "divider",
            BlockKind::Equation { .. } => "equation",
            BlockKind::Media {
                media_type: MediaType::Image,
                ..
            } => "image",
            BlockKind::Media {
                media_type: MediaType::Video,
                ..
            } => "video",
            BlockKind::Media {
                media_type: MediaType::Audio,
                ..
            } => "audio",
            BlockKind::Media {
                media_type: MediaType::Pdf,
                ..
            } => "pdf",
            BlockKind::Bookmark { .. } => "bookmark",
        }
    }

    pub fn rich_text(&self) -> &[RichTextSegment] {
        match &self.kind {
            BlockKind::Paragraph { rich_text }
            | BlockKind::Heading { rich_text, .. }
            | BlockKind::BulletedListItem { rich_text }
            | BlockKind::NumberedListItem { rich_text }
            | BlockKind::ToDo { rich_text, .. }
            | BlockKind::Quote { rich_text }
            | BlockKind::Toggle { rich_text }
            | BlockKind::Callout { rich_text, .. }
            | BlockKind::Code { rich_text, .. } => rich_text,
            BlockKind::Media { caption, .. } => caption,
            _ => &[],
        }
    }

    /// Splits off the nested children, keeping `has_children`.
    pub fn detach_children(mut self) -> (Block, Vec<Block>) {
        let children = std::mem::take(&mut self.children);
        self.has_children = !children.is_empty();
        (self, children)
    }

    /// This block and all its descendants.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Block::count).sum::<usize>()
    }
}

struct Body<'a>(&'a Block);

struct Icon<'a>(&'a str);

impl Serialize for Icon<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "emoji")?;
        map.serialize_entry("emoji", self.0)?;
        map.end()
    }
}

struct External<'a>(&'a str);

impl Serialize for External<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("url", self.0)?;
        map.end()
    }
}

impl Serialize for Body<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let block = self.0;
        let mut map = serializer.serialize_map(None)?;
        match &block.kind {
            BlockKind::Paragraph { rich_text }
            | BlockKind::BulletedListItem { rich_text }
            | BlockKind::NumberedListItem { rich_text }
            | BlockKind::Quote { rich_text }
            | BlockKind::Toggle { rich_text } => {
                map.serialize_entry("rich_text", rich_text)?;
            }
            BlockKind::Heading {
                rich_text,
                is_toggleable,
                ..
            } => {
                map.serialize_entry("rich_text", rich_text)?;
                map.serialize_entry("is_toggleable", is_toggleable)?;
            }
            BlockKind::ToDo { rich_text, checked } => {
                map.serialize_entry("rich_text", rich_text)?;
                map.serialize_entry("checked", checked)?;
            }
            BlockKind::Callout {
                rich_text,
                icon,
                color,
            } => {
                map.serialize_entry("rich_text", rich_text)?;
                map.serialize_entry("icon", &Icon(icon))?;
                map.serialize_entry("color", color)?;
            }
            BlockKind::Code {
                rich_text,
                language,
            } => {
                map.serialize_entry("rich_text", rich_text)?;
                map.serialize_entry("language", language)?;
            }
            BlockKind::Table {
                table_width,
                has_column_header,
                has_row_header,
            } => {
                map.serialize_entry("table_width", table_width)?;
                map.serialize_entry("has_column_header", has_column_header)?;
                map.serialize_entry("has_row_header", has_row_header)?;
            }
            BlockKind::TableRow { cells } => {
                map.serialize_entry("cells", cells)?;
            }
            BlockKind::Divider => {}
            BlockKind::Equation { expression } => {
                map.serialize_entry("expression", expression)?;
            }
            BlockKind::Media { url, caption, .. } => {
                map.serialize_entry("type", "external")?;
                map.serialize_entry("external", &External(url))?;
                if !caption.is_empty() {
                    map.serialize_entry("caption", caption)?;
                }
            }
            BlockKind::Bookmark { url } => {
                map.serialize_entry("url", url)?;
            }
        }
        if !block.children.is_empty() {
            map.serialize_entry("children", &block.children)?;
        }
        map.end()
    }
}

/// Serializes in the document API's block object shape.
impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let type_name = self.type_name();
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("object", "block")?;
        map.serialize_entry("type", type_name)?;
        map.serialize_entry("has_children", &self.has_children)?;
        map.serialize_entry(type_name, &Body(self))?;
        map.end()
    }
}
