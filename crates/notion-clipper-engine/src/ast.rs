use serde::Serialize;

use crate::rich_text::RichTextSegment;
use crate::token::{ListType, MediaType};

/// Table rows after normalization. Every row has exactly `width` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableData {
    pub width: usize,
    pub rows: Vec<Vec<String>>,
    pub has_column_header: bool,
    pub has_row_header: bool,
}

/// The kind of a block node, with its kind-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Heading {
        level: u8,
        is_toggleable: bool,
    },
    Paragraph,
    ListItem {
        list_type: ListType,
        indent_level: usize,
        /// Only set for todo items.
        checked: Option<bool>,
    },
    Quote,
    Toggle,
    Callout {
        callout_type: String,
        icon: &'static str,
        color: &'static str,
    },
    Code {
        language: String,
        truncated: bool,
    },
    Table(TableData),
    Divider,
    Equation,
    Media {
        media_type: MediaType,
        url: String,
    },
}

/// A parsed block. Built by exactly one parser call and not mutated after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AstNode {
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Source text of the block: heading text, joined quote lines, code, ...
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rich_text: Vec<RichTextSegment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(kind: NodeKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            rich_text: vec![],
            children: vec![],
        }
    }

    #[must_use]
    pub fn with_rich_text(mut self, rich_text: Vec<RichTextSegment>) -> Self {
        self.rich_text = rich_text;
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<AstNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self.kind, NodeKind::ListItem { .. })
    }

    /// Short kind name used in logs and outlines.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Heading {
                is_toggleable: true,
                ..
            } => "toggle_heading",
            NodeKind::Heading { .. } => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::ListItem { .. } => "list_item",
            NodeKind::Quote => "quote",
            NodeKind::Toggle => "toggle",
            NodeKind::Callout { .. } => "callout",
            NodeKind::Code { .. } => "code",
            NodeKind::Table(_) => "table",
            NodeKind::Divider => "divider",
            NodeKind::Equation => "equation",
            NodeKind::Media { .. } => "media",
        }
    }

    /// Total node count including all descendants.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(AstNode::count).sum::<usize>()
    }

    /// Depth-first pre-order visit with nesting depth.
    pub fn walk<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a AstNode, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk(depth + 1, visit);
        }
    }
}
