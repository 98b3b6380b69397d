//! AST to API blocks.
//!
//! Disabled block families degrade here rather than in the parsers, so the
//! AST always reflects the source structure:
//!
//! - tables: one paragraph per row, cells joined with ` | `
//! - callouts: quotes
//! - toggles: quotes; toggle headings become plain headings followed by
//!   their body
//! - media: a paragraph linking to the URL
//! - equations: `latex` code blocks

use super::{Block, BlockKind, MAX_SEGMENT_CHARS};
use crate::ast::{AstNode, NodeKind, TableData};
use crate::options::ConversionOptions;
use crate::rich_text::{RichTextBuilder, RichTextSegment, split_long_segments};
use crate::token::{Annotations, ListType};

pub struct Converter<'a> {
    pub options: &'a ConversionOptions,
    pub rich_text: &'a RichTextBuilder,
}

/// Converts `nodes` into blocks, nested children inline.
pub fn convert_nodes(
    nodes: &[AstNode],
    options: &ConversionOptions,
    rich_text: &RichTextBuilder,
) -> Vec<Block> {
    Converter { options, rich_text }.convert_all(nodes)
}

impl Converter<'_> {
    pub fn convert_all(&self, nodes: &[AstNode]) -> Vec<Block> {
        nodes.iter().flat_map(|n| self.convert(n)).collect()
    }

    /// One node becomes one block, except where degrading splits it.
    pub fn convert(&self, node: &AstNode) -> Vec<Block> {
        let rich_text = || split_long_segments(node.rich_text.clone(), MAX_SEGMENT_CHARS);
        let children = || self.convert_all(&node.children);

        let kind = match &node.kind {
            NodeKind::Paragraph => BlockKind::Paragraph {
                rich_text: rich_text(),
            },
            NodeKind::Heading {
                level,
                is_toggleable,
            } => {
                let toggleable = *is_toggleable && self.options.toggles;
                let heading = Block::new(BlockKind::Heading {
                    level: *level,
                    rich_text: rich_text(),
                    is_toggleable: toggleable,
                });
                return if toggleable {
                    vec![heading.with_children(children())]
                } else {
                    std::iter::once(heading).chain(children()).collect()
                };
            }
            NodeKind::ListItem {
                list_type,
                checked,
                ..
            } => match list_type {
                ListType::Bulleted => BlockKind::BulletedListItem {
                    rich_text: rich_text(),
                },
                ListType::Numbered => BlockKind::NumberedListItem {
                    rich_text: rich_text(),
                },
                ListType::Todo => BlockKind::ToDo {
                    rich_text: rich_text(),
                    checked: checked.unwrap_or(false),
                },
            },
            NodeKind::Quote => BlockKind::Quote {
                rich_text: rich_text(),
            },
            NodeKind::Toggle if self.options.toggles => BlockKind::Toggle {
                rich_text: rich_text(),
            },
            NodeKind::Toggle => BlockKind::Quote {
                rich_text: rich_text(),
            },
            NodeKind::Callout { icon, color, .. } if self.options.callouts => BlockKind::Callout {
                rich_text: rich_text(),
                icon: icon.to_string(),
                color: format!("{color}_background"),
            },
            NodeKind::Callout { .. } => BlockKind::Quote {
                rich_text: rich_text(),
            },
            NodeKind::Code { language, .. } => BlockKind::Code {
                rich_text: self.plain(&node.content),
                language: language.clone(),
            },
            NodeKind::Table(table) if self.options.tables => {
                return vec![self.table(table)];
            }
            NodeKind::Table(table) => {
                return table
                    .rows
                    .iter()
                    .map(|row| Block::paragraph(self.inline(&row.join(" | "))))
                    .collect();
            }
            NodeKind::Divider => BlockKind::Divider,
            NodeKind::Equation if self.options.equations => BlockKind::Equation {
                expression: node.content.clone(),
            },
            NodeKind::Equation => BlockKind::Code {
                rich_text: self.plain(&node.content),
                language: "latex".to_string(),
            },
            NodeKind::Media { media_type, url } if self.options.media => BlockKind::Media {
                media_type: *media_type,
                url: url.clone(),
                caption: rich_text(),
            },
            NodeKind::Media { url, .. } => {
                let label = if node.content.is_empty() {
                    url.as_str()
                } else {
                    node.content.as_str()
                };
                BlockKind::Paragraph {
                    rich_text: vec![RichTextSegment::link(label, url, Annotations::default())],
                }
            }
        };

        vec![Block::new(kind).with_children(children())]
    }

    fn table(&self, table: &TableData) -> Block {
        let rows = table
            .rows
            .iter()
            .map(|row| {
                Block::new(BlockKind::TableRow {
                    cells: row.iter().map(|cell| self.inline(cell)).collect(),
                })
            })
            .collect();
        Block::new(BlockKind::Table {
            table_width: table.width,
            has_column_header: table.has_column_header,
            has_row_header: table.has_row_header,
        })
        .with_children(rows)
    }

    fn inline(&self, text: &str) -> Vec<RichTextSegment> {
        split_long_segments(self.rich_text.build(text), MAX_SEGMENT_CHARS)
    }

    fn plain(&self, text: &str) -> Vec<RichTextSegment> {
        if text.is_empty() {
            return vec![];
        }
        split_long_segments(
            vec![RichTextSegment::text(text, Annotations::default())],
            MAX_SEGMENT_CHARS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::plain_text;
    use crate::token::MediaType;
    use pretty_assertions::assert_eq;

    fn convert(node: AstNode, options: ConversionOptions) -> Vec<Block> {
        let rich_text = RichTextBuilder::default();
        convert_nodes(&[node], &options, &rich_text)
    }

    fn para(s: &str) -> AstNode {
        AstNode::new(NodeKind::Paragraph, s)
            .with_rich_text(vec![RichTextSegment::text(s, Annotations::default())])
    }

    fn table_node() -> AstNode {
        AstNode::new(
            NodeKind::Table(TableData {
                width: 2,
                rows: vec![
                    vec!["Name".to_string(), "Role".to_string()],
                    vec!["Ada".to_string(), "**Eng**".to_string()],
                ],
                has_column_header: true,
                has_row_header: false,
            }),
            "",
        )
    }

    #[test]
    fn table_rows_become_row_children() {
        let blocks = convert(table_node(), ConversionOptions::default());
        assert_eq!(blocks.len(), 1);
        let table = &blocks[0];
        assert_eq!(table.type_name(), "table");
        assert!(table.has_children);
        assert_eq!(table.children.len(), 2);
        let BlockKind::TableRow { cells } = &table.children[1].kind else {
            panic!("expected row");
        };
        assert!(cells[1][0].annotations.bold);
    }

    #[test]
    fn disabled_tables_become_paragraphs() {
        let options = ConversionOptions {
            tables: false,
            ..Default::default()
        };
        let blocks = convert(table_node(), options);
        let texts: Vec<_> = blocks.iter().map(|b| plain_text(b.rich_text())).collect();
        assert_eq!(texts, vec!["Name | Role", "Ada | Eng"]);
    }

    #[test]
    fn callout_color_gets_background_suffix() {
        let node = AstNode::new(
            NodeKind::Callout {
                callout_type: "tip".to_string(),
                icon: "💡",
                color: "green",
            },
            "x",
        );
        let blocks = convert(node.clone(), ConversionOptions::default());
        assert_eq!(
            blocks[0].kind,
            BlockKind::Callout {
                rich_text: vec![],
                icon: "💡".to_string(),
                color: "green_background".to_string(),
            }
        );

        let options = ConversionOptions {
            callouts: false,
            ..Default::default()
        };
        assert_eq!(convert(node, options)[0].type_name(), "quote");
    }

    #[test]
    fn plain_toggle_heading_spills_children() {
        let node = AstNode::new(
            NodeKind::Heading {
                level: 2,
                is_toggleable: true,
            },
            "H",
        )
        .with_children(vec![para("body")]);

        let on = convert(node.clone(), ConversionOptions::default());
        assert_eq!(on.len(), 1);
        assert!(on[0].has_children);

        let off = convert(
            node,
            ConversionOptions {
                toggles: false,
                ..Default::default()
            },
        );
        let names: Vec<_> = off.iter().map(Block::type_name).collect();
        assert_eq!(names, vec!["heading_2", "paragraph"]);
    }

    #[test]
    fn equations_degrade_to_latex_code() {
        let node = AstNode::new(NodeKind::Equation, "x^2");
        let options = ConversionOptions {
            equations: false,
            ..Default::default()
        };
        let blocks = convert(node, options);
        let BlockKind::Code { language, rich_text } = &blocks[0].kind else {
            panic!("expected code");
        };
        assert_eq!(language, "latex");
        assert_eq!(plain_text(rich_text), "x^2");
    }

    #[test]
    fn media_degrades_to_link() {
        let node = AstNode::new(
            NodeKind::Media {
                media_type: MediaType::Video,
                url: "https://a.io/v.mp4".to_string(),
            },
            "",
        );
        let options = ConversionOptions {
            media: false,
            ..Default::default()
        };
        let blocks = convert(node, options);
        assert_eq!(blocks[0].rich_text()[0].url(), Some("https://a.io/v.mp4"));
    }

    #[test]
    fn long_code_is_split_into_segments() {
        let code = "x".repeat(MAX_SEGMENT_CHARS + 10);
        let node = AstNode::new(
            NodeKind::Code {
                language: "plain text".to_string(),
                truncated: false,
            },
            code,
        );
        let blocks = convert(node, ConversionOptions::default());
        let lens: Vec<_> = blocks[0]
            .rich_text()
            .iter()
            .map(|s| s.content.chars().count())
            .collect();
        assert_eq!(lens, vec![MAX_SEGMENT_CHARS, 10]);
    }
}
