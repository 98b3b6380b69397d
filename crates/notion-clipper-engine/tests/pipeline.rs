use insta::assert_snapshot;
use notion_clipper_engine::rich_text::plain_text;
use notion_clipper_engine::{
    Annotations, ApiInstructions, AstNode, Block, BlockKind, ChildOperation, ContentType, Lexer,
    ModernParser, NodeKind, ParseOptions, RichTextBuilder, RichTextSegment, TokenType,
    generate_api_instructions, parse,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn markdown_options() -> ParseOptions {
    ParseOptions {
        content_type: ContentType::Markdown,
        ..Default::default()
    }
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

/// One line per block, children indented under their parent.
fn outline(blocks: &[Block]) -> String {
    let mut lines = vec![];
    for block in blocks {
        render(block, 0, &mut lines);
    }
    lines.join("\n")
}

fn render(block: &Block, depth: usize, out: &mut Vec<String>) {
    let label = match &block.kind {
        BlockKind::Heading {
            is_toggleable: true,
            ..
        } => format!("{}(toggle)", block.type_name()),
        BlockKind::ToDo { checked, .. } => format!("to_do[{}]", if *checked { "x" } else { " " }),
        BlockKind::Callout { icon, color, .. } => format!("callout({icon} {color})"),
        BlockKind::Code { language, .. } => format!("code({language})"),
        BlockKind::Table {
            table_width,
            has_column_header,
            has_row_header,
        } => format!(
            "table(width={table_width}, column_header={has_column_header}, row_header={has_row_header})"
        ),
        BlockKind::Media { url, .. } => format!("{}({url})", block.type_name()),
        _ => block.type_name().to_string(),
    };
    let text = match &block.kind {
        BlockKind::TableRow { cells } => cells
            .iter()
            .map(|c| plain_text(c))
            .collect::<Vec<_>>()
            .join(" | "),
        BlockKind::Equation { expression } => expression.clone(),
        _ => plain_text(block.rich_text()),
    }
    .replace('\n', " / ");

    let line = if text.is_empty() {
        label
    } else {
        format!("{label}: {text}")
    };
    out.push(format!("{}{line}", "  ".repeat(depth)));
    for child in &block.children {
        render(child, depth + 1, out);
    }
}

fn instructions_outline(instructions: &ApiInstructions) -> String {
    fn names(blocks: &[Block]) -> String {
        blocks
            .iter()
            .map(Block::type_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
    fn ops(operations: &[ChildOperation], depth: usize, out: &mut Vec<String>) {
        for op in operations {
            out.push(format!(
                "{}op parent={}: {}",
                "  ".repeat(depth),
                op.parent_block_index,
                names(&op.child_blocks)
            ));
            ops(&op.nested_operations, depth + 1, out);
        }
    }
    let mut lines = vec![format!("root: {}", names(&instructions.root_blocks))];
    ops(&instructions.child_operations, 0, &mut lines);
    lines.join("\n")
}

#[test]
fn fixture_meeting_notes() {
    let result = parse(&fixture("meeting_notes"), &ParseOptions::default());
    assert!(result.success);
    assert_snapshot!(outline(&result.blocks), @r#"
    heading_1: Weekly sync
    paragraph: Discussed the launch plan with Ada.
    heading_2: Action items
    to_do[x]: Draft announcement
    to_do[ ]: Review pricing
      bulleted_list_item: Check competitors
    bulleted_list_item: Ship it
    callout(⚠️ yellow_background): Deadline / Friday at noon
    table(width=2, column_header=true, row_header=true)
      table_row: Owner | Task
      table_row: Ada | Docs
      table_row: Bob | QA
    code(python): print("done")
    divider
    quote: Keep it simple.
    "#);
}

#[test]
fn fixture_toggles() {
    let result = parse(&fixture("toggles"), &markdown_options());
    assert_snapshot!(outline(&result.blocks), @r"
    heading_2(toggle): FAQ
      paragraph: Answers live here.
    toggle: Steps
      paragraph: - one / - two
    bulleted_list_item: Level A
      bulleted_list_item: Level B
        bulleted_list_item: Level C
          bulleted_list_item: Level D
    ");

    let instructions = generate_api_instructions(&result.blocks);
    assert_snapshot!(instructions_outline(&instructions), @r"
    root: heading_2, toggle, bulleted_list_item
    op parent=0: paragraph
    op parent=1: paragraph
    op parent=2: bulleted_list_item
      op parent=0: bulleted_list_item
        op parent=0: bulleted_list_item
    ");
}

#[test]
fn fixture_media_and_math() {
    let result = parse(&fixture("media_and_math"), &markdown_options());
    assert_snapshot!(outline(&result.blocks), @r"
    image(https://example.com/arch.png): Architecture
    video(https://example.com/demo.mp4)
    equation: E = mc^2
    paragraph: Inline a^2 math and old text.
    paragraph: ![bad](ftp://example.com/x.png)
    ");
}

#[test]
fn bold_and_italic_segments() {
    let segments = RichTextBuilder::default().build("**bold** and *italic*");
    assert_eq!(
        segments,
        vec![
            RichTextSegment::text("bold", Annotations::BOLD),
            RichTextSegment::text(" and ", Annotations::default()),
            RichTextSegment::text("italic", Annotations::ITALIC),
        ]
    );
}

#[test]
fn three_level_list_nests() {
    let nodes = ModernParser::new().parse_nodes("- A\n  - B\n    - C", &markdown_options());
    assert_eq!(nodes.len(), 1);
    let a = &nodes[0];
    assert_eq!(a.content, "A");
    assert_eq!(a.children.len(), 1);
    assert_eq!(a.children[0].content, "B");
    assert_eq!(a.children[0].children.len(), 1);
    assert_eq!(a.children[0].children[0].content, "C");
}

#[test]
fn separator_row_marks_column_header() {
    let nodes = ModernParser::new().parse_nodes(
        "| a | b |\n|---|---|\n| 1 | 2 |",
        &markdown_options(),
    );
    let NodeKind::Table(table) = &nodes[0].kind else {
        panic!("expected table, got {:?}", nodes[0].kind);
    };
    assert!(table.has_column_header);
    assert_eq!(table.rows.len(), 2);
    assert!(table.rows.iter().all(|r| r.iter().all(|c| !c.contains("---"))));
}

#[test]
fn fenced_python_is_one_code_node() {
    let nodes =
        ModernParser::new().parse_nodes("```python\nprint(1)\n```", &markdown_options());
    assert_eq!(nodes.len(), 1);
    assert_eq!(
        nodes[0].kind,
        NodeKind::Code {
            language: "python".to_string(),
            truncated: false,
        }
    );
}

#[test]
fn warning_callout_is_yellow() {
    let nodes = ModernParser::new().parse_nodes("> [!warning] Be careful", &markdown_options());
    let NodeKind::Callout {
        callout_type,
        color,
        ..
    } = &nodes[0].kind
    else {
        panic!("expected callout, got {:?}", nodes[0].kind);
    };
    assert_eq!(callout_type, "warning");
    assert_eq!(*color, "yellow");
}

#[test]
fn nested_list_instructions() {
    let result = parse("- parent\n  - child", &markdown_options());
    let instructions = generate_api_instructions(&result.blocks);
    assert!(instructions.root_blocks[0].has_children);
    assert_eq!(instructions.child_operations[0].parent_block_index, 0);
    assert_eq!(
        instructions.child_operations[0].child_blocks[0].type_name(),
        "bulleted_list_item"
    );
}

#[test]
fn instructions_json_shape() {
    let result = parse("- parent\n  - child", &markdown_options());
    let json = serde_json::to_value(generate_api_instructions(&result.blocks)).unwrap();
    assert_eq!(json["rootBlocks"][0]["object"], "block");
    assert_eq!(json["rootBlocks"][0]["has_children"], true);
    assert!(json["rootBlocks"][0]["bulleted_list_item"].get("children").is_none());
    assert_eq!(
        json["childOperations"][0]["childBlocks"][0]["bulleted_list_item"]["rich_text"][0]["plain_text"],
        "child"
    );
}

fn list_line(depth: usize, marker: u8, index: usize) -> String {
    let marker = match marker % 3 {
        0 => "-".to_string(),
        1 => format!("{}.", index + 1),
        _ => "- [ ]".to_string(),
    };
    format!("{}{marker} item{index}", "  ".repeat(depth))
}

/// Depth sequences where every item is at most one level deeper than the
/// previous one, starting at the root.
fn depth_sequence() -> impl Strategy<Value = Vec<(usize, u8)>> {
    prop::collection::vec((0usize..4, any::<u8>()), 1..20).prop_map(|raw| {
        let mut prev = 0usize;
        raw.into_iter()
            .enumerate()
            .map(|(i, (step, marker))| {
                let depth = if i == 0 { 0 } else { step.min(prev + 1) };
                prev = depth;
                (depth, marker)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn tokens_cover_input_exactly(input in "[a-z0-9 #>*_|`~$!:/.()\\[\\]\\n-]{0,200}") {
        let tokens = Lexer::new().lex(&input);
        let mut expected_start = 0;
        for token in &tokens {
            prop_assert_eq!(token.position.start, expected_start);
            prop_assert_eq!(&input[token.position.start..token.position.end], token.raw.as_str());
            expected_start = token.position.end;
        }
        prop_assert_eq!(expected_start, input.len());
        prop_assert!(tokens.last().is_some_and(|t| t.is(TokenType::Eof)));
    }

    #[test]
    fn any_input_parses_to_flat_instructions(input in "[a-z0-9 #>*_|`~$!:/.()\\[\\]\\n-]{0,200}") {
        let result = parse(&input, &markdown_options());
        prop_assert!(result.success);
        if !input.trim().is_empty() {
            prop_assert!(!result.blocks.is_empty());
        }
        let instructions = generate_api_instructions(&result.blocks);
        for block in instructions.all_blocks() {
            prop_assert!(block.children.is_empty());
            for segment in block.rich_text() {
                prop_assert!(!segment.content.is_empty());
            }
        }
    }

    #[test]
    fn nested_lists_round_trip(items in depth_sequence()) {
        let input = items
            .iter()
            .enumerate()
            .map(|(i, (depth, marker))| list_line(*depth, *marker, i))
            .collect::<Vec<_>>()
            .join("\n");
        let nodes = ModernParser::new().parse_nodes(&input, &markdown_options());

        let mut seen = vec![];
        for node in &nodes {
            node.walk(0, &mut |n: &AstNode, depth| {
                let indent_level = match n.kind {
                    NodeKind::ListItem { indent_level, .. } => indent_level,
                    _ => usize::MAX,
                };
                seen.push((depth, indent_level, n.content.clone()));
            });
        }
        let expected: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(i, (depth, _))| (*depth, *depth, format!("item{i}")))
            .collect();
        prop_assert_eq!(seen, expected);
    }
}
