pub mod ast;
pub mod blocks;
pub mod code_lang;
pub mod detect;
pub mod error;
pub mod hierarchy;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod parsers;
pub mod rich_text;
pub mod rules;
pub mod token;

// Re-export key types for easier usage
pub use ast::{AstNode, NodeKind, TableData};
pub use blocks::{Block, BlockKind};
pub use detect::DetectedType;
pub use error::{ParseError, RuleError};
pub use hierarchy::{
    ApiInstructions, BlockAppender, ChildOperation, ReplayError, generate_api_instructions, replay,
};
pub use lexer::{Lexer, TokenStream};
pub use options::{ContentType, ConversionOptions, FormattingOptions, ParseOptions};
pub use parser::{ModernParser, ParseMetadata, ParseResult, parse};
pub use rich_text::{RichTextBuilder, RichTextOptions, RichTextSegment, SegmentKind};
pub use token::{Annotations, ListType, MediaType, Position, Token, TokenMetadata, TokenType};
