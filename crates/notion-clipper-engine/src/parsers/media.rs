use super::{BlockParser, ParseContext};
use crate::ast::{AstNode, NodeKind};
use crate::lexer::TokenStream;
use crate::rich_text::RichTextSegment;
use crate::rich_text::link::sanitize_url;
use crate::token::{Annotations, MediaType, TokenType};

/// Images (`![alt](url)`) and bare media URLs.
///
/// A URL that is not http(s) degrades to an unformatted paragraph holding
/// the original line.
pub struct MediaParser;

impl BlockParser for MediaParser {
    fn name(&self) -> &'static str {
        "media"
    }

    fn priority(&self) -> u32 {
        75
    }

    fn can_parse(&self, stream: &TokenStream) -> bool {
        stream.peek(0).is(TokenType::Media)
    }

    fn parse(&self, stream: &mut TokenStream, ctx: &ParseContext<'_>) -> Option<AstNode> {
        let token = stream.next()?;
        let raw = token.raw.trim().to_string();
        let caption = token.content.clone();
        let media_type = token.metadata.media_type.unwrap_or(MediaType::Image);

        match token.metadata.url.as_deref().and_then(sanitize_url) {
            Some(url) => Some(
                AstNode::new(NodeKind::Media { media_type, url }, &caption)
                    .with_rich_text(ctx.rich_text.build(&caption)),
            ),
            None => {
                log::warn!("Media URL rejected, keeping line as text: {raw}");
                let text = vec![RichTextSegment::text(&raw, Annotations::default())];
                Some(AstNode::new(NodeKind::Paragraph, &raw).with_rich_text(text))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::test_support::parse_with;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("![Logo](https://a.io/logo.png)", MediaType::Image, "https://a.io/logo.png")]
    #[case("https://a.io/talk.mp4", MediaType::Video, "https://a.io/talk.mp4")]
    #[case("https://a.io/song.mp3", MediaType::Audio, "https://a.io/song.mp3")]
    #[case("https://a.io/paper.pdf", MediaType::Pdf, "https://a.io/paper.pdf")]
    #[case("https://www.youtube.com/watch?v=abc", MediaType::Video, "https://www.youtube.com/watch?v=abc")]
    fn media_kinds(#[case] input: &str, #[case] media_type: MediaType, #[case] url: &str) {
        let (node, _) = parse_with(&MediaParser, input);
        assert_eq!(
            node.unwrap().kind,
            NodeKind::Media {
                media_type,
                url: url.to_string()
            }
        );
    }

    #[test]
    fn image_caption_prefers_title() {
        let (node, _) = parse_with(&MediaParser, r#"![alt](https://a.io/x.png "The title")"#);
        assert_eq!(node.unwrap().content, "The title");
    }

    #[test]
    fn unsafe_url_becomes_paragraph() {
        let (node, _) = parse_with(&MediaParser, "![x](ftp://a.io/x.png)");
        let node = node.unwrap();
        assert_eq!(node.kind, NodeKind::Paragraph);
        assert_eq!(node.content, "![x](ftp://a.io/x.png)");
    }
}
