//! # markstream
//!
//! Render markdown into platform-neutral view trees, either in one shot or
//! continuously while the text streams in token by token.
//!
//! ## Quick Start
//!
//! ```
//! use markstream::{render_str, Role};
//!
//! let view = render_str("# Title\n\nSome **bold** text.");
//! assert!(view
//!     .find(&|n| n.role() == Some(&Role::Heading { level: 1 }))
//!     .is_some());
//! ```
//!
//! ## Streaming
//!
//! ```
//! use std::rc::Rc;
//! use std::time::Duration;
//! use markstream::{IntervalScheduler, Markdown, MarkdownSession, MarkdownStream, PulldownParser};
//!
//! let session = MarkdownSession::new();
//! let scheduler = Rc::new(IntervalScheduler::default());
//! let stream = MarkdownStream::new(&session, scheduler.clone(), Markdown::new(), PulldownParser::new());
//!
//! session.append("Hello, ");
//! session.append("world");
//! scheduler.advance(Duration::from_millis(50));
//!
//! assert_eq!(stream.revision(), 1);
//! assert_eq!(stream.view().plain_text(), "Hello, world");
//! ```
//!
//! ## Features
//!
//! - **Custom renderers**: override any node type, falling back to the
//!   default rendering by returning `None`
//! - **Themes**: dark, light and minimal presets with partial overrides
//! - **Coalesced streaming**: one re-render per flush window, whatever the
//!   chunk rate
//! - **Playback highlighting**: map audio time to a word position
//! - **Safe links**: scheme allow-list and an async press policy

pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod stream;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{DocumentNode, NodeKind, NodeType, Role, Style, TextAlign, ViewNode};
#[cfg(feature = "pulldown")]
pub use parser::PulldownParser;
pub use parser::{MarkdownParser, ParseResult, ParserOptions};
pub use render::{
    render_markdown, CustomRenderer, JsonFormat, LinkOpener, LinkOutcome, LinkVerdict, Markdown,
    PartialTheme, RenderContext, RendererProps, StylingStrategy, Theme,
};
pub use stream::{
    CoalescedUpdates, FlushScheduler, FrameScheduler, HighlightSync, ImmediateScheduler,
    IntervalScheduler, MarkdownSession, MarkdownStream, StreamUpdate, Subscription, Timeline,
    UpdatePriority,
};

/// Render markdown with the bundled parser and default settings.
///
/// # Example
///
/// ```
/// use markstream::render_str;
///
/// let view = render_str("plain text");
/// assert_eq!(view.plain_text(), "plain text");
/// ```
#[cfg(feature = "pulldown")]
pub fn render_str(text: &str) -> ViewNode {
    render_markdown(text, &PulldownParser::new())
}

/// Render markdown with the bundled parser and serialize the view tree.
///
/// # Example
///
/// ```
/// use markstream::{render_to_json, JsonFormat};
///
/// let json = render_to_json("*hi*", JsonFormat::Compact).unwrap();
/// assert!(json.contains("\"hi\""));
/// ```
#[cfg(feature = "pulldown")]
pub fn render_to_json(text: &str, format: JsonFormat) -> Result<String> {
    render::to_json(&render_str(text), format)
}

/// Render markdown with `parser` and serialize the view tree.
pub fn render_to_json_with(
    text: &str,
    parser: &dyn MarkdownParser,
    format: JsonFormat,
) -> Result<String> {
    render::to_json(&render_markdown(text, parser), format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_parser(_: &str, _: &ParserOptions) -> Result<DocumentNode> {
        Ok(DocumentNode::document(vec![DocumentNode::paragraph(vec![
            DocumentNode::text("fixed"),
        ])]))
    }

    #[test]
    fn test_render_to_json_with_custom_parser() {
        let json = render_to_json_with("ignored", &fixed_parser, JsonFormat::Compact).unwrap();
        assert!(json.contains("fixed"));
        assert!(!json.contains("ignored"));
    }

    #[test]
    fn test_render_to_json_with_failing_parser() {
        let failing = |_: &str, _: &ParserOptions| -> Result<DocumentNode> {
            Err(Error::parse("broken"))
        };
        let json = render_to_json_with("x", &failing, JsonFormat::Pretty).unwrap();
        assert!(json.contains(render::PARSE_ERROR_MESSAGE));
    }

    #[cfg(feature = "pulldown")]
    #[test]
    fn test_render_str_heading() {
        let view = render_str("## Sub");
        assert!(view
            .find(&|n| n.role() == Some(&Role::Heading { level: 2 }))
            .is_some());
        assert_eq!(view.plain_text(), "Sub");
    }
}
