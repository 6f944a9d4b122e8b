//! Parser boundary.
//!
//! Parsing markdown is delegated to an external collaborator behind the
//! [`MarkdownParser`] trait, keeping the renderer independent of any
//! concrete markdown library. Closures with the right signature implement
//! the trait, which makes fakes trivial in tests. With the default
//! `pulldown` feature, [`PulldownParser`] adapts `pulldown-cmark`.

mod options;
#[cfg(feature = "pulldown")]
mod pulldown;

pub use options::ParserOptions;
#[cfg(feature = "pulldown")]
pub use pulldown::PulldownParser;

use crate::error::Result;
use crate::model::DocumentNode;

/// Abstract interface for turning raw markdown into a document tree.
pub trait MarkdownParser {
    /// Parse `text` into a tree rooted at a `document` node.
    ///
    /// A failure is non-fatal for callers: the renderer degrades it to a
    /// visible error marker.
    fn parse(&self, text: &str, options: &ParserOptions) -> Result<DocumentNode>;
}

impl<F> MarkdownParser for F
where
    F: Fn(&str, &ParserOptions) -> Result<DocumentNode>,
{
    fn parse(&self, text: &str, options: &ParserOptions) -> Result<DocumentNode> {
        self(text, options)
    }
}

/// Outcome of a successful parse, handed to `on_parse_complete` callbacks.
#[derive(Debug, Clone, Copy)]
pub struct ParseResult<'a> {
    /// The raw text that was parsed
    pub raw: &'a str,

    /// The parsed tree
    pub tree: &'a DocumentNode,

    /// Plain text of the tree with block boundaries as newlines
    pub flattened_text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_closure_parser() {
        let parser = |text: &str, _: &ParserOptions| -> Result<DocumentNode> {
            Ok(DocumentNode::document(vec![DocumentNode::paragraph(vec![
                DocumentNode::text(text),
            ])]))
        };

        let doc = parser.parse("hello", &ParserOptions::default()).unwrap();
        assert_eq!(doc.text_content(), "hello");
    }

    #[test]
    fn test_failing_parser() {
        let parser =
            |_: &str, _: &ParserOptions| -> Result<DocumentNode> { Err(Error::parse("boom")) };
        assert!(parser.parse("x", &ParserOptions::default()).is_err());
    }
}
