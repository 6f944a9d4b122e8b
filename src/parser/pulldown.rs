//! Markdown parsing using pulldown-cmark.
//!
//! pulldown-cmark emits a flat event stream; this adapter folds it into a
//! [`DocumentNode`] tree with a stack of open nodes. Tags that have no
//! counterpart in the document model are transparent: their children are
//! spliced into the enclosing node.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use super::{MarkdownParser, ParserOptions};
use crate::error::Result;
use crate::model::{DocumentNode, NodeKind, TextAlign};

/// [`MarkdownParser`] backed by pulldown-cmark.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulldownParser;

impl PulldownParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    fn extensions(options: &ParserOptions) -> Options {
        let mut extensions = Options::empty();
        if options.gfm {
            extensions |=
                Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        }
        if options.math {
            extensions |= Options::ENABLE_MATH;
        }
        extensions
    }
}

impl MarkdownParser for PulldownParser {
    fn parse(&self, text: &str, options: &ParserOptions) -> Result<DocumentNode> {
        let mut builder = TreeBuilder::new();
        for event in Parser::new_ext(text, Self::extensions(options)) {
            builder.event(event);
        }
        Ok(builder.finish())
    }
}

struct Frame {
    node: DocumentNode,
    transparent: bool,
}

struct TreeBuilder {
    stack: Vec<Frame>,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame {
                node: DocumentNode::new(NodeKind::Document),
                transparent: false,
            }],
            alignments: Vec::new(),
            cell_index: 0,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.leaf(NodeKind::Text {
                content: text.to_string(),
            }),
            Event::Code(code) => self.leaf(NodeKind::CodeInline {
                content: code.to_string(),
            }),
            Event::InlineMath(math) => self.leaf(NodeKind::MathInline {
                content: math.to_string(),
            }),
            Event::DisplayMath(math) => self.leaf(NodeKind::MathBlock {
                content: math.to_string(),
            }),
            Event::Html(html) | Event::InlineHtml(html) => self.leaf(NodeKind::HtmlInline {
                content: html.to_string(),
            }),
            Event::FootnoteReference(name) => self.leaf(NodeKind::Text {
                content: format!("[^{}]", name),
            }),
            Event::SoftBreak => self.leaf(NodeKind::SoftBreak),
            Event::HardBreak => self.leaf(NodeKind::LineBreak),
            Event::Rule => self.leaf(NodeKind::HorizontalRule),
            Event::TaskListMarker(checked) => self.mark_task(checked),
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => NodeKind::Heading { level: level as u8 },
            Tag::BlockQuote(_) => NodeKind::Blockquote,
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                NodeKind::CodeBlock {
                    content: String::new(),
                    language,
                }
            }
            Tag::List(start) => NodeKind::List {
                ordered: start.is_some(),
                start,
            },
            Tag::Item => NodeKind::ListItem,
            Tag::Table(alignments) => {
                self.alignments = alignments;
                NodeKind::Table
            }
            Tag::TableHead => {
                // Header cells arrive without a row; synthesize one.
                self.open(NodeKind::TableHead, false);
                self.cell_index = 0;
                NodeKind::TableRow
            }
            Tag::TableRow => {
                if self.top_is(|kind| matches!(kind, NodeKind::Table)) {
                    self.open(NodeKind::TableBody, false);
                }
                self.cell_index = 0;
                NodeKind::TableRow
            }
            Tag::TableCell => {
                let align = match self.alignments.get(self.cell_index) {
                    Some(Alignment::Left) => TextAlign::Left,
                    Some(Alignment::Center) => TextAlign::Center,
                    Some(Alignment::Right) => TextAlign::Right,
                    _ => TextAlign::Default,
                };
                self.cell_index += 1;
                NodeKind::TableCell { align }
            }
            Tag::Emphasis => NodeKind::Italic,
            Tag::Strong => NodeKind::Bold,
            Tag::Strikethrough => NodeKind::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => NodeKind::Link {
                href: dest_url.to_string(),
                title: non_empty(&title),
            },
            Tag::Image {
                dest_url, title, ..
            } => NodeKind::Image {
                href: dest_url.to_string(),
                alt: None,
                title: non_empty(&title),
            },
            _ => {
                self.open(NodeKind::Document, true);
                return;
            }
        };
        self.open(kind, false);
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::TableHead => {
                self.close();
                self.close();
            }
            TagEnd::Table => {
                if self.top_is(|kind| matches!(kind, NodeKind::TableBody)) {
                    self.close();
                }
                self.close();
                self.alignments.clear();
            }
            _ => self.close(),
        }
    }

    fn open(&mut self, kind: NodeKind, transparent: bool) {
        self.stack.push(Frame {
            node: DocumentNode::new(kind),
            transparent,
        });
    }

    fn close(&mut self) {
        if self.stack.len() < 2 {
            log::warn!("Unbalanced end event from markdown parser");
            return;
        }
        let Some(Frame {
            mut node,
            transparent,
        }) = self.stack.pop()
        else {
            return;
        };

        match &mut node.kind {
            NodeKind::Image { alt, .. } => {
                let text = node.children.iter().map(DocumentNode::text_content).collect::<String>();
                *alt = (!text.is_empty()).then_some(text);
                node.children.clear();
            }
            NodeKind::CodeBlock { content, .. } => {
                let text = node.children.iter().map(DocumentNode::text_content).collect::<String>();
                *content = text.trim_end_matches('\n').to_string();
                node.children.clear();
            }
            _ => {}
        }

        if let Some(parent) = self.stack.last_mut() {
            if transparent {
                parent.node.children.extend(node.children);
            } else {
                parent.node.children.push(node);
            }
        }
    }

    fn leaf(&mut self, kind: NodeKind) {
        if let Some(top) = self.stack.last_mut() {
            top.node.children.push(DocumentNode::new(kind));
        }
    }

    fn mark_task(&mut self, checked: bool) {
        let item = self
            .stack
            .iter_mut()
            .rev()
            .find(|frame| matches!(frame.node.kind, NodeKind::ListItem));
        if let Some(frame) = item {
            frame.node.kind = NodeKind::TaskListItem { checked };
        }
    }

    fn top_is(&self, predicate: impl Fn(&NodeKind) -> bool) -> bool {
        self.stack
            .last()
            .is_some_and(|frame| predicate(&frame.node.kind))
    }

    fn finish(mut self) -> DocumentNode {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .map(|frame| frame.node)
            .unwrap_or_else(|| DocumentNode::new(NodeKind::Document))
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
