//! Document tree produced by a markdown parser.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A node of a parsed markdown document.
///
/// Nodes form a strict tree: each node exclusively owns its children and
/// holds no reference to its parent. A tree is never mutated after the
/// parser hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Node type together with its type-dependent attributes
    #[serde(flatten)]
    pub kind: NodeKind,

    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentNode>,
}

/// Node type and attributes.
///
/// Serialized with a snake_case `type` tag, matching the JSON trees emitted
/// by native markdown parsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a document
    Document,
    /// Heading, level 1-6
    Heading {
        #[serde(default = "default_level")]
        level: u8,
    },
    /// Paragraph of inline content
    Paragraph,
    /// Plain text
    Text {
        #[serde(default)]
        content: String,
    },
    /// Strong emphasis
    Bold,
    /// Emphasis
    Italic,
    /// Struck-through text
    Strikethrough,
    /// Hyperlink
    Link {
        #[serde(default)]
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// Image; `href` holds the source URL
    Image {
        #[serde(default)]
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// Inline code span
    CodeInline {
        #[serde(default)]
        content: String,
    },
    /// Fenced or indented code block
    CodeBlock {
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    /// Block quote
    Blockquote,
    /// Thematic break
    HorizontalRule,
    /// Hard line break
    LineBreak,
    /// Soft line break
    SoftBreak,
    /// Inline math (`$...$`)
    MathInline {
        #[serde(default)]
        content: String,
    },
    /// Display math (`$$...$$`)
    MathBlock {
        #[serde(default)]
        content: String,
    },
    /// Ordered or bullet list
    List {
        #[serde(default)]
        ordered: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
    },
    /// List item
    ListItem,
    /// GFM task list item
    TaskListItem {
        #[serde(default)]
        checked: bool,
    },
    /// GFM table
    Table,
    /// Table header section
    TableHead,
    /// Table body section
    TableBody,
    /// Table row
    TableRow,
    /// Table cell
    TableCell {
        #[serde(default)]
        align: TextAlign,
    },
    /// Raw inline HTML
    HtmlInline {
        #[serde(default)]
        content: String,
    },
}

fn default_level() -> u8 {
    1
}

/// Fieldless discriminant of [`NodeKind`], used as a registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Document,
    Heading,
    Paragraph,
    Text,
    Bold,
    Italic,
    Strikethrough,
    Link,
    Image,
    CodeInline,
    CodeBlock,
    Blockquote,
    HorizontalRule,
    LineBreak,
    SoftBreak,
    MathInline,
    MathBlock,
    List,
    ListItem,
    TaskListItem,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell,
    HtmlInline,
}

impl NodeType {
    /// Returns true if nodes of this type flow inline with surrounding text.
    pub const fn is_inline(self) -> bool {
        matches!(
            self,
            NodeType::Text
                | NodeType::Bold
                | NodeType::Italic
                | NodeType::Strikethrough
                | NodeType::Link
                | NodeType::CodeInline
                | NodeType::SoftBreak
                | NodeType::LineBreak
                | NodeType::HtmlInline
                | NodeType::MathInline
        )
    }

    /// The snake_case wire name of this type.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeType::Document => "document",
            NodeType::Heading => "heading",
            NodeType::Paragraph => "paragraph",
            NodeType::Text => "text",
            NodeType::Bold => "bold",
            NodeType::Italic => "italic",
            NodeType::Strikethrough => "strikethrough",
            NodeType::Link => "link",
            NodeType::Image => "image",
            NodeType::CodeInline => "code_inline",
            NodeType::CodeBlock => "code_block",
            NodeType::Blockquote => "blockquote",
            NodeType::HorizontalRule => "horizontal_rule",
            NodeType::LineBreak => "line_break",
            NodeType::SoftBreak => "soft_break",
            NodeType::MathInline => "math_inline",
            NodeType::MathBlock => "math_block",
            NodeType::List => "list",
            NodeType::ListItem => "list_item",
            NodeType::TaskListItem => "task_list_item",
            NodeType::Table => "table",
            NodeType::TableHead => "table_head",
            NodeType::TableBody => "table_body",
            NodeType::TableRow => "table_row",
            NodeType::TableCell => "table_cell",
            NodeType::HtmlInline => "html_inline",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// No explicit alignment
    #[default]
    Default,
    Left,
    Center,
    Right,
}

impl NodeKind {
    /// The discriminant of this kind.
    pub const fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Document => NodeType::Document,
            NodeKind::Heading { .. } => NodeType::Heading,
            NodeKind::Paragraph => NodeType::Paragraph,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Bold => NodeType::Bold,
            NodeKind::Italic => NodeType::Italic,
            NodeKind::Strikethrough => NodeType::Strikethrough,
            NodeKind::Link { .. } => NodeType::Link,
            NodeKind::Image { .. } => NodeType::Image,
            NodeKind::CodeInline { .. } => NodeType::CodeInline,
            NodeKind::CodeBlock { .. } => NodeType::CodeBlock,
            NodeKind::Blockquote => NodeType::Blockquote,
            NodeKind::HorizontalRule => NodeType::HorizontalRule,
            NodeKind::LineBreak => NodeType::LineBreak,
            NodeKind::SoftBreak => NodeType::SoftBreak,
            NodeKind::MathInline { .. } => NodeType::MathInline,
            NodeKind::MathBlock { .. } => NodeType::MathBlock,
            NodeKind::List { .. } => NodeType::List,
            NodeKind::ListItem => NodeType::ListItem,
            NodeKind::TaskListItem { .. } => NodeType::TaskListItem,
            NodeKind::Table => NodeType::Table,
            NodeKind::TableHead => NodeType::TableHead,
            NodeKind::TableBody => NodeType::TableBody,
            NodeKind::TableRow => NodeType::TableRow,
            NodeKind::TableCell { .. } => NodeType::TableCell,
            NodeKind::HtmlInline { .. } => NodeType::HtmlInline,
        }
    }

    /// Literal content carried by the node itself, if its type has any.
    pub fn content(&self) -> Option<&str> {
        match self {
            NodeKind::Text { content }
            | NodeKind::CodeInline { content }
            | NodeKind::CodeBlock { content, .. }
            | NodeKind::MathInline { content }
            | NodeKind::MathBlock { content }
            | NodeKind::HtmlInline { content } => Some(content),
            _ => None,
        }
    }

    fn ends_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Heading { .. }
                | NodeKind::Paragraph
                | NodeKind::CodeBlock { .. }
                | NodeKind::MathBlock { .. }
                | NodeKind::HorizontalRule
                | NodeKind::ListItem
                | NodeKind::TaskListItem { .. }
                | NodeKind::TableRow
        )
    }
}

impl DocumentNode {
    /// Create a leaf node.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    /// Create a node with children.
    pub fn with_children(kind: NodeKind, children: Vec<DocumentNode>) -> Self {
        Self { kind, children }
    }

    /// Create a document root.
    pub fn document(children: Vec<DocumentNode>) -> Self {
        Self::with_children(NodeKind::Document, children)
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            content: content.into(),
        })
    }

    /// Create a paragraph.
    pub fn paragraph(children: Vec<DocumentNode>) -> Self {
        Self::with_children(NodeKind::Paragraph, children)
    }

    /// Create a heading; the level is clamped to 1-6.
    pub fn heading(level: u8, children: Vec<DocumentNode>) -> Self {
        Self::with_children(
            NodeKind::Heading {
                level: level.clamp(1, 6),
            },
            children,
        )
    }

    /// Create a bold span.
    pub fn bold(children: Vec<DocumentNode>) -> Self {
        Self::with_children(NodeKind::Bold, children)
    }

    /// Create an italic span.
    pub fn italic(children: Vec<DocumentNode>) -> Self {
        Self::with_children(NodeKind::Italic, children)
    }

    /// Create a link.
    pub fn link(href: impl Into<String>, children: Vec<DocumentNode>) -> Self {
        Self::with_children(
            NodeKind::Link {
                href: href.into(),
                title: None,
            },
            children,
        )
    }

    /// Create an inline math node.
    pub fn math_inline(content: impl Into<String>) -> Self {
        Self::new(NodeKind::MathInline {
            content: content.into(),
        })
    }

    /// Create a code block.
    pub fn code_block(content: impl Into<String>, language: Option<&str>) -> Self {
        Self::new(NodeKind::CodeBlock {
            content: content.into(),
            language: language.map(str::to_string),
        })
    }

    /// Create a list.
    pub fn list(ordered: bool, start: Option<u64>, items: Vec<DocumentNode>) -> Self {
        Self::with_children(NodeKind::List { ordered, start }, items)
    }

    /// Create a list item.
    pub fn list_item(children: Vec<DocumentNode>) -> Self {
        Self::with_children(NodeKind::ListItem, children)
    }

    /// Create a task list item.
    pub fn task_list_item(checked: bool, children: Vec<DocumentNode>) -> Self {
        Self::with_children(NodeKind::TaskListItem { checked }, children)
    }

    /// Load a tree from the JSON emitted by a native parser.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The discriminant of this node.
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Check if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The node's own content, or the concatenated text of its children.
    pub fn text_content(&self) -> String {
        match self.kind.content() {
            Some(content) if !content.is_empty() || self.children.is_empty() => {
                content.to_string()
            }
            _ => self.children.iter().map(DocumentNode::text_content).collect(),
        }
    }

    /// Plain text of the whole subtree with block boundaries as newlines.
    pub fn flattened_text(&self) -> String {
        let mut out = String::new();
        self.collect_flattened(&mut out);
        out.lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    fn collect_flattened(&self, out: &mut String) {
        match &self.kind {
            NodeKind::SoftBreak => out.push(' '),
            NodeKind::LineBreak => out.push('\n'),
            NodeKind::Image { alt, .. } => out.push_str(alt.as_deref().unwrap_or_default()),
            kind if kind.content().is_some() => out.push_str(&self.text_content()),
            _ => {
                for child in &self.children {
                    child.collect_flattened(out);
                }
            }
        }

        if matches!(self.kind, NodeKind::TableCell { .. }) {
            out.push(' ');
        }
        if self.kind.ends_block() && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_inline_classification() {
        assert!(NodeType::Text.is_inline());
        assert!(NodeType::MathInline.is_inline());
        assert!(NodeType::HtmlInline.is_inline());
        assert!(!NodeType::Paragraph.is_inline());
        assert!(!NodeType::Image.is_inline());
        assert!(!NodeType::MathBlock.is_inline());
    }

    #[test]
    fn test_from_json_wire_format() {
        let json = r#"{
            "type": "document",
            "children": [
                {"type": "heading", "level": 2, "children": [{"type": "text", "content": "Title"}]},
                {"type": "list", "ordered": true, "start": 3, "children": [
                    {"type": "task_list_item", "checked": true}
                ]},
                {"type": "horizontal_rule"}
            ]
        }"#;

        let doc = DocumentNode::from_json(json).unwrap();
        assert_eq!(doc.node_type(), NodeType::Document);
        assert_eq!(doc.children.len(), 3);
        assert_eq!(doc.children[0].kind, NodeKind::Heading { level: 2 });
        assert_eq!(
            doc.children[1].kind,
            NodeKind::List {
                ordered: true,
                start: Some(3)
            }
        );
        assert_eq!(
            doc.children[1].children[0].kind,
            NodeKind::TaskListItem { checked: true }
        );
        assert!(doc.children[2].is_leaf());
    }

    #[test]
    fn test_serialize_uses_type_tag() {
        let node = DocumentNode::paragraph(vec![DocumentNode::text("hi")]);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "paragraph");
        assert_eq!(value["children"][0]["type"], "text");
        assert_eq!(value["children"][0]["content"], "hi");
    }

    #[test]
    fn test_text_content_falls_back_to_children() {
        let code = DocumentNode::with_children(
            NodeKind::CodeBlock {
                content: String::new(),
                language: None,
            },
            vec![DocumentNode::text("fn main() {}")],
        );
        assert_eq!(code.text_content(), "fn main() {}");

        let para = DocumentNode::paragraph(vec![
            DocumentNode::text("a"),
            DocumentNode::bold(vec![DocumentNode::text("b")]),
        ]);
        assert_eq!(para.text_content(), "ab");
    }

    #[test]
    fn test_flattened_text_separates_blocks() {
        let doc = DocumentNode::document(vec![
            DocumentNode::heading(1, vec![DocumentNode::text("Title")]),
            DocumentNode::paragraph(vec![
                DocumentNode::text("one"),
                DocumentNode::new(NodeKind::SoftBreak),
                DocumentNode::text("two"),
            ]),
            DocumentNode::list(
                false,
                None,
                vec![
                    DocumentNode::list_item(vec![DocumentNode::text("x")]),
                    DocumentNode::list_item(vec![DocumentNode::text("y")]),
                ],
            ),
        ]);

        assert_eq!(doc.flattened_text(), "Title\none two\nx\ny");
    }

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(
            DocumentNode::heading(9, vec![]).kind,
            NodeKind::Heading { level: 6 }
        );
    }
}
