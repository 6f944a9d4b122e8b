//! View tree produced by the renderer.

use serde::{Deserialize, Serialize};

use super::TextAlign;

/// A node of the rendered view tree.
///
/// `View` nodes are block containers, `Text` nodes are (possibly nested)
/// text spans. `Fragment` splices its children into the parent and `Empty`
/// renders nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewNode {
    /// Block container
    View {
        role: Role,
        #[serde(default, skip_serializing_if = "Style::is_empty")]
        style: Style,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<ViewNode>,
    },
    /// Text span with optional literal content and nested spans
    Text {
        role: Role,
        #[serde(default, skip_serializing_if = "Style::is_empty")]
        style: Style,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<ViewNode>,
    },
    /// Image
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Style::is_empty")]
        style: Style,
    },
    /// Math formula, laid out by the host
    Math {
        display: bool,
        content: String,
        #[serde(default, skip_serializing_if = "Style::is_empty")]
        style: Style,
    },
    /// Children without a wrapper
    Fragment { children: Vec<ViewNode> },
    /// Nothing
    Empty,
}

/// Semantic purpose of a view node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Outermost container of a render root
    Container,
    Document,
    Heading { level: u8 },
    Paragraph,
    /// Grouped run of adjacent inline nodes
    InlineRun,
    /// Row-flow run holding inline math
    MathRun,
    Span,
    Bold,
    Italic,
    Strikethrough,
    Link { href: String },
    CodeInline,
    CodeBlock { language: Option<String> },
    CodeLanguage,
    CodeText,
    Blockquote,
    HorizontalRule,
    LineBreak,
    SoftBreak,
    List { ordered: bool, depth: usize },
    ListItem,
    ListMarker,
    ListItemContent,
    TaskListItem { checked: bool },
    Checkbox,
    Table,
    TableHeader,
    TableRow { index: usize, even: bool },
    TableCell { column: usize, align: TextAlign, header: bool },
    /// Visible marker for a failed parse
    ErrorMarker,
    /// Produced by a custom renderer
    Custom(String),
}

impl ViewNode {
    /// Create a block container.
    pub fn view(role: Role, style: Style, children: Vec<ViewNode>) -> Self {
        ViewNode::View {
            role,
            style,
            children,
        }
    }

    /// Create a text span with literal content.
    pub fn text(role: Role, style: Style, content: impl Into<String>) -> Self {
        ViewNode::Text {
            role,
            style,
            content: Some(content.into()),
            children: Vec::new(),
        }
    }

    /// Create a text span wrapping nested spans.
    pub fn span(role: Role, style: Style, children: Vec<ViewNode>) -> Self {
        ViewNode::Text {
            role,
            style,
            content: None,
            children,
        }
    }

    /// The role of this node, if it has one.
    pub fn role(&self) -> Option<&Role> {
        match self {
            ViewNode::View { role, .. } | ViewNode::Text { role, .. } => Some(role),
            _ => None,
        }
    }

    /// The style of this node, if it has one.
    pub fn style(&self) -> Option<&Style> {
        match self {
            ViewNode::View { style, .. }
            | ViewNode::Text { style, .. }
            | ViewNode::Image { style, .. }
            | ViewNode::Math { style, .. } => Some(style),
            _ => None,
        }
    }

    /// Child nodes (empty for leaves).
    pub fn children(&self) -> &[ViewNode] {
        match self {
            ViewNode::View { children, .. }
            | ViewNode::Text { children, .. }
            | ViewNode::Fragment { children } => children,
            _ => &[],
        }
    }

    /// Check if this node renders nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, ViewNode::Empty)
    }

    /// Concatenated text of this subtree as it would be displayed.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ViewNode::Text { content, .. } => {
                if let Some(content) = content {
                    out.push_str(content);
                }
            }
            ViewNode::Math { content, .. } => out.push_str(content),
            ViewNode::Image { alt, .. } => out.push_str(alt.as_deref().unwrap_or_default()),
            _ => {}
        }
        for child in self.children() {
            child.collect_text(out);
        }
    }

    /// Depth-first search for the first node matching `predicate`.
    pub fn find(&self, predicate: &dyn Fn(&ViewNode) -> bool) -> Option<&ViewNode> {
        if predicate(self) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(predicate))
    }

    /// Count nodes in this subtree matching `predicate`.
    pub fn count(&self, predicate: &dyn Fn(&ViewNode) -> bool) -> usize {
        let own = usize::from(predicate(self));
        own + self
            .children()
            .iter()
            .map(|child| child.count(predicate))
            .sum::<usize>()
    }
}

/// Font weight token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    SemiBold,
    Bold,
}

/// Text decoration token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDecoration {
    Underline,
    LineThrough,
}

/// Main-axis direction of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexDirection {
    Row,
    Column,
}

/// Cross-axis alignment of a container's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignItems {
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

macro_rules! style_props {
    ($($(#[$meta:meta])* $field:ident: $ty:ty),+ $(,)?) => {
        /// Sparse set of style tokens.
        ///
        /// Unset properties inherit from the host; [`Style::merged`] layers
        /// one style over another property by property.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct Style {
            $(
                $(#[$meta])*
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )+
        }

        impl Style {
            /// Layer `overrides` on top of `self`; set properties win.
            pub fn merged(&self, overrides: &Style) -> Style {
                Style {
                    $($field: overrides.$field.clone().or_else(|| self.$field.clone()),)+
                }
            }

            /// Check if no property is set.
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())+
            }
        }
    };
}

style_props! {
    color: String,
    background_color: String,
    font_size: f32,
    line_height: f32,
    font_family: String,
    font_weight: FontWeight,
    /// Italic when true
    italic: bool,
    text_decoration: TextDecoration,
    text_align: TextAlign,
    letter_spacing: f32,
    margin_top: f32,
    margin_bottom: f32,
    margin_left: f32,
    margin_right: f32,
    padding_vertical: f32,
    padding_horizontal: f32,
    border_width: f32,
    border_color: String,
    border_left_width: f32,
    border_left_color: String,
    border_bottom_width: f32,
    border_radius: f32,
    height: f32,
    min_width: f32,
    flex: f32,
    flex_direction: FlexDirection,
    flex_wrap: bool,
    align_items: AlignItems,
}

impl Style {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an optional override.
    pub fn with_override(&self, overrides: Option<&Style>) -> Style {
        match overrides {
            Some(overrides) => self.merged(overrides),
            None => self.clone(),
        }
    }

    /// Style of a wrapping row-flow container.
    pub fn row_flow() -> Self {
        Style {
            flex_direction: Some(FlexDirection::Row),
            flex_wrap: Some(true),
            align_items: Some(AlignItems::Center),
            ..Style::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_merge_overrides_win() {
        let base = Style {
            color: Some("#fff".into()),
            font_size: Some(16.0),
            ..Style::default()
        };
        let overrides = Style {
            color: Some("red".into()),
            ..Style::default()
        };

        let merged = base.merged(&overrides);
        assert_eq!(merged.color.as_deref(), Some("red"));
        assert_eq!(merged.font_size, Some(16.0));
        assert_eq!(base.with_override(None), base);
    }

    #[test]
    fn test_style_is_empty() {
        assert!(Style::new().is_empty());
        assert!(!Style::row_flow().is_empty());
    }

    #[test]
    fn test_plain_text_and_search() {
        let view = ViewNode::view(
            Role::Paragraph,
            Style::new(),
            vec![ViewNode::span(
                Role::InlineRun,
                Style::new(),
                vec![
                    ViewNode::text(Role::Span, Style::new(), "a"),
                    ViewNode::text(Role::Bold, Style::new(), "b"),
                ],
            )],
        );

        assert_eq!(view.plain_text(), "ab");
        assert!(view
            .find(&|n| n.role() == Some(&Role::Bold))
            .is_some());
        assert_eq!(view.count(&|n| matches!(n, ViewNode::Text { .. })), 3);
    }

    #[test]
    fn test_view_serialization_skips_empty_fields() {
        let view = ViewNode::view(Role::HorizontalRule, Style::new(), vec![]);
        let json = serde_json::to_string(&view).unwrap();
        assert_eq!(json, r#"{"kind":"view","role":"horizontal_rule"}"#);
    }
}
