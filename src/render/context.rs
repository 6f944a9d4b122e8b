//! Render context and the custom renderer registry.
//!
//! A [`RenderContext`] bundles everything a render pass reads: the resolved
//! theme, per-type style overrides, custom renderers, the styling strategy
//! and the link-press handler. It is built once per configuration change
//! and borrowed read-only by the [`NodeRenderer`] during a pass.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::link::{self, LinkOpener, LinkOutcome, LinkPressHandler};
use super::node::NodeRenderer;
use super::theme::{PartialTheme, StylingStrategy, Theme};
use crate::model::{DocumentNode, NodeKind, NodeType, Style, ViewNode};

/// Per-type style overrides, merged last over the default style.
pub type StyleOverrides = HashMap<NodeType, Style>;

/// Replaces the default rendering of one node type.
///
/// Returning `None` falls through to the default rendering.
pub type CustomRenderer = Arc<dyn Fn(RendererProps<'_>) -> Option<ViewNode> + Send + Sync>;

/// Type-specific attributes projected out of a node for custom renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeExtras<'a> {
    /// The node type has no projected attributes
    #[default]
    None,
    Heading {
        level: u8,
    },
    Link {
        href: &'a str,
        title: Option<&'a str>,
    },
    Image {
        url: &'a str,
        alt: Option<&'a str>,
        title: Option<&'a str>,
    },
    CodeBlock {
        content: &'a str,
        language: Option<&'a str>,
    },
    CodeInline {
        content: &'a str,
    },
    List {
        ordered: bool,
        start: u64,
    },
    TaskListItem {
        checked: bool,
    },
}

impl<'a> NodeExtras<'a> {
    /// Project the attributes of `node`.
    pub fn from_node(node: &'a DocumentNode) -> Self {
        match &node.kind {
            NodeKind::Heading { level } => NodeExtras::Heading {
                level: (*level).clamp(1, 6),
            },
            NodeKind::Link { href, title } => NodeExtras::Link {
                href,
                title: title.as_deref(),
            },
            NodeKind::Image { href, alt, title } => NodeExtras::Image {
                url: href,
                alt: alt.as_deref(),
                title: title.as_deref(),
            },
            NodeKind::CodeBlock { content, language } => NodeExtras::CodeBlock {
                content,
                language: language.as_deref(),
            },
            NodeKind::CodeInline { content } => NodeExtras::CodeInline { content },
            NodeKind::List { ordered, start } => NodeExtras::List {
                ordered: *ordered,
                start: start.unwrap_or(1),
            },
            NodeKind::TaskListItem { checked } => NodeExtras::TaskListItem { checked: *checked },
            _ => NodeExtras::None,
        }
    }
}

/// Input of a [`CustomRenderer`].
pub struct RendererProps<'a> {
    /// The node being rendered
    pub node: &'a DocumentNode,

    /// The node's children, already rendered with default semantics
    pub children: Vec<ViewNode>,

    /// Handle for rendering arbitrary subtrees re-entrantly
    pub renderer: &'a NodeRenderer<'a>,

    /// Type-specific attributes of `node`
    pub extras: NodeExtras<'a>,

    pub depth: usize,
    pub in_list_item: bool,
    pub parent_is_text: bool,
}

impl fmt::Debug for RendererProps<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererProps")
            .field("node", &self.node.node_type())
            .field("children", &self.children.len())
            .field("extras", &self.extras)
            .field("depth", &self.depth)
            .field("in_list_item", &self.in_list_item)
            .field("parent_is_text", &self.parent_is_text)
            .finish()
    }
}

/// Registry of custom renderers keyed by node type.
#[derive(Clone, Default)]
pub struct CustomRenderers {
    renderers: HashMap<NodeType, CustomRenderer>,
}

impl CustomRenderers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `renderer` for `node_type`, replacing any previous one.
    pub fn insert<F>(&mut self, node_type: NodeType, renderer: F)
    where
        F: Fn(RendererProps<'_>) -> Option<ViewNode> + Send + Sync + 'static,
    {
        self.renderers.insert(node_type, Arc::new(renderer));
    }

    /// Remove the renderer for `node_type`.
    pub fn remove(&mut self, node_type: NodeType) -> Option<CustomRenderer> {
        self.renderers.remove(&node_type)
    }

    /// The renderer registered for `node_type`.
    pub fn get(&self, node_type: NodeType) -> Option<&CustomRenderer> {
        self.renderers.get(&node_type)
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl fmt::Debug for CustomRenderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.renderers.keys().collect();
        types.sort();
        f.debug_set().entries(types).finish()
    }
}

/// Everything a render pass reads.
#[derive(Clone, Default)]
pub struct RenderContext {
    /// Fully resolved theme
    pub theme: Theme,

    /// Per-type style overrides
    pub styles: StyleOverrides,

    /// Custom renderers
    pub renderers: CustomRenderers,

    /// Styling strategy the theme was resolved with
    pub styling_strategy: StylingStrategy,

    /// Consulted before a link is opened
    pub on_link_press: Option<LinkPressHandler>,
}

impl RenderContext {
    /// Create a context with the default theme and strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the theme for `strategy`, with an optional partial override.
    pub fn resolve(strategy: StylingStrategy, theme: Option<&PartialTheme>) -> Self {
        let base = strategy.base_theme();
        Self {
            theme: theme.map_or_else(|| base.clone(), |partial| base.merged(partial)),
            styling_strategy: strategy,
            ..Self::default()
        }
    }

    /// Set the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the style override for a node type.
    pub fn with_style(mut self, node_type: NodeType, style: Style) -> Self {
        self.styles.insert(node_type, style);
        self
    }

    /// Register a custom renderer.
    pub fn with_renderer<F>(mut self, node_type: NodeType, renderer: F) -> Self
    where
        F: Fn(RendererProps<'_>) -> Option<ViewNode> + Send + Sync + 'static,
    {
        self.renderers.insert(node_type, renderer);
        self
    }

    /// Set the link-press handler.
    pub fn with_link_handler(mut self, handler: LinkPressHandler) -> Self {
        self.on_link_press = Some(handler);
        self
    }

    /// Style override for `node_type`, if any.
    pub fn style_for(&self, node_type: NodeType) -> Option<&Style> {
        self.styles.get(&node_type)
    }

    /// Press a link rendered with this context.
    pub async fn press_link(&self, href: &str, opener: &dyn LinkOpener) -> LinkOutcome {
        link::press_link(href, self.on_link_press.as_ref(), opener).await
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("theme", &self.theme)
            .field("styles", &self.styles)
            .field("renderers", &self.renderers)
            .field("styling_strategy", &self.styling_strategy)
            .field("on_link_press", &self.on_link_press.is_some())
            .finish()
    }
}
