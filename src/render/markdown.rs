//! One-shot markdown rendering entry point.

use std::fmt;
use std::sync::Arc;

use super::context::{CustomRenderers, RenderContext, RendererProps, StyleOverrides};
use super::link::{LinkOpener, LinkOutcome, LinkPressHandler};
use super::node::NodeRenderer;
use super::theme::{PartialTheme, StylingStrategy};
use crate::error::Result;
use crate::model::{DocumentNode, NodeType, Style, ViewNode};
use crate::parser::{MarkdownParser, ParseResult, ParserOptions};

type ParsingCallback = Arc<dyn Fn() + Send + Sync>;
type ParseCompleteCallback = Arc<dyn Fn(ParseResult<'_>) + Send + Sync>;

/// Parse markdown text with `parser` and render it with the default context.
pub fn render_markdown(text: &str, parser: &dyn MarkdownParser) -> ViewNode {
    Markdown::new().render(text, parser)
}

/// Configurable markdown renderer.
///
/// Holds the parser options, theme override, styling strategy, per-type
/// styles, custom renderers and callbacks. The [`RenderContext`] derived
/// from them is rebuilt whenever one of them changes, so repeated renders
/// share it.
///
/// # Example
///
/// ```
/// use markstream::render::Markdown;
/// use markstream::model::{NodeType, Role, Style, ViewNode};
/// use markstream::PulldownParser;
///
/// let markdown = Markdown::new().with_renderer(NodeType::HorizontalRule, |_| {
///     Some(ViewNode::view(Role::Custom("divider".into()), Style::new(), vec![]))
/// });
///
/// let view = markdown.render("one\n\n---\n\ntwo", &PulldownParser::new());
/// assert!(view.find(&|n| n.role() == Some(&Role::Custom("divider".into()))).is_some());
/// ```
#[derive(Clone, Default)]
pub struct Markdown {
    options: ParserOptions,
    theme: Option<PartialTheme>,
    styling_strategy: StylingStrategy,
    styles: StyleOverrides,
    renderers: CustomRenderers,
    on_link_press: Option<LinkPressHandler>,
    on_parsing_in_progress: Option<ParsingCallback>,
    on_parse_complete: Option<ParseCompleteCallback>,
    context: RenderContext,
}

impl Markdown {
    /// Create a renderer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parser options.
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a custom renderer for a node type.
    pub fn with_renderer<F>(mut self, node_type: NodeType, renderer: F) -> Self
    where
        F: Fn(RendererProps<'_>) -> Option<ViewNode> + Send + Sync + 'static,
    {
        self.renderers.insert(node_type, renderer);
        self.rebuild()
    }

    /// Override theme tokens.
    pub fn with_theme(mut self, theme: PartialTheme) -> Self {
        self.theme = Some(theme);
        self.rebuild()
    }

    /// Override the style of a node type.
    pub fn with_style(mut self, node_type: NodeType, style: Style) -> Self {
        self.styles.insert(node_type, style);
        self.rebuild()
    }

    /// Set the styling strategy.
    pub fn with_styling_strategy(mut self, strategy: StylingStrategy) -> Self {
        self.styling_strategy = strategy;
        self.rebuild()
    }

    /// Called right before the text is handed to the parser.
    pub fn on_parsing_in_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_parsing_in_progress = Some(Arc::new(callback));
        self
    }

    /// Called after a successful parse.
    pub fn on_parse_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(ParseResult<'_>) + Send + Sync + 'static,
    {
        self.on_parse_complete = Some(Arc::new(callback));
        self
    }

    /// Consulted before a pressed link is opened.
    pub fn on_link_press(mut self, handler: LinkPressHandler) -> Self {
        self.on_link_press = Some(handler);
        self.rebuild()
    }

    fn rebuild(mut self) -> Self {
        let mut context = RenderContext::resolve(self.styling_strategy, self.theme.as_ref());
        context.styles = self.styles.clone();
        context.renderers = self.renderers.clone();
        context.on_link_press = self.on_link_press.clone();
        self.context = context;
        self
    }

    /// Parser options in effect.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// The render context derived from the current configuration.
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Parse `text`, firing the lifecycle callbacks.
    pub fn parse(&self, text: &str, parser: &dyn MarkdownParser) -> Result<DocumentNode> {
        if let Some(callback) = &self.on_parsing_in_progress {
            callback();
        }

        let tree = parser.parse(text, &self.options)?;

        if let Some(callback) = &self.on_parse_complete {
            let flattened_text = tree.flattened_text();
            callback(ParseResult {
                raw: text,
                tree: &tree,
                flattened_text: &flattened_text,
            });
        }
        Ok(tree)
    }

    /// Parse and render `text`.
    ///
    /// A parse failure is logged and rendered as a visible error marker.
    pub fn render(&self, text: &str, parser: &dyn MarkdownParser) -> ViewNode {
        match self.parse(text, parser) {
            Ok(tree) => self.render_tree(&tree),
            Err(e) => {
                log::error!("Failed to parse markdown: {}", e);
                NodeRenderer::new(&self.context).render_error()
            }
        }
    }

    /// Render an already parsed tree.
    pub fn render_tree(&self, tree: &DocumentNode) -> ViewNode {
        NodeRenderer::new(&self.context).render_root(tree)
    }

    /// Press a link rendered by this renderer.
    pub async fn press_link(&self, href: &str, opener: &dyn LinkOpener) -> LinkOutcome {
        self.context.press_link(href, opener).await
    }
}

impl fmt::Debug for Markdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Markdown")
            .field("options", &self.options)
            .field("theme", &self.theme)
            .field("styling_strategy", &self.styling_strategy)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
