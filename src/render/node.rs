//! Recursive document-tree-to-view-tree renderer.
//!
//! [`NodeRenderer::render`] walks a [`DocumentNode`] depth first. For each
//! node it first offers the node to a custom renderer registered for its
//! type; when none is registered, or the custom renderer declines, the
//! default rendering for the type is produced. Adjacent inline children are
//! grouped into runs so text flows within a single text container.

use super::context::{NodeExtras, RenderContext, RendererProps};
use super::styles::BaseStyles;
use super::table;
use crate::model::{DocumentNode, NodeKind, NodeType, Role, Style, ViewNode};

/// Text of the marker rendered in place of a document that failed to parse.
pub const PARSE_ERROR_MESSAGE: &str = "Error parsing markdown";

const CHECKED_BOX: &str = "☑";
const UNCHECKED_BOX: &str = "☐";
const BULLET: &str = "•";

/// Renders document nodes with a borrowed [`RenderContext`].
///
/// Cheap to create; the default styles are computed from the context's
/// theme on construction and reused for the whole pass.
#[derive(Debug)]
pub struct NodeRenderer<'a> {
    ctx: &'a RenderContext,
    styles: BaseStyles,
}

impl<'a> NodeRenderer<'a> {
    /// Create a renderer for `ctx`.
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self {
            ctx,
            styles: BaseStyles::new(&ctx.theme),
        }
    }

    /// The context this renderer reads.
    pub fn context(&self) -> &'a RenderContext {
        self.ctx
    }

    /// Default styles for the context's theme.
    pub fn styles(&self) -> &BaseStyles {
        &self.styles
    }

    /// Render a whole tree inside the outer container.
    pub fn render_root(&self, node: &DocumentNode) -> ViewNode {
        ViewNode::view(
            Role::Container,
            self.styles.container.clone(),
            vec![self.render(node, 0, false, false)],
        )
    }

    /// Render the visible marker for a failed parse.
    pub fn render_error(&self) -> ViewNode {
        ViewNode::view(
            Role::Container,
            self.styles.container.clone(),
            vec![ViewNode::text(
                Role::ErrorMarker,
                self.styles.error_text.clone(),
                PARSE_ERROR_MESSAGE,
            )],
        )
    }

    /// Render `node` and its subtree.
    ///
    /// `depth` is the node's distance from the root, `in_list_item` is set
    /// for nodes inside a list item and `parent_is_text` when the node is
    /// laid out inside a text container.
    pub fn render(
        &self,
        node: &DocumentNode,
        depth: usize,
        in_list_item: bool,
        parent_is_text: bool,
    ) -> ViewNode {
        let node_type = node.node_type();

        if let Some(custom) = self.ctx.renderers.get(node_type) {
            let props = RendererProps {
                node,
                children: self.render_children(&node.children, depth, in_list_item, parent_is_text),
                renderer: self,
                extras: NodeExtras::from_node(node),
                depth,
                in_list_item,
                parent_is_text,
            };
            if let Some(view) = custom(props) {
                return view;
            }
            log::trace!("Custom {} renderer declined, using default", node_type);
        }

        self.render_default(node, depth, in_list_item, parent_is_text)
    }

    /// Render a child list, grouping adjacent inline nodes into runs.
    ///
    /// Children render at `depth + 1`. A run holding inline math outside a
    /// text context becomes a row-flow view; any other run becomes a text
    /// span, or is spliced in directly when already inside text.
    pub fn render_children(
        &self,
        children: &[DocumentNode],
        depth: usize,
        in_list_item: bool,
        parent_is_text: bool,
    ) -> Vec<ViewNode> {
        let mut elements = Vec::new();
        let mut run: Vec<&DocumentNode> = Vec::new();

        for child in children {
            if child.node_type().is_inline() {
                run.push(child);
                continue;
            }
            self.flush_run(&mut run, &mut elements, depth, in_list_item, parent_is_text);
            push_visible(
                &mut elements,
                self.render(child, depth + 1, in_list_item, parent_is_text),
            );
        }
        self.flush_run(&mut run, &mut elements, depth, in_list_item, parent_is_text);

        elements
    }

    fn flush_run(
        &self,
        run: &mut Vec<&DocumentNode>,
        elements: &mut Vec<ViewNode>,
        depth: usize,
        in_list_item: bool,
        parent_is_text: bool,
    ) {
        if run.is_empty() {
            return;
        }

        let has_math = run
            .iter()
            .any(|node| node.node_type() == NodeType::MathInline);

        if has_math && !parent_is_text {
            let children = self.render_run(run, depth, in_list_item, false);
            elements.push(ViewNode::view(Role::MathRun, Style::row_flow(), children));
        } else if parent_is_text {
            elements.extend(self.render_run(run, depth, in_list_item, true));
        } else {
            let children = self.render_run(run, depth, in_list_item, true);
            elements.push(ViewNode::span(
                Role::InlineRun,
                self.styles.text.clone(),
                children,
            ));
        }
        run.clear();
    }

    fn render_run(
        &self,
        run: &[&DocumentNode],
        depth: usize,
        in_list_item: bool,
        parent_is_text: bool,
    ) -> Vec<ViewNode> {
        let mut out = Vec::with_capacity(run.len());
        for node in run {
            push_visible(
                &mut out,
                self.render(node, depth + 1, in_list_item, parent_is_text),
            );
        }
        out
    }

    fn style(&self, base: &Style, node_type: NodeType) -> Style {
        base.with_override(self.ctx.style_for(node_type))
    }

    fn render_default(
        &self,
        node: &DocumentNode,
        depth: usize,
        in_list_item: bool,
        parent_is_text: bool,
    ) -> ViewNode {
        let node_type = node.node_type();
        let styles = &self.styles;

        match &node.kind {
            NodeKind::Document => ViewNode::view(
                Role::Document,
                self.style(&styles.document, node_type),
                self.render_children(&node.children, depth, false, false),
            ),
            NodeKind::Heading { level } => {
                let level = (*level).clamp(1, 6);
                ViewNode::span(
                    Role::Heading { level },
                    self.style(styles.heading(level), node_type),
                    self.render_children(&node.children, depth, in_list_item, true),
                )
            }
            NodeKind::Paragraph => {
                let base = if in_list_item {
                    &styles.paragraph_in_list
                } else {
                    &styles.paragraph
                };
                ViewNode::view(
                    Role::Paragraph,
                    self.style(base, node_type),
                    self.render_children(&node.children, depth, in_list_item, false),
                )
            }
            NodeKind::Text { content } => {
                if parent_is_text {
                    ViewNode::text(Role::Span, Style::new(), content.as_str())
                } else {
                    ViewNode::text(Role::Span, self.style(&styles.text, node_type), content.as_str())
                }
            }
            NodeKind::Bold => self.styled_span(node, Role::Bold, &styles.bold, depth, in_list_item),
            NodeKind::Italic => {
                self.styled_span(node, Role::Italic, &styles.italic, depth, in_list_item)
            }
            NodeKind::Strikethrough => self.styled_span(
                node,
                Role::Strikethrough,
                &styles.strikethrough,
                depth,
                in_list_item,
            ),
            NodeKind::Link { href, .. } => self.styled_span(
                node,
                Role::Link { href: href.clone() },
                &styles.link,
                depth,
                in_list_item,
            ),
            NodeKind::Image { href, alt, title } => ViewNode::Image {
                url: href.clone(),
                alt: alt.clone(),
                title: title.clone(),
                style: self.style(&styles.image, node_type),
            },
            NodeKind::CodeInline { content } => ViewNode::text(
                Role::CodeInline,
                self.style(&styles.code_inline, node_type),
                content.as_str(),
            ),
            NodeKind::CodeBlock { language, .. } => {
                self.render_code_block(node, language.as_deref())
            }
            NodeKind::Blockquote => ViewNode::view(
                Role::Blockquote,
                self.style(&styles.blockquote, node_type),
                self.render_children(&node.children, depth, in_list_item, false),
            ),
            NodeKind::HorizontalRule => ViewNode::view(
                Role::HorizontalRule,
                self.style(&styles.horizontal_rule, node_type),
                Vec::new(),
            ),
            NodeKind::LineBreak => ViewNode::text(Role::LineBreak, Style::new(), "\n"),
            NodeKind::SoftBreak => ViewNode::text(Role::SoftBreak, Style::new(), " "),
            NodeKind::MathInline { .. } => {
                let text = node.text_content();
                let content = strip_math_delimiters(&text);
                if content.is_empty() {
                    return ViewNode::Empty;
                }
                ViewNode::Math {
                    display: false,
                    content: content.to_string(),
                    style: self.style(&styles.math_inline, node_type),
                }
            }
            NodeKind::MathBlock { .. } => ViewNode::Math {
                display: true,
                content: node.text_content(),
                style: self.style(&styles.math_block, node_type),
            },
            NodeKind::List { ordered, start } => {
                self.render_list(node, *ordered, start.unwrap_or(1), depth)
            }
            NodeKind::ListItem => ViewNode::Fragment {
                children: self.render_children(&node.children, depth, true, false),
            },
            NodeKind::TaskListItem { checked } => ViewNode::view(
                Role::TaskListItem { checked: *checked },
                self.style(&styles.list_item, node_type),
                vec![
                    ViewNode::text(
                        Role::Checkbox,
                        styles.checkbox.clone(),
                        if *checked { CHECKED_BOX } else { UNCHECKED_BOX },
                    ),
                    ViewNode::view(
                        Role::ListItemContent,
                        styles.list_item_content.clone(),
                        self.render_children(&node.children, depth, true, false),
                    ),
                ],
            ),
            NodeKind::Table => table::render_table(self, node, self.ctx.style_for(node_type)),
            NodeKind::TableHead
            | NodeKind::TableBody
            | NodeKind::TableRow
            | NodeKind::TableCell { .. }
            | NodeKind::HtmlInline { .. } => ViewNode::Empty,
        }
    }

    fn styled_span(
        &self,
        node: &DocumentNode,
        role: Role,
        base: &Style,
        depth: usize,
        in_list_item: bool,
    ) -> ViewNode {
        ViewNode::span(
            role,
            self.style(base, node.node_type()),
            self.render_children(&node.children, depth, in_list_item, true),
        )
    }

    fn render_code_block(&self, node: &DocumentNode, language: Option<&str>) -> ViewNode {
        let styles = &self.styles;
        let language = language.filter(|lang| !lang.is_empty());

        let mut children = Vec::with_capacity(2);
        if let Some(lang) = language.filter(|_| self.ctx.theme.show_code_language) {
            children.push(ViewNode::text(
                Role::CodeLanguage,
                styles.code_language.clone(),
                lang.to_uppercase(),
            ));
        }
        children.push(ViewNode::text(
            Role::CodeText,
            styles.code_text.clone(),
            node.text_content(),
        ));

        ViewNode::view(
            Role::CodeBlock {
                language: language.map(str::to_string),
            },
            self.style(&styles.code_block, NodeType::CodeBlock),
            children,
        )
    }

    fn render_list(&self, node: &DocumentNode, ordered: bool, start: u64, depth: usize) -> ViewNode {
        let styles = &self.styles;
        let mut base = styles.list.clone();
        if depth > 0 {
            base = base.merged(&styles.list_nested);
        }

        let items = node
            .children
            .iter()
            .enumerate()
            .map(|(index, child)| {
                if matches!(child.kind, NodeKind::TaskListItem { .. }) {
                    return self.render(child, depth + 1, true, false);
                }
                let marker = if ordered {
                    format!("{}.", start.saturating_add(index as u64))
                } else {
                    BULLET.to_string()
                };
                ViewNode::view(
                    Role::ListItem,
                    styles.list_item.clone(),
                    vec![
                        ViewNode::text(Role::ListMarker, styles.list_marker.clone(), marker),
                        ViewNode::view(
                            Role::ListItemContent,
                            styles.list_item_content.clone(),
                            vec![self.render(child, depth + 1, true, false)],
                        ),
                    ],
                )
            })
            .collect();

        ViewNode::view(
            Role::List { ordered, depth },
            self.style(&base, NodeType::List),
            items,
        )
    }
}

fn push_visible(out: &mut Vec<ViewNode>, view: ViewNode) {
    if !view.is_empty() {
        out.push(view);
    }
}

/// Strip surrounding `$` delimiters and whitespace from inline math.
fn strip_math_delimiters(content: &str) -> &str {
    content.trim_matches('$').trim()
}
