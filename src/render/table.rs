//! Table sub-renderer.
//!
//! Tables are consumed structurally: header cells come from the rows of
//! the `table_head` section, body rows from `table_body`, and column
//! alignment from the header cells. Column widths are left to the host.

use super::node::NodeRenderer;
use super::theme::Theme;
use crate::model::{
    AlignItems, DocumentNode, FlexDirection, FontWeight, NodeKind, Role, Style, TextAlign,
    ViewNode,
};

const CELL_MIN_WIDTH: f32 = 60.0;
const CELL_PADDING_VERTICAL: f32 = 10.0;
const CELL_PADDING_HORIZONTAL: f32 = 12.0;

#[derive(Debug, Default)]
struct TableData<'n> {
    headers: Vec<&'n DocumentNode>,
    rows: Vec<Vec<&'n DocumentNode>>,
    alignments: Vec<TextAlign>,
}

impl<'n> TableData<'n> {
    fn extract(table: &'n DocumentNode) -> Self {
        let mut data = TableData::default();

        for section in &table.children {
            match section.kind {
                NodeKind::TableHead => {
                    for cell in rows_of(section).flatten() {
                        data.alignments.push(match cell.kind {
                            NodeKind::TableCell { align } => align,
                            _ => TextAlign::Default,
                        });
                        data.headers.push(cell);
                    }
                }
                NodeKind::TableBody => {
                    data.rows
                        .extend(rows_of(section).map(|row| row.collect::<Vec<_>>()));
                }
                _ => {}
            }
        }
        data
    }

    fn alignment(&self, column: usize) -> TextAlign {
        self.alignments
            .get(column)
            .copied()
            .unwrap_or_default()
    }
}

fn rows_of<'n>(
    section: &'n DocumentNode,
) -> impl Iterator<Item = std::slice::Iter<'n, DocumentNode>> + 'n {
    section
        .children
        .iter()
        .filter(|row| matches!(row.kind, NodeKind::TableRow))
        .map(|row| row.children.iter())
}

struct TableStyles {
    table: Style,
    header_row: Style,
    body_row: Style,
    even_row: Style,
    odd_row: Style,
    cell: Style,
    header_text: Style,
    cell_text: Style,
}

impl TableStyles {
    fn new(theme: &Theme) -> Self {
        let colors = &theme.colors;
        let row = Style {
            flex_direction: Some(FlexDirection::Row),
            border_bottom_width: Some(1.0),
            border_color: Some(colors.table_border.clone()),
            ..Style::default()
        };

        Self {
            table: Style {
                margin_top: Some(theme.spacing.s),
                margin_bottom: Some(theme.spacing.s),
                border_radius: Some(theme.border_radius.m),
                border_width: Some(1.0),
                border_color: Some(colors.table_border.clone()),
                background_color: Some(colors.surface.clone()),
                ..Style::default()
            },
            header_row: Style {
                background_color: Some(colors.table_header.clone()),
                ..row.clone()
            },
            even_row: Style {
                background_color: Some(colors.table_row_even.clone()),
                ..Style::default()
            },
            odd_row: Style {
                background_color: Some(colors.table_row_odd.clone()),
                ..Style::default()
            },
            body_row: row,
            cell: Style {
                padding_vertical: Some(CELL_PADDING_VERTICAL),
                padding_horizontal: Some(CELL_PADDING_HORIZONTAL),
                min_width: Some(CELL_MIN_WIDTH),
                ..Style::row_flow()
            },
            header_text: Style {
                color: Some(colors.table_header_text.clone()),
                font_size: Some(theme.font_sizes.xs),
                font_weight: Some(FontWeight::SemiBold),
                font_family: theme.font_families.regular.clone(),
                ..Style::default()
            },
            cell_text: Style {
                color: Some(colors.text.clone()),
                font_size: Some(theme.font_sizes.s),
                line_height: Some(20.0),
                font_family: theme.font_families.regular.clone(),
                ..Style::default()
            },
        }
    }
}

fn cell_alignment(align: TextAlign) -> AlignItems {
    match align {
        TextAlign::Center => AlignItems::Center,
        TextAlign::Right => AlignItems::FlexEnd,
        TextAlign::Default | TextAlign::Left => AlignItems::FlexStart,
    }
}

/// Render a `table` node; a table without header cells renders nothing.
pub(crate) fn render_table(
    renderer: &NodeRenderer<'_>,
    node: &DocumentNode,
    style_override: Option<&Style>,
) -> ViewNode {
    let data = TableData::extract(node);
    if data.headers.is_empty() {
        log::debug!("Skipping table without header cells");
        return ViewNode::Empty;
    }

    let styles = TableStyles::new(&renderer.context().theme);

    let cell = |cell: &DocumentNode, column: usize, header: bool| {
        let align = data.alignment(column);
        let style = Style {
            align_items: Some(cell_alignment(align)),
            text_align: Some(align),
            ..styles.cell.clone()
        };
        let text_style = if header {
            &styles.header_text
        } else {
            &styles.cell_text
        };

        let children = if cell.children.is_empty() {
            vec![ViewNode::text(
                Role::Span,
                text_style.clone(),
                cell.kind.content().unwrap_or_default(),
            )]
        } else {
            cell.children
                .iter()
                .map(|child| renderer.render(child, 0, false, false))
                .filter(|view| !view.is_empty())
                .collect()
        };

        ViewNode::view(
            Role::TableCell {
                column,
                align,
                header,
            },
            style,
            children,
        )
    };

    let mut rows = Vec::with_capacity(data.rows.len() + 1);
    rows.push(ViewNode::view(
        Role::TableHeader,
        styles.header_row.clone(),
        data.headers
            .iter()
            .enumerate()
            .map(|(column, header)| cell(*header, column, true))
            .collect(),
    ));

    for (index, row) in data.rows.iter().enumerate() {
        let even = index % 2 == 0;
        let stripe = if even { &styles.even_row } else { &styles.odd_row };
        rows.push(ViewNode::view(
            Role::TableRow { index, even },
            styles.body_row.merged(stripe),
            row.iter()
                .enumerate()
                .map(|(column, body_cell)| cell(*body_cell, column, false))
                .collect(),
        ));
    }

    ViewNode::view(Role::Table, styles.table.with_override(style_override), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::context::RenderContext;

    fn cell(align: TextAlign, text: &str) -> DocumentNode {
        DocumentNode::with_children(NodeKind::TableCell { align }, vec![DocumentNode::text(text)])
    }

    fn row(cells: Vec<DocumentNode>) -> DocumentNode {
        DocumentNode::with_children(NodeKind::TableRow, cells)
    }

    fn table() -> DocumentNode {
        DocumentNode::with_children(
            NodeKind::Table,
            vec![
                DocumentNode::with_children(
                    NodeKind::TableHead,
                    vec![row(vec![
                        cell(TextAlign::Left, "name"),
                        cell(TextAlign::Right, "qty"),
                    ])],
                ),
                DocumentNode::with_children(
                    NodeKind::TableBody,
                    vec![
                        row(vec![cell(TextAlign::Default, "a"), cell(TextAlign::Default, "1")]),
                        row(vec![cell(TextAlign::Default, "b"), cell(TextAlign::Default, "2")]),
                    ],
                ),
            ],
        )
    }

    fn render(node: &DocumentNode) -> ViewNode {
        let ctx = RenderContext::new();
        NodeRenderer::new(&ctx).render(node, 0, false, false)
    }

    #[test]
    fn test_extract_table_data() {
        let node = table();
        let data = TableData::extract(&node);
        assert_eq!(data.headers.len(), 2);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.alignments, vec![TextAlign::Left, TextAlign::Right]);
        assert_eq!(data.alignment(5), TextAlign::Default);
    }

    #[test]
    fn test_render_table_rows() {
        let view = render(&table());
        assert_eq!(view.role(), Some(&Role::Table));
        assert_eq!(view.children().len(), 3);
        assert_eq!(view.children()[0].role(), Some(&Role::TableHeader));
        assert_eq!(
            view.children()[1].role(),
            Some(&Role::TableRow {
                index: 0,
                even: true
            })
        );
        assert_eq!(
            view.children()[2].role(),
            Some(&Role::TableRow {
                index: 1,
                even: false
            })
        );
        assert_eq!(view.children()[2].plain_text(), "b2");
    }

    #[test]
    fn test_column_alignment_applies_to_body() {
        let view = render(&table());
        let body_cell = &view.children()[1].children()[1];
        assert_eq!(
            body_cell.role(),
            Some(&Role::TableCell {
                column: 1,
                align: TextAlign::Right,
                header: false
            })
        );
        assert_eq!(
            body_cell.style().and_then(|s| s.align_items),
            Some(AlignItems::FlexEnd)
        );
    }

    #[test]
    fn test_table_without_columns_is_empty() {
        let node = DocumentNode::with_children(NodeKind::Table, vec![]);
        assert!(render(&node).is_empty());
    }
}
