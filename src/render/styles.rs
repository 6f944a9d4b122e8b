//! Default styles derived from theme tokens.

use super::theme::Theme;
use crate::model::{AlignItems, FlexDirection, FontWeight, Style, TextAlign, TextDecoration};

const BODY_LINE_HEIGHT: f32 = 1.6;
const HEADING_LINE_HEIGHT: f32 = 1.3;
const CODE_LINE_HEIGHT: f32 = 1.5;
const MONOSPACE: &str = "monospace";

/// Styles of the default renderers, computed once per theme.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseStyles {
    pub container: Style,
    pub document: Style,
    pub error_text: Style,
    pub text: Style,
    pub bold: Style,
    pub italic: Style,
    pub strikethrough: Style,
    pub paragraph: Style,
    pub paragraph_in_list: Style,
    pub link: Style,
    pub code_inline: Style,
    pub code_block: Style,
    pub code_language: Style,
    pub code_text: Style,
    pub blockquote: Style,
    pub horizontal_rule: Style,
    pub list: Style,
    pub list_nested: Style,
    pub list_item: Style,
    pub list_marker: Style,
    pub list_item_content: Style,
    pub checkbox: Style,
    pub math_inline: Style,
    pub math_block: Style,
    pub image: Style,
    headings: [Style; 6],
}

impl BaseStyles {
    /// Compute the default styles for `theme`.
    pub fn new(theme: &Theme) -> Self {
        let colors = &theme.colors;
        let spacing = &theme.spacing;
        let sizes = &theme.font_sizes;
        let fonts = &theme.font_families;
        let mono = fonts.mono.clone().unwrap_or_else(|| MONOSPACE.to_string());

        let row_item = Style {
            flex_direction: Some(FlexDirection::Row),
            align_items: Some(AlignItems::FlexStart),
            margin_bottom: Some(spacing.s),
            ..Style::default()
        };

        Self {
            container: Style {
                flex: Some(1.0),
                ..Style::default()
            },
            document: Style {
                flex: Some(1.0),
                ..Style::default()
            },
            error_text: Style {
                color: Some(colors.error.clone()),
                font_size: Some(sizes.s),
                font_family: Some(mono.clone()),
                ..Style::default()
            },
            text: Style {
                color: Some(colors.text.clone()),
                font_size: Some(sizes.m),
                line_height: Some(sizes.m * BODY_LINE_HEIGHT),
                font_family: fonts.regular.clone(),
                ..Style::default()
            },
            bold: Style {
                font_weight: Some(FontWeight::Bold),
                ..Style::default()
            },
            italic: Style {
                italic: Some(true),
                ..Style::default()
            },
            strikethrough: Style {
                text_decoration: Some(TextDecoration::LineThrough),
                ..Style::default()
            },
            paragraph: Style {
                align_items: Some(AlignItems::Baseline),
                margin_bottom: Some(spacing.l),
                ..Style::row_flow()
            },
            paragraph_in_list: Style {
                align_items: Some(AlignItems::Baseline),
                margin_top: Some(0.0),
                margin_bottom: Some(0.0),
                ..Style::row_flow()
            },
            link: Style {
                color: Some(colors.link.clone()),
                text_decoration: Some(TextDecoration::Underline),
                ..Style::default()
            },
            code_inline: Style {
                font_family: Some(mono.clone()),
                font_size: Some(sizes.s),
                color: Some(colors.code.clone()),
                background_color: Some(colors.code_background.clone()),
                padding_horizontal: Some(spacing.xs),
                padding_vertical: Some(2.0),
                border_radius: Some(theme.border_radius.s),
                ..Style::default()
            },
            code_block: Style {
                background_color: Some(colors.code_background.clone()),
                border_radius: Some(theme.border_radius.m),
                padding_vertical: Some(spacing.l),
                padding_horizontal: Some(spacing.l),
                margin_top: Some(spacing.m),
                margin_bottom: Some(spacing.m),
                border_width: Some(1.0),
                border_color: Some(colors.border.clone()),
                ..Style::default()
            },
            code_language: Style {
                color: Some(colors.code_language.clone()),
                font_size: Some(sizes.xs),
                font_weight: Some(FontWeight::SemiBold),
                margin_bottom: Some(spacing.s),
                letter_spacing: Some(0.5),
                ..Style::default()
            },
            code_text: Style {
                font_family: Some(mono.clone()),
                font_size: Some(sizes.s),
                color: Some(colors.text.clone()),
                line_height: Some(sizes.s * CODE_LINE_HEIGHT),
                ..Style::default()
            },
            blockquote: Style {
                border_left_width: Some(4.0),
                border_left_color: Some(colors.blockquote.clone()),
                background_color: Some(colors.surface_light.clone()),
                margin_top: Some(spacing.m),
                margin_bottom: Some(spacing.m),
                padding_vertical: Some(spacing.m),
                padding_horizontal: Some(spacing.l),
                border_radius: Some(4.0),
                ..Style::default()
            },
            horizontal_rule: Style {
                height: Some(1.0),
                background_color: Some(colors.border.clone()),
                margin_top: Some(spacing.xl),
                margin_bottom: Some(spacing.xl),
                ..Style::default()
            },
            list: Style {
                margin_bottom: Some(spacing.m),
                ..Style::default()
            },
            list_nested: Style {
                margin_left: Some(spacing.s),
                margin_bottom: Some(0.0),
                ..Style::default()
            },
            list_item: row_item,
            list_marker: Style {
                color: Some(colors.accent.clone()),
                font_size: Some(sizes.m),
                line_height: Some(sizes.m * BODY_LINE_HEIGHT),
                margin_right: Some(spacing.s),
                min_width: Some(20.0),
                text_align: Some(TextAlign::Center),
                font_family: fonts.regular.clone(),
                ..Style::default()
            },
            list_item_content: Style {
                flex: Some(1.0),
                ..Style::default()
            },
            checkbox: Style {
                color: Some(colors.accent.clone()),
                font_size: Some(sizes.l),
                line_height: Some(sizes.m * BODY_LINE_HEIGHT),
                margin_right: Some(spacing.s),
                ..Style::default()
            },
            math_inline: Style {
                color: Some(colors.code.clone()),
                font_size: Some(sizes.s),
                margin_left: Some(2.0),
                margin_right: Some(2.0),
                ..Style::default()
            },
            math_block: Style {
                margin_top: Some(spacing.m),
                margin_bottom: Some(spacing.m),
                padding_vertical: Some(spacing.l),
                padding_horizontal: Some(spacing.l),
                background_color: Some(colors.surface.clone()),
                border_radius: Some(theme.border_radius.l),
                border_width: Some(1.0),
                border_color: Some(colors.border.clone()),
                align_items: Some(AlignItems::Center),
                ..Style::default()
            },
            image: Style {
                margin_top: Some(spacing.m),
                margin_bottom: Some(spacing.m),
                border_radius: Some(theme.border_radius.m),
                ..Style::default()
            },
            headings: std::array::from_fn(|i| heading_style(theme, i as u8 + 1)),
        }
    }

    /// Style of a heading; the level is clamped to 1-6.
    pub fn heading(&self, level: u8) -> &Style {
        &self.headings[usize::from(level.clamp(1, 6)) - 1]
    }
}

fn heading_style(theme: &Theme, level: u8) -> Style {
    let size = theme.heading_size(level);
    let base = Style {
        color: Some(theme.colors.heading.clone()),
        font_weight: Some(FontWeight::Bold),
        font_family: theme.font_families.heading.clone(),
        font_size: Some(size),
        line_height: Some(size * HEADING_LINE_HEIGHT),
        margin_top: Some(theme.spacing.xl),
        margin_bottom: Some(theme.spacing.m),
        letter_spacing: Some(-0.2),
        ..Style::default()
    };

    let scale = match level {
        1 => Style {
            border_bottom_width: Some(1.0),
            border_color: Some(theme.colors.border.clone()),
            padding_vertical: Some(theme.spacing.s),
            letter_spacing: Some(-0.6),
            ..Style::default()
        },
        2 => Style {
            letter_spacing: Some(-0.4),
            ..Style::default()
        },
        6 => Style {
            color: Some(theme.colors.text_muted.clone()),
            ..Style::default()
        },
        _ => Style::default(),
    };
    base.merged(&scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_scale() {
        let theme = Theme::dark();
        let styles = BaseStyles::new(&theme);

        assert_eq!(styles.heading(1).font_size, Some(32.0));
        assert_eq!(styles.heading(1).border_bottom_width, Some(1.0));
        assert_eq!(styles.heading(2).letter_spacing, Some(-0.4));
        assert_eq!(styles.heading(6).color.as_deref(), Some("#888"));
        assert_eq!(styles.heading(0), styles.heading(1));
        assert_eq!(styles.heading(7), styles.heading(6));
    }

    #[test]
    fn test_styles_follow_theme_tokens() {
        let theme = Theme::light();
        let styles = BaseStyles::new(&theme);
        assert_eq!(styles.text.color.as_deref(), Some("#1a1a1a"));
        assert_eq!(styles.link.color.as_deref(), Some("#2563eb"));
        assert_eq!(styles.code_text.font_family.as_deref(), Some("monospace"));
        assert_eq!(styles.text.line_height, Some(16.0 * 1.6));
    }

    #[test]
    fn test_minimal_theme_has_no_spacing() {
        let styles = BaseStyles::new(&Theme::minimal());
        assert_eq!(styles.paragraph.margin_bottom, Some(0.0));
        assert_eq!(styles.code_block.border_radius, Some(0.0));
    }
}
