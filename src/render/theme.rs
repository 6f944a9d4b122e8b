//! Theme tokens and styling strategies.
//!
//! A [`Theme`] is a set of token groups (colors, spacing, font sizes, font
//! families, border radii). A [`PartialTheme`] overrides any subset of the
//! tokens and is merged group by group over a base theme selected by the
//! [`StylingStrategy`].

use serde::{Deserialize, Serialize};

use crate::error::Result;

macro_rules! token_group {
    (
        $(#[$meta:meta])*
        $name:ident / $partial:ident: $ty:ty {
            $($(#[$field_meta:meta])* $field:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $($(#[$field_meta])* pub $field: $ty,)+
        }

        #[doc = concat!("Partial override of [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $partial {
            $(
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )+
        }

        impl $name {
            fn merged(&self, partial: &$partial) -> Self {
                Self {
                    $($field: partial.$field.clone().unwrap_or_else(|| self.$field.clone()),)+
                }
            }
        }
    };
}

token_group! {
    /// Color tokens (CSS-style color strings).
    ThemeColors / PartialColors: String {
        text,
        text_muted,
        heading,
        link,
        code,
        code_background,
        code_language,
        blockquote,
        border,
        surface,
        surface_light,
        accent,
        table_border,
        table_header,
        table_header_text,
        table_row_even,
        table_row_odd,
        /// Color of the parse error marker
        error,
    }
}

token_group! {
    /// Spacing scale.
    Spacing / PartialSpacing: f32 { xs, s, m, l, xl }
}

token_group! {
    /// Font size scale, including one size per heading level.
    FontSizes / PartialFontSizes: f32 { xs, s, m, l, xl, h1, h2, h3, h4, h5, h6 }
}

token_group! {
    /// Font families; `None` lets the host pick its platform default.
    FontFamilies / PartialFontFamilies: Option<String> { regular, heading, mono }
}

token_group! {
    /// Border radius scale.
    BorderRadius / PartialBorderRadius: f32 { s, m, l }
}

/// Complete set of theme tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub colors: ThemeColors,
    pub spacing: Spacing,
    pub font_sizes: FontSizes,
    pub font_families: FontFamilies,
    pub border_radius: BorderRadius,
    /// Show the language label above code blocks
    pub show_code_language: bool,
}

/// Override for any subset of [`Theme`] tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialTheme {
    pub colors: PartialColors,
    pub spacing: PartialSpacing,
    pub font_sizes: PartialFontSizes,
    pub font_families: PartialFontFamilies,
    pub border_radius: PartialBorderRadius,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_code_language: Option<bool>,
}

/// How much styling the default renderers apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylingStrategy {
    /// Full styling with colors, spacing and visual effects
    #[default]
    Opinionated,
    /// Bare minimum styling for a clean slate
    Minimal,
}

impl StylingStrategy {
    /// The base theme this strategy starts from.
    pub fn base_theme(self) -> Theme {
        match self {
            StylingStrategy::Opinionated => Theme::dark(),
            StylingStrategy::Minimal => Theme::minimal(),
        }
    }
}

fn font_sizes() -> FontSizes {
    FontSizes {
        xs: 12.0,
        s: 14.0,
        m: 16.0,
        l: 18.0,
        xl: 22.0,
        h1: 32.0,
        h2: 26.0,
        h3: 22.0,
        h4: 18.0,
        h5: 16.0,
        h6: 14.0,
    }
}

fn spacing() -> Spacing {
    Spacing {
        xs: 4.0,
        s: 8.0,
        m: 12.0,
        l: 16.0,
        xl: 24.0,
    }
}

fn font_families() -> FontFamilies {
    FontFamilies {
        regular: None,
        heading: None,
        mono: None,
    }
}

fn colors(values: [&str; 18]) -> ThemeColors {
    let [text, text_muted, heading, link, code, code_background, code_language, blockquote, border, surface, surface_light, accent, table_border, table_header, table_header_text, table_row_even, table_row_odd, error] =
        values.map(str::to_string);
    ThemeColors {
        text,
        text_muted,
        heading,
        link,
        code,
        code_background,
        code_language,
        blockquote,
        border,
        surface,
        surface_light,
        accent,
        table_border,
        table_header,
        table_header_text,
        table_row_even,
        table_row_odd,
        error,
    }
}

impl Theme {
    /// Dark theme; the default for the opinionated strategy.
    pub fn dark() -> Self {
        Self {
            colors: colors([
                "#e0e0e0", "#888", "#f0f0f0", "#60a5fa", "#fbbf24", "#1a1a2e", "#4ade80",
                "#3b82f6", "#252525", "#151515", "#1a1a1a", "#4ade80", "#334155", "#0f172a",
                "#94a3b8", "#0f172a", "#1e293b", "#f87171",
            ]),
            spacing: spacing(),
            font_sizes: font_sizes(),
            font_families: font_families(),
            border_radius: BorderRadius {
                s: 4.0,
                m: 8.0,
                l: 12.0,
            },
            show_code_language: true,
        }
    }

    /// Light theme.
    pub fn light() -> Self {
        Self {
            colors: colors([
                "#1a1a1a", "#6b7280", "#000000", "#2563eb", "#ea580c", "#f3f4f6", "#10b981",
                "#3b82f6", "#e5e7eb", "#ffffff", "#f9fafb", "#10b981", "#e5e7eb", "#f3f4f6",
                "#6b7280", "#ffffff", "#f9fafb", "#dc2626",
            ]),
            ..Self::dark()
        }
    }

    /// Minimal theme: inherited colors, no spacing, no radii.
    pub fn minimal() -> Self {
        Self {
            colors: colors([
                "inherit",
                "inherit",
                "inherit",
                "#0066cc",
                "inherit",
                "transparent",
                "#888888",
                "#cccccc",
                "#cccccc",
                "transparent",
                "transparent",
                "#0066cc",
                "#cccccc",
                "transparent",
                "inherit",
                "transparent",
                "transparent",
                "#f87171",
            ]),
            spacing: Spacing {
                xs: 0.0,
                s: 0.0,
                m: 0.0,
                l: 0.0,
                xl: 0.0,
            },
            font_sizes: font_sizes(),
            font_families: font_families(),
            border_radius: BorderRadius {
                s: 0.0,
                m: 0.0,
                l: 0.0,
            },
            show_code_language: false,
        }
    }

    /// Merge a partial override over this theme, group by group.
    pub fn merged(&self, partial: &PartialTheme) -> Self {
        Self {
            colors: self.colors.merged(&partial.colors),
            spacing: self.spacing.merged(&partial.spacing),
            font_sizes: self.font_sizes.merged(&partial.font_sizes),
            font_families: self.font_families.merged(&partial.font_families),
            border_radius: self.border_radius.merged(&partial.border_radius),
            show_code_language: partial
                .show_code_language
                .unwrap_or(self.show_code_language),
        }
    }

    /// Font size for a heading level (clamped to 1-6).
    pub fn heading_size(&self, level: u8) -> f32 {
        match level.clamp(1, 6) {
            1 => self.font_sizes.h1,
            2 => self.font_sizes.h2,
            3 => self.font_sizes.h3,
            4 => self.font_sizes.h4,
            5 => self.font_sizes.h5,
            _ => self.font_sizes.h6,
        }
    }

    /// Load a complete theme from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl PartialTheme {
    /// Create an empty override.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an override from JSON; absent keys keep the base value.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Override the body text color.
    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.colors.text = Some(color.into());
        self
    }

    /// Override the link color.
    pub fn with_link_color(mut self, color: impl Into<String>) -> Self {
        self.colors.link = Some(color.into());
        self
    }

    /// Override the monospace font family.
    pub fn with_mono_font(mut self, family: impl Into<String>) -> Self {
        self.font_families.mono = Some(Some(family.into()));
        self
    }

    /// Show or hide code block language labels.
    pub fn with_code_language(mut self, show: bool) -> Self {
        self.show_code_language = Some(show);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unset_tokens() {
        let base = Theme::dark();
        let partial = PartialTheme::new()
            .with_link_color("#ff0000")
            .with_code_language(false);

        let merged = base.merged(&partial);
        assert_eq!(merged.colors.link, "#ff0000");
        assert_eq!(merged.colors.text, base.colors.text);
        assert_eq!(merged.spacing, base.spacing);
        assert!(!merged.show_code_language);
    }

    #[test]
    fn test_empty_partial_is_identity() {
        let base = Theme::light();
        assert_eq!(base.merged(&PartialTheme::default()), base);
    }

    #[test]
    fn test_strategy_base_theme() {
        assert_eq!(StylingStrategy::default(), StylingStrategy::Opinionated);
        assert_eq!(StylingStrategy::Minimal.base_theme().spacing.l, 0.0);
        assert!(!StylingStrategy::Minimal.base_theme().show_code_language);
        assert_eq!(StylingStrategy::Opinionated.base_theme(), Theme::dark());
    }

    #[test]
    fn test_heading_size() {
        let theme = Theme::dark();
        assert_eq!(theme.heading_size(1), 32.0);
        assert_eq!(theme.heading_size(6), 14.0);
        assert_eq!(theme.heading_size(0), 32.0);
        assert_eq!(theme.heading_size(9), 14.0);
    }

    #[test]
    fn test_partial_from_json() {
        let partial =
            PartialTheme::from_json(r##"{"colors": {"text": "#123456"}, "spacing": {"l": 20}}"##)
                .unwrap();
        let merged = Theme::dark().merged(&partial);
        assert_eq!(merged.colors.text, "#123456");
        assert_eq!(merged.spacing.l, 20.0);
        assert_eq!(merged.spacing.s, 8.0);
    }

    #[test]
    fn test_theme_json_round_trip() {
        let json = serde_json::to_string(&Theme::light()).unwrap();
        assert_eq!(Theme::from_json(&json).unwrap(), Theme::light());
    }

    #[test]
    fn test_mono_font_override() {
        let merged = Theme::dark().merged(&PartialTheme::new().with_mono_font("Menlo"));
        assert_eq!(merged.font_families.mono.as_deref(), Some("Menlo"));
    }
}
