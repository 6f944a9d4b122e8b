//! Parser options and configuration.

use serde::{Deserialize, Serialize};

/// Options passed to a markdown parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// GitHub Flavored Markdown extensions (tables, strikethrough, task lists)
    pub gfm: bool,

    /// `$inline$` and `$$display$$` math
    pub math: bool,
}

impl ParserOptions {
    /// Create new parser options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// CommonMark only, no extensions.
    pub fn commonmark() -> Self {
        Self {
            gfm: false,
            math: false,
        }
    }

    /// Enable or disable GFM extensions.
    pub fn with_gfm(mut self, gfm: bool) -> Self {
        self.gfm = gfm;
        self
    }

    /// Enable or disable math.
    pub fn with_math(mut self, math: bool) -> Self {
        self.math = math;
        self
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            math: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_options_builder() {
        let options = ParserOptions::new().with_gfm(false).with_math(true);
        assert!(!options.gfm);
        assert!(options.math);
    }

    #[test]
    fn test_default_options() {
        let options = ParserOptions::default();
        assert!(options.gfm);
        assert!(options.math);
        assert_eq!(
            ParserOptions::commonmark(),
            ParserOptions {
                gfm: false,
                math: false
            }
        );
    }

    #[test]
    fn test_options_from_json() {
        let options: ParserOptions = serde_json::from_str(r#"{"math": false}"#).unwrap();
        assert!(options.gfm);
        assert!(!options.math);
    }
}
