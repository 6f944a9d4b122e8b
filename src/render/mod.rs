//! Rendering of document trees into view trees.

mod context;
mod json;
pub mod link;
mod markdown;
mod node;
mod styles;
mod table;
pub mod theme;

pub use context::{
    CustomRenderer, CustomRenderers, NodeExtras, RenderContext, RendererProps, StyleOverrides,
};
pub use json::{to_json, view_from_json, JsonFormat};
pub use link::{
    allowed_external_href, async_link_handler, link_handler, normalize_link_href, LinkOpener,
    LinkOutcome, LinkPressHandler, LinkVerdict,
};
pub use markdown::{render_markdown, Markdown};
pub use node::{NodeRenderer, PARSE_ERROR_MESSAGE};
pub use styles::BaseStyles;
pub use theme::{PartialTheme, StylingStrategy, Theme};
