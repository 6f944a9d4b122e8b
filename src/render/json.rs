//! JSON export of rendered view trees.
//!
//! Each node carries a snake_case `kind` tag (`view`, `text`, `image`,
//! `math`, `fragment`, `empty`). Unset style properties, empty child lists
//! and absent text content are omitted, so a host view layer only sees
//! what it has to apply.

use crate::error::{Error, Result};
use crate::model::ViewNode;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented, for snapshots and debugging
    #[default]
    Pretty,
    /// Single line, for handing to a host view layer
    Compact,
}

/// Serialize a view tree for a host view layer.
pub fn to_json(view: &ViewNode, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(view),
        JsonFormat::Compact => serde_json::to_string(view),
    };

    result.map_err(|e| Error::Render(format!("Cannot serialize view tree: {}", e)))
}

/// Load a view tree previously written by [`to_json`].
pub fn view_from_json(json: &str) -> Result<ViewNode> {
    Ok(serde_json::from_str(json)?)
}
