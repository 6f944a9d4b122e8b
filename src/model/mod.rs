//! Model types shared by the parser boundary and the renderer.
//!
//! [`DocumentNode`] is the tree a markdown parser produces; [`ViewNode`] is
//! the tree the renderer hands to the host view layer.

mod node;
mod view;

pub use node::{DocumentNode, NodeKind, NodeType, TextAlign};
pub use view::{
    AlignItems, FlexDirection, FontWeight, Role, Style, TextDecoration, ViewNode,
};
