//! In-memory markup tree.
//!
//! [`Document`] is an arena of nodes addressed by [`NodeId`]. Parents own their children
//! through ordered id lists and children refer back to their parent by id only. Parsing and
//! serialization are provided by `quick-xml` (see [`xml`]).

pub mod tree;
pub mod xml;

pub use tree::{Attributes, Document, Node, NodeId, NodeKind};
