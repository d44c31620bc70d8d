//! Core parsing pipeline and node graph for pagetree.
//!
//! This crate ties the source adapters, the URL/path resolver and the node
//! graph together into the one public entry point, [`Parser`]:
//!
//! ```rust,no_run
//! use pagetree_core::Parser;
//!
//! fn main() -> pagetree_core::Result<()> {
//!     let parser = Parser::from_file("content.export")?;
//!     for node in parser.nodes() {
//!         println!("{} {}", node.id, node.url.as_deref().unwrap_or("-"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The whole graph is built eagerly during construction; afterwards every
//! query is a read-only lookup and misses are `None`, never errors.

pub mod graph;
pub mod node;
pub mod parser;

mod resolver;
mod sources;

// Re-export public API at crate root for ergonomic imports.
pub use graph::NodeGraph;
pub use node::PageNode;
pub use parser::Parser;

// The shared foundation types, re-exported so most callers only depend on
// this crate.
pub use pagetree_codec::CultureVariant;
pub use pagetree_shared::{NodeId, PageTreeError, ParseOptions, PropertyValue, Result};
