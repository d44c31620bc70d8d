//! Read-only markup (XML) element tree and text normalization.
//!
//! This crate wraps `quick-xml` with the small surface the node-graph layer
//! needs: an attributed element tree with parent/child navigation, decoded
//! text, and raw source slices for byte-faithful inner-markup access.
//!
//! Parse failures are [`SyntaxError`]s — a distinct type so callers can treat
//! "this is not a markup snapshot at all" as recoverable control flow rather
//! than a fatal decode error.

mod text;
mod tree;

pub use text::normalize_text;
pub use tree::{Document, Element, SyntaxError};
