//! Source adapters: one capability, two implementations.
//!
//! Both input formats are reduced to the same shape — for every candidate
//! node: a stable numeric id, its ancestor-id chain, raw display-name and
//! URL-slug fragments, and an accessor for named property values. Everything
//! downstream (resolver, node graph) is format-agnostic.

mod markup;
mod records;

use std::sync::Arc;

use uuid::Uuid;

use pagetree_codec::NodeKit;
use pagetree_markup::Document;
use pagetree_shared::{NodeId, Result};

pub(crate) use markup::MarkupSource;
pub(crate) use records::RecordSource;

/// Attribute/property keys with structural meaning in both formats.
pub(crate) const ID_KEY: &str = "id";
pub(crate) const URL_NAME_KEY: &str = "urlName";
pub(crate) const NODE_NAME_KEY: &str = "nodeName";
pub(crate) const URL_ALIAS_KEY: &str = "urlAlias";

/// Enumerate candidate nodes from one input format.
pub(crate) trait NodeSource {
    /// Candidates in source order: ancestors are always emitted before
    /// their descendants.
    fn collect(&self) -> Result<Vec<Candidate>>;
}

/// One node as seen by a source adapter, before normalization.
#[derive(Debug)]
pub(crate) struct Candidate {
    pub id: NodeId,
    /// Ancestor ids from the root sentinel down to the node itself.
    pub chain: Vec<NodeId>,
    /// External unique identifier, record snapshots only.
    pub uid: Option<Uuid>,
    /// Raw display name, when the source carries one.
    pub name_fragment: Option<String>,
    /// Raw URL slug, when the source carries one.
    pub slug_fragment: Option<String>,
    /// Opaque back-reference into the source for property access.
    pub props: PropertySource,
}

/// Back-reference from a node to the source structure it was built from.
/// Never cloned or reshaped; property access reads through it on demand.
#[derive(Debug)]
pub(crate) enum PropertySource {
    Markup { doc: Arc<Document>, element: usize },
    Records { kit: Arc<NodeKit> },
}

impl PropertySource {
    /// Singular string access to a named property: the decoded text of a
    /// same-named child element (markup) or the string projection of the
    /// first typed value (records). `None` when the property is absent.
    pub fn text(&self, name: &str) -> Option<String> {
        match self {
            PropertySource::Markup { doc, element } => doc
                .element(*element)
                .child_element(name)
                .map(|el| el.text()),
            PropertySource::Records { kit } => kit.property(name).and_then(|v| v.as_text()),
        }
    }
}
