//! Markup (XML) source adapter.
//!
//! A node is any element carrying both an `id` and a `urlName` attribute,
//! enumerated in document order. The ancestor-id chain is derived by walking
//! parent elements to the document root, which carries the root sentinel id.

use std::sync::Arc;

use pagetree_markup::{Document, Element};
use pagetree_shared::{NodeId, PageTreeError, Result};

use super::{Candidate, ID_KEY, NODE_NAME_KEY, NodeSource, PropertySource, URL_NAME_KEY};

pub(crate) struct MarkupSource {
    doc: Arc<Document>,
}

impl MarkupSource {
    pub fn new(doc: Arc<Document>) -> Self {
        Self { doc }
    }
}

impl NodeSource for MarkupSource {
    fn collect(&self) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for element in self.doc.descendants() {
            if element.attr(ID_KEY).is_none() || element.attr(URL_NAME_KEY).is_none() {
                continue;
            }
            candidates.push(candidate_of(&self.doc, element)?);
        }
        Ok(candidates)
    }
}

fn candidate_of(doc: &Arc<Document>, element: Element<'_>) -> Result<Candidate> {
    let raw_id = element.attr(ID_KEY).expect("candidate has an id attribute");
    let id: NodeId = raw_id.trim().parse().map_err(|_| {
        PageTreeError::markup(format!("unparsable id attribute '{raw_id}' on a markup node"))
    })?;

    let name = element.attr(NODE_NAME_KEY).ok_or_else(|| {
        PageTreeError::markup(format!("missing nodeName attribute on node ID {id}"))
    })?;
    let slug = element
        .attr(URL_NAME_KEY)
        .expect("candidate has a urlName attribute");

    Ok(Candidate {
        id,
        chain: ancestor_chain(element, id)?,
        uid: None,
        name_fragment: Some(name.to_string()),
        slug_fragment: Some(slug.to_string()),
        props: PropertySource::Markup {
            doc: Arc::clone(doc),
            element: element.index(),
        },
    })
}

/// Walk parent elements to the document root, collecting their ids. The
/// chain runs root-first and ends at the node itself.
fn ancestor_chain(element: Element<'_>, id: NodeId) -> Result<Vec<NodeId>> {
    let mut chain = vec![id];
    let mut current = element;
    while let Some(parent) = current.parent() {
        let raw = parent.attr(ID_KEY).ok_or_else(|| {
            PageTreeError::markup(format!(
                "missing id attribute on an ancestor of node ID {id}"
            ))
        })?;
        let ancestor: NodeId = raw.trim().parse().map_err(|_| {
            PageTreeError::markup(format!(
                "unparsable id attribute '{raw}' on an ancestor of node ID {id}"
            ))
        })?;
        chain.insert(0, ancestor);
        current = parent;
    }
    Ok(chain)
}
