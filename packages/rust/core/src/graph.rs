//! The normalized entity set: id-indexed, uid-indexed, insertion-ordered.

use std::collections::HashMap;

use pagetree_shared::{NodeId, PageTreeError, Result, compact_uid};

use crate::node::PageNode;

/// Owns every [`PageNode`] of one parse. Iteration follows source order;
/// `parent` and `children` are derived lookups, never stored links.
#[derive(Default, Debug)]
pub struct NodeGraph {
    nodes: Vec<PageNode>,
    by_id: HashMap<NodeId, usize>,
    by_uid: HashMap<String, NodeId>,
}

impl NodeGraph {
    pub(crate) fn insert(&mut self, node: PageNode) -> Result<()> {
        if self.by_id.contains_key(&node.id) {
            return Err(PageTreeError::validation(format!(
                "duplicate node ID {} in source",
                node.id
            )));
        }
        if let Some(uid) = &node.uid {
            self.by_uid.insert(uid.clone(), node.id);
        }
        self.by_id.insert(node.id, self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Node by numeric id, or `None`.
    pub fn get(&self, id: NodeId) -> Option<&PageNode> {
        self.by_id.get(&id).map(|&ix| &self.nodes[ix])
    }

    /// Node by external unique identifier, hyphenated or compact form,
    /// case insensitive. `None` when unknown.
    pub fn get_by_uid(&self, uid: &str) -> Option<&PageNode> {
        let id = *self.by_uid.get(&compact_uid(uid))?;
        self.get(id)
    }

    /// All nodes in source order.
    pub fn iter(&self) -> impl Iterator<Item = &PageNode> {
        self.nodes.iter()
    }

    /// Direct children of a node, in source order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &PageNode> {
        self.nodes.iter().filter(move |n| n.parent_id == Some(id))
    }

    /// The node's parent, or `None` for roots.
    pub fn parent(&self, node: &PageNode) -> Option<&PageNode> {
        self.get(node.parent_id?)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
