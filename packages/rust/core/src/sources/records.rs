//! Record-snapshot source adapter.
//!
//! A node is every key in the store, enumerated in ascending key order. The
//! ancestor-id chain is parsed from the identity record's path string; the
//! authoritative content variant is published-if-present, else draft.

use std::sync::Arc;

use pagetree_codec::{ByteCursor, NodeKit, RecordStore};
use pagetree_shared::{NodeId, PageTreeError, Result};

use super::{Candidate, NodeSource, PropertySource};

pub(crate) struct RecordSource<'s> {
    store: &'s dyn RecordStore,
}

impl<'s> RecordSource<'s> {
    pub fn new(store: &'s dyn RecordStore) -> Self {
        Self { store }
    }
}

impl NodeSource for RecordSource<'_> {
    fn collect(&self) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for id in self.store.ids() {
            let bytes = self.store.get(id).ok_or_else(|| {
                PageTreeError::decode(format!("store listed key {id} but returned no record"))
            })?;
            candidates.push(candidate_of(id, bytes)?);
        }
        Ok(candidates)
    }
}

fn candidate_of(id: NodeId, bytes: &[u8]) -> Result<Candidate> {
    let mut cur = ByteCursor::new(bytes);
    let kit = NodeKit::decode(&mut cur)?;
    if cur.remaining() != 0 {
        return Err(PageTreeError::decode(format!(
            "record {id} has {} trailing bytes after its node kit",
            cur.remaining()
        )));
    }

    let chain = ancestor_chain(&kit, id)?;
    let data = kit.data();
    let name_fragment = Some(data.name.clone());
    let slug_fragment = (!data.url_segment.is_empty()).then(|| data.url_segment.clone());

    Ok(Candidate {
        id,
        chain,
        uid: Some(kit.node.uid),
        name_fragment,
        slug_fragment,
        props: PropertySource::Records { kit: Arc::new(kit) },
    })
}

/// Split the identity path on commas into the ancestor-id chain and check it
/// actually leads to this record's key.
fn ancestor_chain(kit: &NodeKit, id: NodeId) -> Result<Vec<NodeId>> {
    if kit.node.path.is_empty() {
        return Err(PageTreeError::decode(format!(
            "identity record for node {id} has an empty path"
        )));
    }
    let mut chain = Vec::new();
    for part in kit.node.path.split(',') {
        let entry: NodeId = part.trim().parse().map_err(|_| {
            PageTreeError::decode(format!(
                "identity record for node {id} has a malformed path entry '{part}'"
            ))
        })?;
        chain.push(entry);
    }
    if chain.last() != Some(&id) {
        return Err(PageTreeError::decode(format!(
            "identity record path '{}' does not end at node ID {id}",
            kit.node.path
        )));
    }
    Ok(chain)
}
