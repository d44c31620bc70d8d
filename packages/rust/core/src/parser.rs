//! End-to-end parse pipeline: sniff the format, collect candidates, build
//! the fragment caches, assemble the node graph.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use pagetree_codec::Snapshot;
use pagetree_markup::Document;
use pagetree_shared::{NodeId, PageTreeError, ParseOptions, Result};

use crate::graph::NodeGraph;
use crate::node::PageNode;
use crate::resolver::FragmentCache;
use crate::sources::{
    Candidate, MarkupSource, NodeSource, PropertySource, RecordSource, URL_ALIAS_KEY,
};

/// Parses one export file into a queryable node graph.
///
/// The whole graph is built during construction; a decode error aborts the
/// constructor and no partial graph is ever exposed.
#[derive(Debug)]
pub struct Parser {
    options: ParseOptions,
    graph: NodeGraph,
}

/// Outcome of trying to read the input as a markup export. Syntax-level
/// failures are not errors — they mean "not this format, try the snapshot
/// decoder" — while domain errors inside a recognized markup tree are fatal.
enum MarkupAttempt {
    Parsed(NodeGraph),
    NotMarkup(String),
}

impl Parser {
    /// Parse an export file with default options.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, ParseOptions::default())
    }

    /// Parse an export file with the given lookup tables.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn with_options(path: impl AsRef<Path>, mut options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(PageTreeError::config("input path is empty"));
        }
        options.normalize();

        let bytes = std::fs::read(path).map_err(|e| PageTreeError::io(path, e))?;

        if sniff_markup(&bytes) {
            match try_markup(&bytes, &options) {
                Ok(MarkupAttempt::Parsed(graph)) => {
                    info!(nodes = graph.len(), "parsed markup export");
                    return Ok(Self { options, graph });
                }
                Ok(MarkupAttempt::NotMarkup(reason)) => {
                    debug!(reason = %reason, "input is not a markup export, trying record snapshot");
                }
                Err(e) => {
                    return Err(PageTreeError::markup(format!(
                        "could not parse {} as a markup export - {e}",
                        path.display()
                    )));
                }
            }
        }

        let graph = parse_snapshot(&bytes, &options).map_err(|e| {
            PageTreeError::decode(format!(
                "could not parse {} as a record snapshot - {e}",
                path.display()
            ))
        })?;
        info!(nodes = graph.len(), "parsed record snapshot");
        Ok(Self { options, graph })
    }

    // -----------------------------------------------------------------------
    // Query surface
    // -----------------------------------------------------------------------

    /// Node by numeric id, or `None`.
    pub fn node(&self, id: NodeId) -> Option<&PageNode> {
        self.graph.get(id)
    }

    /// Node by external unique identifier (hyphenated or compact, case
    /// insensitive), or `None`.
    pub fn node_by_uid(&self, uid: &str) -> Option<&PageNode> {
        self.graph.get_by_uid(uid)
    }

    /// All nodes in source order.
    pub fn nodes(&self) -> impl Iterator<Item = &PageNode> {
        self.graph.iter()
    }

    /// Direct children of a node, in source order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &PageNode> {
        self.graph.children(id)
    }

    /// A node's parent, or `None` for roots.
    pub fn parent(&self, node: &PageNode) -> Option<&PageNode> {
        self.graph.parent(node)
    }

    /// The underlying graph.
    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// The options this parse ran with (prefixes already normalized).
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }
}

/// A markup export starts with `<`, optionally after a UTF-8 byte-order
/// mark. Anything else goes to the snapshot decoder directly.
fn sniff_markup(bytes: &[u8]) -> bool {
    matches!(bytes, [b'<', ..] | [0xef, 0xbb, 0xbf, b'<', ..])
}

fn try_markup(bytes: &[u8], options: &ParseOptions) -> Result<MarkupAttempt> {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return Ok(MarkupAttempt::NotMarkup("input is not valid UTF-8".into()));
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let doc = match Document::parse(text) {
        Ok(doc) => doc,
        Err(e) => return Ok(MarkupAttempt::NotMarkup(e.to_string())),
    };

    let candidates = MarkupSource::new(Arc::new(doc)).collect()?;
    let graph = assemble(candidates, options)?;
    Ok(MarkupAttempt::Parsed(graph))
}

fn parse_snapshot(bytes: &[u8], options: &ParseOptions) -> Result<NodeGraph> {
    let snapshot = Snapshot::from_bytes(bytes)?;
    let candidates = RecordSource::new(&snapshot).collect()?;
    // The store handle is released here; candidates keep their decoded kits.
    drop(snapshot);
    assemble(candidates, options)
}

/// Two-phase assembly: build both fragment caches from the full candidate
/// set, then construct nodes in source order. Parents resolve against
/// already-inserted nodes only, which suffices because both adapters emit
/// ancestors before descendants.
fn assemble(candidates: Vec<Candidate>, options: &ParseOptions) -> Result<NodeGraph> {
    let fragments = FragmentCache::build(&candidates, options);

    let mut graph = NodeGraph::default();
    for cand in candidates {
        let alias = cand
            .props
            .text(URL_ALIAS_KEY)
            .and_then(|raw| first_alias(&raw));
        let url = fragments.resolve_url(&cand.chain, alias.as_deref(), options);
        let path_names = fragments.resolve_display_path(&cand.chain).ok_or_else(|| {
            PageTreeError::validation(format!(
                "node ID {} has an ancestor missing from the node set",
                cand.id
            ))
        })?;

        let node = match &cand.props {
            PropertySource::Markup { .. } => PageNode::from_markup(cand, url, path_names)?,
            PropertySource::Records { .. } => {
                PageNode::from_records(cand, url, path_names, options)?
            }
        };
        graph.insert(node)?;
    }
    Ok(graph)
}

/// First comma-separated alias entry, kept verbatim; blank entries count as
/// no alias at all.
fn first_alias(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    let first = raw.split(',').next().unwrap_or("");
    if first.trim().is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffing_recognizes_markup_and_boms() {
        assert!(sniff_markup(b"<root/>"));
        assert!(sniff_markup(b"\xef\xbb\xbf<root/>"));
        assert!(!sniff_markup(b"\x01\x02\x03"));
        assert!(!sniff_markup(b""));
        assert!(!sniff_markup(b"\xef\xbb\xbfnot markup"));
    }

    #[test]
    fn alias_takes_first_nonblank_entry() {
        assert_eq!(first_alias("foo,bar"), Some("foo".to_string()));
        assert_eq!(first_alias("foo"), Some("foo".to_string()));
        assert_eq!(first_alias("  "), None);
        assert_eq!(first_alias(",foo"), None);
    }
}
