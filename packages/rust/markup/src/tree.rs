//! Arena-backed element tree built from a `quick-xml` event stream.
//!
//! Every node records its byte span in the source, so raw inner markup can be
//! returned as an exact slice of the input (entities still escaped, CDATA
//! wrappers intact) while decoded text is available separately.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

/// Syntax-level parse failure: the input is not well-formed markup.
#[derive(Debug, thiserror::Error)]
#[error("markup syntax error: {0}")]
pub struct SyntaxError(String);

type NodeIx = usize;

#[derive(Debug)]
enum NodeData {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    /// Character data with entities decoded.
    Text(String),
    /// CDATA section content, byte-for-byte.
    CData(String),
}

#[derive(Debug)]
struct XmlNode {
    parent: Option<NodeIx>,
    children: Vec<NodeIx>,
    data: NodeData,
    /// Outer byte span in the source (tags included).
    start: usize,
    end: usize,
    /// Byte span between the start and end tags (elements only).
    inner_start: usize,
    inner_end: usize,
}

/// A parsed, immutable markup document.
#[derive(Debug)]
pub struct Document {
    source: String,
    nodes: Vec<XmlNode>,
    root: Option<NodeIx>,
}

impl Document {
    /// Parse a markup document. The source must start at the first markup
    /// byte (any byte-order mark already stripped by the caller).
    pub fn parse(source: &str) -> Result<Document, SyntaxError> {
        let mut reader = Reader::from_str(source);
        let mut nodes: Vec<XmlNode> = Vec::new();
        let mut stack: Vec<NodeIx> = Vec::new();
        let mut root: Option<NodeIx> = None;

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader
                .read_event()
                .map_err(|e| SyntaxError(e.to_string()))?;
            let end = reader.buffer_position() as usize;

            match event {
                Event::Start(e) => {
                    let ix = push_node(
                        &mut nodes,
                        &mut stack,
                        NodeData::Element {
                            name: name_of(e.name().as_ref()),
                            attrs: read_attrs(&e)?,
                        },
                        start,
                        end,
                    );
                    // Inner span begins after the start tag; the end is
                    // patched in when the matching end tag arrives.
                    nodes[ix].inner_start = end;
                    nodes[ix].inner_end = end;
                    if stack.is_empty() && root.is_none() {
                        root = Some(ix);
                    }
                    stack.push(ix);
                }
                Event::End(e) => {
                    let ix = stack.pop().ok_or_else(|| {
                        SyntaxError("end tag without matching start tag".into())
                    })?;
                    let name = name_of(e.name().as_ref());
                    if element_name(&nodes[ix]) != name {
                        return Err(SyntaxError(format!(
                            "end tag '{name}' does not match open element '{}'",
                            element_name(&nodes[ix])
                        )));
                    }
                    nodes[ix].inner_end = start;
                    nodes[ix].end = end;
                }
                Event::Empty(e) => {
                    let ix = push_node(
                        &mut nodes,
                        &mut stack,
                        NodeData::Element {
                            name: name_of(e.name().as_ref()),
                            attrs: read_attrs(&e)?,
                        },
                        start,
                        end,
                    );
                    nodes[ix].inner_start = end;
                    nodes[ix].inner_end = end;
                    if stack.is_empty() && root.is_none() {
                        root = Some(ix);
                    }
                }
                Event::Text(e) => {
                    let decoded = e
                        .unescape()
                        .map_err(|e| SyntaxError(e.to_string()))?
                        .into_owned();
                    if !stack.is_empty() {
                        push_node(&mut nodes, &mut stack, NodeData::Text(decoded), start, end);
                    }
                }
                Event::CData(e) => {
                    let content = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    if !stack.is_empty() {
                        push_node(&mut nodes, &mut stack, NodeData::CData(content), start, end);
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and
                // doctype declarations carry no tree structure.
                _ => {}
            }
        }

        if let Some(ix) = stack.pop() {
            return Err(SyntaxError(format!(
                "unclosed element '{}'",
                element_name(&nodes[ix])
            )));
        }
        let root = root.ok_or_else(|| SyntaxError("document has no root element".into()))?;

        debug!(nodes = nodes.len(), "parsed markup document");
        Ok(Document {
            source: source.to_string(),
            nodes,
            root: Some(root),
        })
    }

    /// The document's root element.
    pub fn root(&self) -> Element<'_> {
        Element {
            doc: self,
            ix: self.root.expect("document always has a root"),
        }
    }

    /// All elements in document order, root included.
    pub fn descendants(&self) -> impl Iterator<Item = Element<'_>> {
        // Nodes are pushed in document order during the event scan, so a
        // plain filter preserves preorder.
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n.data, NodeData::Element { .. }))
            .map(|(ix, _)| Element { doc: self, ix })
    }

    /// Rebuild an element handle from an index previously obtained via
    /// [`Element::index`].
    pub fn element(&self, ix: usize) -> Element<'_> {
        debug_assert!(matches!(self.nodes[ix].data, NodeData::Element { .. }));
        Element { doc: self, ix }
    }
}

fn push_node(
    nodes: &mut Vec<XmlNode>,
    stack: &mut [NodeIx],
    data: NodeData,
    start: usize,
    end: usize,
) -> NodeIx {
    let parent = stack.last().copied();
    let ix = nodes.len();
    nodes.push(XmlNode {
        parent,
        children: Vec::new(),
        data,
        start,
        end,
        inner_start: end,
        inner_end: end,
    });
    if let Some(p) = parent {
        nodes[p].children.push(ix);
    }
    ix
}

fn name_of(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn read_attrs(
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<Vec<(String, String)>, SyntaxError> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| SyntaxError(e.to_string()))?;
        let key = name_of(attr.key.as_ref());
        let value = attr
            .unescape_value()
            .map_err(|e| SyntaxError(e.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn element_name(node: &XmlNode) -> &str {
    match &node.data {
        NodeData::Element { name, .. } => name,
        _ => "",
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// Lightweight handle to one element of a [`Document`].
#[derive(Clone, Copy)]
pub struct Element<'a> {
    doc: &'a Document,
    ix: NodeIx,
}

impl<'a> Element<'a> {
    fn node(&self) -> &'a XmlNode {
        &self.doc.nodes[self.ix]
    }

    /// Stable index of this element within its document.
    pub fn index(&self) -> usize {
        self.ix
    }

    /// Tag name as written in the source.
    pub fn name(&self) -> &'a str {
        match &self.node().data {
            NodeData::Element { name, .. } => name,
            _ => unreachable!("element handle points at a non-element node"),
        }
    }

    /// Attribute value (entities decoded), or `None` if absent.
    pub fn attr(&self, key: &str) -> Option<&'a str> {
        match &self.node().data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Element<'a>> {
        self.node().parent.map(|ix| Element { doc: self.doc, ix })
    }

    /// Direct child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        let doc = self.doc;
        self.node()
            .children
            .iter()
            .copied()
            .filter(move |&ix| matches!(doc.nodes[ix].data, NodeData::Element { .. }))
            .map(move |ix| Element { doc, ix })
    }

    /// First direct child element with the given tag name (case sensitive).
    pub fn child_element(&self, name: &str) -> Option<Element<'a>> {
        self.child_elements().find(|el| el.name() == name)
    }

    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Concatenated decoded text of this element's whole subtree, in
    /// document order. CDATA content is included byte-for-byte.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self.doc, self.ix, &mut out);
        out
    }

    /// Raw source slice between this element's start and end tags: entities
    /// still escaped, CDATA wrappers intact.
    pub fn inner_raw(&self) -> &'a str {
        let node = self.node();
        &self.doc.source[node.inner_start..node.inner_end]
    }

    /// Raw source slice of the first child node that is an element, a CDATA
    /// section, or non-whitespace text. `None` when the element has no such
    /// child.
    pub fn first_child_node_raw(&self) -> Option<&'a str> {
        for &ix in &self.node().children {
            let child = &self.doc.nodes[ix];
            match &child.data {
                NodeData::Element { .. } | NodeData::CData(_) => {
                    return Some(&self.doc.source[child.start..child.end]);
                }
                NodeData::Text(t) => {
                    if !t.trim().is_empty() {
                        return Some(&self.doc.source[child.start..child.end]);
                    }
                }
            }
        }
        None
    }
}

fn collect_text(doc: &Document, ix: NodeIx, out: &mut String) {
    match &doc.nodes[ix].data {
        NodeData::Text(t) | NodeData::CData(t) => out.push_str(t),
        NodeData::Element { .. } => {
            for &child in &doc.nodes[ix].children {
                collect_text(doc, child, out);
            }
        }
    }
}
