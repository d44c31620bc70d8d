//! The normalized content node and its typed property access.

use std::collections::HashMap;

use chrono::{NaiveDateTime, Timelike};

use pagetree_codec::CultureVariant;
use pagetree_markup::{Document, normalize_text};
use pagetree_shared::{NodeId, PageTreeError, ParseOptions, PropertyValue, ROOT_SENTINEL, Result};

use crate::sources::{Candidate, PropertySource};

/// Textual timestamp format used by markup attributes and date properties.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One content node of the parsed export.
///
/// Nodes are immutable once the graph is built. `parent` and `children` are
/// queries on [`crate::NodeGraph`], which owns every node.
#[derive(Debug)]
pub struct PageNode {
    pub id: NodeId,
    /// External unique identifier in 32-hex-digit lowercase form. Record
    /// snapshots only.
    pub uid: Option<String>,
    /// `None` only for roots.
    pub parent_id: Option<NodeId>,
    pub name: String,
    /// `None` signals the URL could not be resolved.
    pub url: Option<String>,
    /// Element tag name (markup) or content-type id, possibly remapped
    /// (records).
    pub doctype: String,
    /// 1 for roots, else parent level + 1.
    pub level: i32,
    pub create_date: NaiveDateTime,
    pub update_date: NaiveDateTime,
    pub creator_name: Option<String>,
    pub writer_name: Option<String>,
    pub template_id: i32,
    /// Ancestor ids from root to self, root sentinel excluded.
    pub path_ids: Vec<NodeId>,
    /// Ancestor display names, same length as `path_ids`.
    pub path_names: Vec<String>,

    props: PropertySource,
}

impl PageNode {
    /// Build a node from a markup candidate.
    pub(crate) fn from_markup(
        cand: Candidate,
        url: Option<String>,
        path_names: Vec<String>,
    ) -> Result<Self> {
        let (doc, element) = match &cand.props {
            PropertySource::Markup { doc, element } => (doc.clone(), *element),
            PropertySource::Records { .. } => {
                unreachable!("markup constructor called with a record candidate")
            }
        };
        let el = doc.element(element);
        let id = cand.id;

        let create_date = parse_date_attr(&el, "createDate", id)?;
        let update_date = parse_date_attr(&el, "updateDate", id)?;
        let creator_name = el.attr("creatorName").map(str::to_string);
        let writer_name = el.attr("writerName").map(str::to_string);
        let template_id = match el.attr("template") {
            None => 0,
            Some(raw) if raw.trim().is_empty() => 0,
            Some(raw) => raw.trim().parse().map_err(|_| {
                PageTreeError::markup(format!(
                    "unparsable template attribute '{raw}' on node ID {id}"
                ))
            })?,
        };
        let doctype = el.name().to_string();

        Self::assemble(
            cand,
            url,
            path_names,
            NodeParts {
                uid: None,
                doctype,
                create_date,
                update_date,
                creator_name,
                writer_name,
                template_id,
            },
        )
    }

    /// Build a node from a record-snapshot candidate.
    pub(crate) fn from_records(
        cand: Candidate,
        url: Option<String>,
        path_names: Vec<String>,
        options: &ParseOptions,
    ) -> Result<Self> {
        let kit = match &cand.props {
            PropertySource::Records { kit } => kit.clone(),
            PropertySource::Markup { .. } => {
                unreachable!("record constructor called with a markup candidate")
            }
        };

        let doctype = options
            .doctypes
            .get(&cand.id)
            .cloned()
            .unwrap_or_else(|| kit.content_type_id.to_string());
        let create_date = truncate_to_seconds(kit.node.create_date);
        let update_date = kit
            .published
            .as_ref()
            .map(|p| truncate_to_seconds(p.version_date))
            .unwrap_or(create_date);
        let creator_name = Some(resolve_user(options, kit.node.creator_id));
        let writer_name = kit
            .published
            .as_ref()
            .map(|p| resolve_user(options, p.writer_id));
        let template_id = kit.published.as_ref().map(|p| p.template_id).unwrap_or(0);
        let uid = cand.uid.map(|u| u.simple().to_string());

        Self::assemble(
            cand,
            url,
            path_names,
            NodeParts {
                uid,
                doctype,
                create_date,
                update_date,
                creator_name,
                writer_name,
                template_id,
            },
        )
    }

    /// Shared normalization: derive path ids, parent and level from the
    /// ancestor chain and attach the source-specific parts.
    fn assemble(
        cand: Candidate,
        url: Option<String>,
        path_names: Vec<String>,
        parts: NodeParts,
    ) -> Result<Self> {
        let path_ids: Vec<NodeId> = cand
            .chain
            .iter()
            .copied()
            .filter(|&id| id != ROOT_SENTINEL)
            .collect();
        debug_assert_eq!(path_ids.len(), path_names.len());

        let parent_id = if path_ids.len() >= 2 {
            Some(path_ids[path_ids.len() - 2])
        } else {
            None
        };
        let name = path_names.last().cloned().ok_or_else(|| {
            PageTreeError::validation(format!("no display name resolved for node ID {}", cand.id))
        })?;
        let level = path_ids.len() as i32;

        Ok(Self {
            id: cand.id,
            uid: parts.uid,
            parent_id,
            name,
            url,
            doctype: parts.doctype,
            level,
            create_date: parts.create_date,
            update_date: parts.update_date,
            creator_name: parts.creator_name,
            writer_name: parts.writer_name,
            template_id: parts.template_id,
            path_ids,
            path_names,
            props: cand.props,
        })
    }

    // -----------------------------------------------------------------------
    // Typed property access
    // -----------------------------------------------------------------------

    /// The named property as a string, or `None` if absent. Case sensitive.
    pub fn property_str(&self, name: &str) -> Option<String> {
        self.props.text(name)
    }

    /// The named property as a bool. Only the stored value `"1"` is true;
    /// any other value, including absent, is false.
    pub fn property_bool(&self, name: &str) -> bool {
        self.property_str(name).as_deref() == Some("1")
    }

    /// The named property as an integer. Absent or blank is `None`; a
    /// non-integer value is an error, not a miss.
    pub fn property_int(&self, name: &str) -> Result<Option<i32>> {
        match self.property_str(name) {
            None => Ok(None),
            Some(v) if v.trim().is_empty() => Ok(None),
            Some(v) => v.trim().parse().map(Some).map_err(|_| {
                PageTreeError::validation(format!(
                    "property '{name}' value '{v}' on node ID {} is not an integer",
                    self.id
                ))
            }),
        }
    }

    /// The named property as a timestamp. Markup values must match
    /// `yyyy-MM-ddTHH:mm:ss` exactly (anything else is an error); record
    /// values yield their stored typed timestamp or `None` when the value
    /// is not a date.
    pub fn property_date(&self, name: &str) -> Result<Option<NaiveDateTime>> {
        match &self.props {
            PropertySource::Markup { .. } => match self.property_str(name) {
                None => Ok(None),
                Some(v) if v.trim().is_empty() => Ok(None),
                Some(v) => NaiveDateTime::parse_from_str(&v, DATE_FORMAT)
                    .map(Some)
                    .map_err(|_| {
                        PageTreeError::markup(format!(
                            "unparsable date property '{name}' value '{v}' on node ID {}",
                            self.id
                        ))
                    }),
            },
            PropertySource::Records { kit } => {
                Ok(kit.property(name).and_then(|v| v.as_date()))
            }
        }
    }

    /// The named property as nested markup: when the value has child
    /// elements, the serialized form of its first child node only. `None`
    /// when the property is absent or has no child elements.
    pub fn property_xml(&self, name: &str) -> Result<Option<String>> {
        match &self.props {
            PropertySource::Markup { doc, element } => {
                let Some(el) = doc.element(*element).child_element(name) else {
                    return Ok(None);
                };
                if el.has_child_elements() {
                    Ok(el.first_child_node_raw().map(str::to_string))
                } else {
                    Ok(None)
                }
            }
            PropertySource::Records { kit } => {
                let Some(PropertyValue::Text(raw)) = kit.property(name) else {
                    return Ok(None);
                };
                let parsed = Document::parse(raw).map_err(|e| {
                    PageTreeError::markup(format!(
                        "property '{name}' on node ID {} is not well-formed markup: {e}",
                        self.id
                    ))
                })?;
                let root = parsed.root();
                if root.has_child_elements() {
                    Ok(root.first_child_node_raw().map(str::to_string))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// All properties as strings. Markup values are normalized: a CDATA
    /// wrapper is stripped verbatim, otherwise entities are unescaped.
    /// Record properties with an absent first value are omitted.
    pub fn properties(&self) -> HashMap<String, String> {
        match &self.props {
            PropertySource::Markup { doc, element } => doc
                .element(*element)
                .child_elements()
                .map(|child| (child.name().to_string(), normalize_text(child.inner_raw())))
                .collect(),
            PropertySource::Records { kit } => kit
                .data()
                .properties
                .iter()
                .filter_map(|(key, values)| {
                    let text = values.first().and_then(|v| v.as_text())?;
                    Some((key.clone(), text))
                })
                .collect(),
        }
    }

    /// All properties with their decoded types. Markup sources only carry
    /// strings; record sources keep the typed first value (absent values
    /// included as [`PropertyValue::Null`]).
    pub fn typed_properties(&self) -> HashMap<String, PropertyValue> {
        match &self.props {
            PropertySource::Markup { .. } => self
                .properties()
                .into_iter()
                .map(|(key, value)| (key, PropertyValue::Text(value)))
                .collect(),
            PropertySource::Records { kit } => kit
                .data()
                .properties
                .iter()
                .filter_map(|(key, values)| {
                    values.first().map(|v| (key.clone(), v.clone()))
                })
                .collect(),
        }
    }

    /// Per-culture overlays of the authoritative content variant. `None`
    /// for markup-sourced nodes, which carry no culture data.
    pub fn cultures(&self) -> Option<&HashMap<String, CultureVariant>> {
        match &self.props {
            PropertySource::Markup { .. } => None,
            PropertySource::Records { kit } => Some(&kit.data().cultures),
        }
    }
}

/// Source-specific parts handed to the shared normalization step.
struct NodeParts {
    uid: Option<String>,
    doctype: String,
    create_date: NaiveDateTime,
    update_date: NaiveDateTime,
    creator_name: Option<String>,
    writer_name: Option<String>,
    template_id: i32,
}

fn parse_date_attr(
    el: &pagetree_markup::Element<'_>,
    attr: &str,
    id: NodeId,
) -> Result<NaiveDateTime> {
    let raw = el.attr(attr).ok_or_else(|| {
        PageTreeError::markup(format!("missing {attr} attribute on node ID {id}"))
    })?;
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        PageTreeError::markup(format!(
            "unparsable {attr} attribute '{raw}' on node ID {id}"
        ))
    })
}

fn truncate_to_seconds(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).expect("zero nanosecond is valid")
}

fn resolve_user(options: &ParseOptions, user_id: i32) -> String {
    options
        .users
        .get(&user_id)
        .cloned()
        .unwrap_or_else(|| user_id.to_string())
}
