//! Fixed-shape records decoded from the tagged byte stream.
//!
//! Field order is part of the wire format and must not be reordered: the
//! stream carries no delimiters, so reading one field out of order silently
//! corrupts every later field.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use uuid::Uuid;

use pagetree_shared::{NodeId, PageTreeError, PropertyValue, Result};

use crate::tagged::{ByteCursor, read_string_opt, read_value};

/// Structural identity of one node: everything common to its draft and
/// published variants.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    pub id: NodeId,
    pub uid: Uuid,
    pub level: i32,
    /// Comma-separated ancestor ids from the root sentinel to this node.
    pub path: String,
    pub sort_order: i32,
    pub parent_id: NodeId,
    pub create_date: NaiveDateTime,
    pub creator_id: i32,
}

impl IdentityRecord {
    pub fn decode(cur: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self {
            id: cur.read_i32("node id")?,
            uid: cur.read_uuid("node uid")?,
            level: cur.read_i32("node level")?,
            path: cur.read_string("node path")?,
            sort_order: cur.read_i32("sort order")?,
            parent_id: cur.read_i32("parent id")?,
            create_date: cur.read_datetime("create date")?,
            creator_id: cur.read_i32("creator id")?,
        })
    }
}

/// One versioned content variant (draft or published) of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentData {
    pub published: bool,
    pub name: String,
    pub url_segment: String,
    pub version_id: i32,
    pub version_date: NaiveDateTime,
    pub writer_id: i32,
    pub template_id: i32,
    /// Property key → decoded values; the first value is authoritative for
    /// singular access.
    pub properties: HashMap<String, Vec<PropertyValue>>,
    pub cultures: HashMap<String, CultureVariant>,
}

impl ContentData {
    pub fn decode(cur: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self {
            published: cur.read_bool("published flag")?,
            name: cur.read_string("content name")?,
            url_segment: cur.read_string("url segment")?,
            version_id: cur.read_i32("version id")?,
            version_date: cur.read_datetime("version date")?,
            writer_id: cur.read_i32("writer id")?,
            template_id: cur.read_i32("template id")?,
            properties: decode_properties(cur)?,
            cultures: decode_cultures(cur)?,
        })
    }
}

/// Per-language overlay of name, URL segment and date for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct CultureVariant {
    pub name: Option<String>,
    pub url_segment: Option<String>,
    pub date: NaiveDateTime,
}

fn decode_properties(cur: &mut ByteCursor<'_>) -> Result<HashMap<String, Vec<PropertyValue>>> {
    let count = cur.read_i32("property count")?;
    if count < 0 {
        return Err(PageTreeError::decode(format!(
            "negative property count {count}"
        )));
    }
    let mut properties = HashMap::with_capacity(count as usize);
    for _ in 0..count {
        let key = cur.read_string("property key")?;
        let value_count = cur.read_i32("property value count")?;
        if value_count < 0 {
            return Err(PageTreeError::decode(format!(
                "negative value count {value_count} for property '{key}'"
            )));
        }
        let mut values = Vec::with_capacity(value_count as usize);
        for _ in 0..value_count {
            values.push(read_value(cur)?);
        }
        properties.insert(key, values);
    }
    Ok(properties)
}

fn decode_cultures(cur: &mut ByteCursor<'_>) -> Result<HashMap<String, CultureVariant>> {
    let count = cur.read_i32("culture variant count")?;
    if count < 0 {
        return Err(PageTreeError::decode(format!(
            "negative culture variant count {count}"
        )));
    }
    let mut cultures = HashMap::with_capacity(count as usize);
    for _ in 0..count {
        let culture = cur.read_string("culture key")?;
        let variant = CultureVariant {
            name: read_string_opt(cur)?,
            url_segment: read_string_opt(cur)?,
            date: cur.read_datetime("culture date")?,
        };
        cultures.insert(culture, variant);
    }
    Ok(cultures)
}

// ---------------------------------------------------------------------------
// NodeKit
// ---------------------------------------------------------------------------

/// The composite record stored per key: identity plus up to two content
/// variants. At least one variant is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeKit {
    pub node: IdentityRecord,
    pub content_type_id: i32,
    pub draft: Option<ContentData>,
    pub published: Option<ContentData>,
}

impl NodeKit {
    pub fn decode(cur: &mut ByteCursor<'_>) -> Result<Self> {
        let node = IdentityRecord::decode(cur)?;
        let content_type_id = cur.read_i32("content type id")?;
        let draft = if cur.read_bool("draft flag")? {
            Some(ContentData::decode(cur)?)
        } else {
            None
        };
        let published = if cur.read_bool("published flag")? {
            Some(ContentData::decode(cur)?)
        } else {
            None
        };
        if draft.is_none() && published.is_none() {
            return Err(PageTreeError::decode(format!(
                "node kit {} carries neither a draft nor a published variant",
                node.id
            )));
        }
        Ok(Self {
            node,
            content_type_id,
            draft,
            published,
        })
    }

    /// Writing snapshots is unsupported: the source formats are read-only
    /// inputs. Fails loudly rather than silently producing nothing.
    pub fn write_to(&self, _out: &mut Vec<u8>) -> Result<()> {
        Err(PageTreeError::decode(
            "encoding node kits is not supported; snapshots are read-only",
        ))
    }

    /// The authoritative content variant: published if present, else draft.
    pub fn data(&self) -> &ContentData {
        self.published
            .as_ref()
            .or(self.draft.as_ref())
            .expect("node kit carries at least one content variant")
    }

    /// First decoded value of the named property in the authoritative
    /// variant, or `None` if the key is absent or has no values.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.data().properties.get(name)?.first()
    }
}
