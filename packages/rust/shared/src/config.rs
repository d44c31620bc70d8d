//! Parse options: the lookup tables consumed opaquely by the parser.
//!
//! All three tables are optional. They can be built in code or loaded from a
//! TOML file shaped as lists of `{ id, value }` entries:
//!
//! ```toml
//! [[url_prefixes]]
//! id = 1069
//! value = "https://www.example.com"
//!
//! [[users]]
//! id = -1
//! value = "admin"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PageTreeError, Result};
use crate::types::NodeId;

/// Lookup tables applied while building the node graph.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Node id → URL prefix. A mapped node's URL fragment is replaced by the
    /// prefix instead of its slug.
    pub url_prefixes: HashMap<NodeId, String>,

    /// Node id → doctype name. Lets a record-sourced node report a name
    /// rather than its numeric content-type id. Record snapshots only.
    pub doctypes: HashMap<NodeId, String>,

    /// User id → display name for creator/writer resolution. Record
    /// snapshots only.
    pub users: HashMap<NodeId, String>,
}

impl ParseOptions {
    /// Load options from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| PageTreeError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Load options from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: OptionsFile = toml::from_str(content)
            .map_err(|e| PageTreeError::config(format!("invalid options file: {e}")))?;
        Ok(file.into())
    }

    /// Strip a single trailing slash from every URL prefix. Applied once
    /// before parsing begins so fragment joins never double the separator.
    pub fn normalize(&mut self) {
        for prefix in self.url_prefixes.values_mut() {
            if let Some(trimmed) = prefix.strip_suffix('/') {
                *prefix = trimmed.to_string();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TOML schema
// ---------------------------------------------------------------------------

/// One `{ id, value }` mapping entry in the options file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MappingEntry {
    id: NodeId,
    value: String,
}

/// On-disk shape of the options file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct OptionsFile {
    #[serde(default)]
    url_prefixes: Vec<MappingEntry>,
    #[serde(default)]
    doctypes: Vec<MappingEntry>,
    #[serde(default)]
    users: Vec<MappingEntry>,
}

impl From<OptionsFile> for ParseOptions {
    fn from(file: OptionsFile) -> Self {
        let to_map = |entries: Vec<MappingEntry>| {
            entries.into_iter().map(|e| (e.id, e.value)).collect()
        };
        ParseOptions {
            url_prefixes: to_map(file.url_prefixes),
            doctypes: to_map(file.doctypes),
            users: to_map(file.users),
        }
    }
}
