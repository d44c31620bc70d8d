//! Core domain types shared by the decoders and the node graph.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Numeric identifier of a content node within one export.
pub type NodeId = i32;

/// Conventional id of the invisible tree root. Ancestor chains start with it;
/// it is excluded from stored paths and never materializes as a node.
pub const ROOT_SENTINEL: NodeId = -1;

/// Normalize an external unique identifier to its 32-hex-digit lowercase
/// form (hyphens stripped). Accepts hyphenated or compact input, any case.
pub fn compact_uid(raw: &str) -> String {
    raw.replace('-', "").to_lowercase()
}

// ---------------------------------------------------------------------------
// PropertyValue
// ---------------------------------------------------------------------------

/// One decoded typed value of a node property.
///
/// Binary sources store properties as lists of tagged values; the first value
/// is authoritative for singular access. Markup sources only ever produce
/// [`PropertyValue::Text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Explicitly absent value (`N` tag).
    Null,
    Text(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Date(NaiveDateTime),
}

impl PropertyValue {
    /// The string projection used by singular property access, or `None`
    /// for an explicitly absent value.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PropertyValue::Null => None,
            PropertyValue::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// The stored timestamp, if this value is a typed date.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            PropertyValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Null => Ok(()),
            PropertyValue::Text(s) => write!(f, "{s}"),
            PropertyValue::Int(i) => write!(f, "{i}"),
            PropertyValue::Long(l) => write!(f, "{l}"),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::Double(v) => write!(f, "{v}"),
            // Same textual shape the markup source uses for date properties.
            PropertyValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn compact_uid_normalizes_both_forms() {
        assert_eq!(
            compact_uid("EC4AAFCC-0C25-4F25-A8FE-705BFAE1D324"),
            "ec4aafcc0c254f25a8fe705bfae1d324"
        );
        assert_eq!(
            compact_uid("ec4aafcc0c254f25a8fe705bfae1d324"),
            "ec4aafcc0c254f25a8fe705bfae1d324"
        );
    }

    #[test]
    fn text_projection() {
        assert_eq!(PropertyValue::Null.as_text(), None);
        assert_eq!(
            PropertyValue::Text("hi".into()).as_text(),
            Some("hi".to_string())
        );
        assert_eq!(PropertyValue::Int(0).as_text(), Some("0".to_string()));

        let date = NaiveDate::from_ymd_opt(2019, 10, 19)
            .unwrap()
            .and_hms_opt(13, 15, 0)
            .unwrap();
        assert_eq!(
            PropertyValue::Date(date).as_text(),
            Some("2019-10-19T13:15:00".to_string())
        );
    }
}
