//! Text normalization for raw property values.
//!
//! Contract: strip one enclosing CDATA wrapper verbatim (no further
//! unescaping of the inner bytes); otherwise unescape entities. Unknown
//! entities are left as-is rather than failing — this is a best-effort
//! primitive, not a validator.

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Normalize a raw markup value for bulk property listing.
pub fn normalize_text(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix(CDATA_OPEN) {
        let inner = rest.strip_suffix(CDATA_CLOSE).unwrap_or(rest);
        return inner.to_string();
    }
    match quick_xml::escape::unescape(raw) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => raw.to_string(),
    }
}
