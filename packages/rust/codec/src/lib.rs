//! Binary decoding for record snapshots.
//!
//! Three layers, leaves first:
//! - [`tagged`]: primitive and tagged-value reads from a byte cursor
//! - [`record`]: fixed-shape records composed from those primitives
//! - [`snapshot`]: the ordered key-value store the records are fetched from
//!
//! Decoding is strictly sequential and non-recoverable: any primitive
//! failure aborts the enclosing record read. The stream is never written —
//! write support is unsupported and fails loudly when invoked.

pub mod record;
pub mod snapshot;
pub mod tagged;

pub use record::{ContentData, CultureVariant, IdentityRecord, NodeKit};
pub use snapshot::{RecordStore, Snapshot};
pub use tagged::ByteCursor;
