//! Collaborator interfaces between the consistency engine and the
//! surrounding geometry store.
//!
//! The engine owns no storage. Base-table row iteration, shadow-index CRUD,
//! the metadata catalog, and the audit log are all reached through
//! [`GeometryStore`]; the host wires them to its SQL engine, R-tree storage
//! and metadata tables. [`MemoryStore`](crate::MemoryStore) is an
//! in-process implementation for embedding and tests.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::bounding_box::BoundingBox;
use crate::error::SpatialResult;
use crate::geometry::Geometry;

/// Identifies one geometry column of one base table.
///
/// Whether a shadow index is enabled for the pair is recorded in the
/// governing metadata catalog, which the engine only reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexDescriptor {
    table: String,
    column: String,
}

impl IndexDescriptor {
    /// Creates a descriptor for a table/column pair.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// The base table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The geometry column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Derives the shadow index's storage name from the descriptor.
    pub fn index_name(&self) -> String {
        format!("idx_{}_{}", self.table, self.column)
    }
}

impl Display for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Outcome of a consistency check for one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyVerdict {
    /// Base table and shadow index agree.
    Valid,
    /// A mismatch was found (or a recovery attempt failed).
    Invalid,
    /// Validity could not be established, e.g. the index is not enabled or
    /// storage was unavailable. Distinct from Invalid: only Invalid
    /// warrants a rebuild, Indeterminate is a hard stop.
    Indeterminate,
}

impl Display for ConsistencyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyVerdict::Valid => write!(f, "valid"),
            ConsistencyVerdict::Invalid => write!(f, "invalid"),
            ConsistencyVerdict::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// Storage-side services consumed by the consistency engine.
///
/// Implementations map these onto the host store. All methods are
/// synchronous and run in whatever transaction scope the caller has
/// established; a missing table or index surfaces as
/// [`SpatialError::StorageUnavailable`](crate::SpatialError::StorageUnavailable).
pub trait GeometryStore: Send + Sync {
    /// Iterates the rows of `table`, yielding each row's primary key and
    /// the decoded geometry in `column` (`None` for SQL NULL).
    fn geometry_rows(
        &self,
        table: &str,
        column: &str,
    ) -> SpatialResult<Vec<(i64, Option<Geometry>)>>;

    /// Removes every entry of the named shadow index.
    fn index_clear(&self, index_name: &str) -> SpatialResult<()>;

    /// Inserts (or overwrites) one shadow-index entry.
    fn index_insert(&self, index_name: &str, id: i64, rect: BoundingBox) -> SpatialResult<()>;

    /// Counts the entries of the named shadow index.
    fn index_count(&self, index_name: &str) -> SpatialResult<u64>;

    /// Iterates the entries of the named shadow index.
    fn index_entries(&self, index_name: &str) -> SpatialResult<Vec<(i64, BoundingBox)>>;

    /// Whether the catalog declares a shadow index enabled for the
    /// descriptor. Implementations may cache this per call but must not
    /// assume it is immutable across calls.
    fn is_index_enabled(&self, descriptor: &IndexDescriptor) -> SpatialResult<bool>;

    /// Every descriptor the catalog currently declares enabled.
    fn enabled_indexes(&self) -> SpatialResult<Vec<IndexDescriptor>>;

    /// Appends one human-readable line to the audit log. Best-effort; the
    /// engine ignores failures here.
    fn log_event(&self, _descriptor: &IndexDescriptor, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_accessors() {
        let desc = IndexDescriptor::new("roads", "geom");
        assert_eq!(desc.table(), "roads");
        assert_eq!(desc.column(), "geom");
        assert_eq!(format!("{}", desc), "roads.geom");
    }

    #[test]
    fn test_index_name_derivation() {
        let desc = IndexDescriptor::new("roads", "geom");
        assert_eq!(desc.index_name(), "idx_roads_geom");
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(format!("{}", ConsistencyVerdict::Valid), "valid");
        assert_eq!(format!("{}", ConsistencyVerdict::Invalid), "invalid");
        assert_eq!(format!("{}", ConsistencyVerdict::Indeterminate), "indeterminate");
    }
}
