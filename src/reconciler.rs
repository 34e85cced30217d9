//! Base-table / shadow-index reconciliation.
//!
//! The reconciler decides whether a shadow index still reflects its base
//! table: every row with a non-null, non-empty geometry must have exactly
//! one index entry carrying the geometry's truncated bounding rectangle,
//! and every index entry must map back to such a row. Comparison happens
//! at 32-bit float width on both sides, matching the index's storage
//! precision.
//!
//! The check is a read-only snapshot with no isolation of its own: if a
//! concurrent writer mutates the base table mid-check, a torn view may
//! yield either verdict. Callers needing a stable answer must wrap the
//! call in their own transaction scope.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use crate::bounding_box::BoundingBox;
use crate::error::{SpatialError, SpatialResult};
use crate::mbr;
use crate::store::{ConsistencyVerdict, GeometryStore, IndexDescriptor};

/// The first divergence found between a base table and its shadow index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Row and entry totals differ; no row-by-row comparison was run.
    CountDrift { base: u64, index: u64 },
    /// A base-table row has no shadow-index entry.
    MissingEntry(i64),
    /// A shadow-index entry has no base-table row (or the row's geometry
    /// is now null/empty).
    OrphanEntry(i64),
    /// Both sides have the row but the stored rectangle no longer matches
    /// the geometry's truncated rectangle.
    RectangleDrift(i64),
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::CountDrift { base, index } => {
                write!(f, "count drift: {} base rows vs {} index entries", base, index)
            }
            Mismatch::MissingEntry(id) => write!(f, "row {} missing from index", id),
            Mismatch::OrphanEntry(id) => write!(f, "index entry {} has no base row", id),
            Mismatch::RectangleDrift(id) => write!(f, "rectangle drift on row {}", id),
        }
    }
}

/// Compares one shadow index against its base table.
pub struct IndexReconciler<'a> {
    store: &'a dyn GeometryStore,
}

impl<'a> IndexReconciler<'a> {
    /// Creates a reconciler over the given store.
    pub fn new(store: &'a dyn GeometryStore) -> Self {
        Self { store }
    }

    /// Checks one descriptor and reports a verdict.
    ///
    /// Indeterminate means the check could not run: the descriptor is not
    /// enabled in the catalog, or the base table / shadow index was
    /// unavailable. On a completed check one best-effort audit line is
    /// appended.
    pub fn check(&self, descriptor: &IndexDescriptor) -> ConsistencyVerdict {
        match self.store.is_index_enabled(descriptor) {
            Ok(true) => {}
            Ok(false) => {
                log::debug!("{}: no enabled spatial index, nothing to check", descriptor);
                return ConsistencyVerdict::Indeterminate;
            }
            Err(err) => {
                log::warn!("{}: catalog lookup failed: {}", descriptor, err);
                return ConsistencyVerdict::Indeterminate;
            }
        }

        match self.first_mismatch(descriptor) {
            Ok(None) => {
                self.store.log_event(descriptor, "consistent");
                ConsistencyVerdict::Valid
            }
            Ok(Some(mismatch)) => {
                log::debug!("{}: {}", descriptor, mismatch);
                self.store.log_event(descriptor, "inconsistencies detected");
                ConsistencyVerdict::Invalid
            }
            Err(err) => {
                log::warn!("{}: check could not run: {}", descriptor, err);
                ConsistencyVerdict::Indeterminate
            }
        }
    }

    /// Finds the first divergence between base table and shadow index, in
    /// row-id order, or `None` when the two agree.
    ///
    /// Fails with `NotIndexed` when the descriptor has no enabled index
    /// and with `StorageUnavailable` when either side cannot be read.
    pub fn first_mismatch(&self, descriptor: &IndexDescriptor) -> SpatialResult<Option<Mismatch>> {
        if !self.store.is_index_enabled(descriptor)? {
            return Err(SpatialError::NotIndexed {
                table: descriptor.table().to_string(),
                column: descriptor.column().to_string(),
            });
        }

        let index_name = descriptor.index_name();
        let base = self.base_rectangles(descriptor)?;

        // Cheap fast-path: differing totals prove divergence without a
        // row-by-row comparison.
        let index_total = self.store.index_count(&index_name)?;
        if base.len() as u64 != index_total {
            return Ok(Some(Mismatch::CountDrift {
                base: base.len() as u64,
                index: index_total,
            }));
        }

        let index: BTreeMap<i64, BoundingBox> =
            self.store.index_entries(&index_name)?.into_iter().collect();

        // Full outer join over the two id-ordered maps, partitioned into
        // base-only, index-only, and both-but-different, reporting the
        // lowest divergent id.
        let ids: std::collections::BTreeSet<i64> =
            base.keys().chain(index.keys()).copied().collect();
        for id in ids {
            match (base.get(&id), index.get(&id)) {
                (Some(rect), Some(stored)) => {
                    if !rects_equal_f32(rect, stored) {
                        return Ok(Some(Mismatch::RectangleDrift(id)));
                    }
                }
                (Some(_), None) => return Ok(Some(Mismatch::MissingEntry(id))),
                (None, Some(_)) => return Ok(Some(Mismatch::OrphanEntry(id))),
                (None, None) => unreachable!(),
            }
        }

        Ok(None)
    }

    /// The truncated bounding rectangles of every base-table row with a
    /// non-null, non-empty geometry. Null and empty geometries are the
    /// expected "no entry" state, never a mismatch.
    fn base_rectangles(
        &self,
        descriptor: &IndexDescriptor,
    ) -> SpatialResult<BTreeMap<i64, BoundingBox>> {
        let rows = self
            .store
            .geometry_rows(descriptor.table(), descriptor.column())?;

        let mut rects = BTreeMap::new();
        for (id, geometry) in rows {
            let Some(geometry) = geometry else { continue };
            match mbr::bounding_rectangle(&geometry) {
                Ok(rect) => {
                    rects.insert(id, mbr::truncate(&rect));
                }
                Err(SpatialError::EmptyGeometry) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(rects)
    }
}

/// Component-wise equality at the index's 32-bit storage width.
fn rects_equal_f32(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.min_x as f32 == b.min_x as f32
        && a.min_y as f32 == b.min_y as f32
        && a.max_x as f32 == b.max_x as f32
        && a.max_y as f32 == b.max_y as f32
}
