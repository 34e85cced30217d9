//! Shadow-index rebuild.
//!
//! Rebuilding makes a shadow index consistent with its base table
//! unconditionally: clear everything, then re-insert one truncated
//! rectangle per non-null, non-empty geometry row. The engine performs the
//! clear and the inserts as ordinary data-manipulation calls against the
//! store; atomicity comes from the caller's transaction scope. A failure
//! partway through always propagates — stale half-old/half-new state is
//! never silently left behind.

use crate::error::{SpatialError, SpatialResult};
use crate::mbr;
use crate::store::{GeometryStore, IndexDescriptor};

/// Rebuilds shadow indexes from their base tables.
pub struct IndexRebuilder<'a> {
    store: &'a dyn GeometryStore,
}

impl<'a> IndexRebuilder<'a> {
    /// Creates a rebuilder over the given store.
    pub fn new(store: &'a dyn GeometryStore) -> Self {
        Self { store }
    }

    /// Empties and repopulates the descriptor's shadow index.
    ///
    /// Fails with [`SpatialError::NotIndexed`] when the descriptor has no
    /// enabled index, and with [`SpatialError::RebuildFailure`] when a
    /// clear or insert step fails mid-rebuild.
    pub fn rebuild(&self, descriptor: &IndexDescriptor) -> SpatialResult<()> {
        if !self.store.is_index_enabled(descriptor)? {
            return Err(SpatialError::NotIndexed {
                table: descriptor.table().to_string(),
                column: descriptor.column().to_string(),
            });
        }

        let index_name = descriptor.index_name();
        let rows = self
            .store
            .geometry_rows(descriptor.table(), descriptor.column())?;

        log::debug!("{}: rebuilding shadow index from {} rows", descriptor, rows.len());

        self.store
            .index_clear(&index_name)
            .map_err(|err| SpatialError::RebuildFailure(format!("clear failed: {}", err)))?;

        let mut inserted: u64 = 0;
        for (id, geometry) in rows {
            let Some(geometry) = geometry else { continue };
            let rect = match mbr::bounding_rectangle(&geometry) {
                Ok(rect) => rect,
                Err(SpatialError::EmptyGeometry) => continue,
                Err(err) => return Err(err),
            };
            self.store
                .index_insert(&index_name, id, mbr::truncate(&rect))
                .map_err(|err| {
                    SpatialError::RebuildFailure(format!("insert of row {} failed: {}", id, err))
                })?;
            inserted += 1;
        }

        log::debug!("{}: rebuild complete, {} entries", descriptor, inserted);
        Ok(())
    }
}
