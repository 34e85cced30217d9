//! In-process [`GeometryStore`] implementation.
//!
//! `MemoryStore` keeps tables, shadow indexes, the catalog and the audit
//! log in plain maps behind an `RwLock`. It backs embedded use and every
//! scenario test in this crate, and adds two test-oriented affordances:
//! write counters (to observe no-op recovery fast paths) and one-shot
//! fault injection on insert (to exercise mid-rebuild failure).

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::bounding_box::BoundingBox;
use crate::error::{SpatialError, SpatialResult};
use crate::geometry::Geometry;
use crate::store::{GeometryStore, IndexDescriptor};

#[derive(Default)]
struct MemoryStoreInner {
    /// table name -> (row id -> geometry or NULL)
    tables: BTreeMap<String, BTreeMap<i64, Option<Geometry>>>,
    /// index name -> (row id -> stored rectangle)
    indexes: BTreeMap<String, BTreeMap<i64, BoundingBox>>,
    /// catalog of enabled (table, column) pairs
    enabled: BTreeSet<IndexDescriptor>,
    audit: Vec<String>,
    clear_count: u64,
    insert_count: u64,
    fail_next_insert: bool,
}

/// An in-memory geometry store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty base table.
    pub fn create_table(&self, table: &str) {
        self.inner
            .write()
            .tables
            .entry(table.to_string())
            .or_default();
    }

    /// Inserts or replaces one row's geometry (`None` for NULL).
    pub fn put_geometry(&self, table: &str, id: i64, geometry: Option<Geometry>) {
        self.inner
            .write()
            .tables
            .entry(table.to_string())
            .or_default()
            .insert(id, geometry);
    }

    /// Deletes one row from a base table.
    pub fn remove_row(&self, table: &str, id: i64) {
        if let Some(rows) = self.inner.write().tables.get_mut(table) {
            rows.remove(&id);
        }
    }

    /// Marks a descriptor enabled in the catalog and materializes its
    /// (empty) shadow index.
    pub fn enable_index(&self, descriptor: &IndexDescriptor) {
        let mut inner = self.inner.write();
        inner
            .indexes
            .entry(descriptor.index_name())
            .or_default();
        inner.enabled.insert(descriptor.clone());
    }

    /// Removes a descriptor from the catalog. The shadow index data is
    /// left behind, as schema-management functions own its lifecycle.
    pub fn disable_index(&self, descriptor: &IndexDescriptor) {
        self.inner.write().enabled.remove(descriptor);
    }

    /// Writes one shadow-index entry directly, bypassing truncation.
    /// Intended for seeding divergent states in tests.
    pub fn index_put_raw(&self, index_name: &str, id: i64, rect: BoundingBox) {
        self.inner
            .write()
            .indexes
            .entry(index_name.to_string())
            .or_default()
            .insert(id, rect);
    }

    /// Makes the next `index_insert` call fail.
    pub fn fail_next_insert(&self) {
        self.inner.write().fail_next_insert = true;
    }

    /// Number of `index_clear` calls served so far.
    pub fn clear_count(&self) -> u64 {
        self.inner.read().clear_count
    }

    /// Number of `index_insert` calls served so far.
    pub fn insert_count(&self) -> u64 {
        self.inner.read().insert_count
    }

    /// The audit lines appended so far.
    pub fn audit_lines(&self) -> Vec<String> {
        self.inner.read().audit.clone()
    }
}

impl GeometryStore for MemoryStore {
    fn geometry_rows(
        &self,
        table: &str,
        column: &str,
    ) -> SpatialResult<Vec<(i64, Option<Geometry>)>> {
        let inner = self.inner.read();
        let rows = inner.tables.get(table).ok_or_else(|| {
            SpatialError::StorageUnavailable(format!("no such table: {}", table))
        })?;
        let _ = column; // single geometry column per table in this store
        Ok(rows.iter().map(|(id, g)| (*id, g.clone())).collect())
    }

    fn index_clear(&self, index_name: &str) -> SpatialResult<()> {
        let mut inner = self.inner.write();
        inner.clear_count += 1;
        let entries = inner.indexes.get_mut(index_name).ok_or_else(|| {
            SpatialError::StorageUnavailable(format!("no such index: {}", index_name))
        })?;
        entries.clear();
        Ok(())
    }

    fn index_insert(&self, index_name: &str, id: i64, rect: BoundingBox) -> SpatialResult<()> {
        let mut inner = self.inner.write();
        inner.insert_count += 1;
        if inner.fail_next_insert {
            inner.fail_next_insert = false;
            return Err(SpatialError::StorageUnavailable(format!(
                "write to index {} failed",
                index_name
            )));
        }
        let entries = inner.indexes.get_mut(index_name).ok_or_else(|| {
            SpatialError::StorageUnavailable(format!("no such index: {}", index_name))
        })?;
        entries.insert(id, rect);
        Ok(())
    }

    fn index_count(&self, index_name: &str) -> SpatialResult<u64> {
        let inner = self.inner.read();
        let entries = inner.indexes.get(index_name).ok_or_else(|| {
            SpatialError::StorageUnavailable(format!("no such index: {}", index_name))
        })?;
        Ok(entries.len() as u64)
    }

    fn index_entries(&self, index_name: &str) -> SpatialResult<Vec<(i64, BoundingBox)>> {
        let inner = self.inner.read();
        let entries = inner.indexes.get(index_name).ok_or_else(|| {
            SpatialError::StorageUnavailable(format!("no such index: {}", index_name))
        })?;
        Ok(entries.iter().map(|(id, r)| (*id, r.clone())).collect())
    }

    fn is_index_enabled(&self, descriptor: &IndexDescriptor) -> SpatialResult<bool> {
        Ok(self.inner.read().enabled.contains(descriptor))
    }

    fn enabled_indexes(&self) -> SpatialResult<Vec<IndexDescriptor>> {
        Ok(self.inner.read().enabled.iter().cloned().collect())
    }

    fn log_event(&self, descriptor: &IndexDescriptor, message: &str) {
        self.inner
            .write()
            .audit
            .push(format!("{}: {}", descriptor, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_is_storage_unavailable() {
        let store = MemoryStore::new();
        let err = store.geometry_rows("nope", "geom").unwrap_err();
        assert!(matches!(err, SpatialError::StorageUnavailable(_)));
    }

    #[test]
    fn test_missing_index_is_storage_unavailable() {
        let store = MemoryStore::new();
        assert!(store.index_count("nope").is_err());
        assert!(store.index_clear("nope").is_err());
        assert!(store.index_entries("nope").is_err());
        assert!(store
            .index_insert("nope", 1, BoundingBox::default())
            .is_err());
    }

    #[test]
    fn test_rows_round_trip() {
        let store = MemoryStore::new();
        store.put_geometry("roads", 1, Some(Geometry::point(1.0, 2.0)));
        store.put_geometry("roads", 2, None);

        let rows = store.geometry_rows("roads", "geom").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], (1, Some(Geometry::point(1.0, 2.0))));
        assert_eq!(rows[1], (2, None));

        store.remove_row("roads", 1);
        assert_eq!(store.geometry_rows("roads", "geom").unwrap().len(), 1);
    }

    #[test]
    fn test_catalog() {
        let store = MemoryStore::new();
        let desc = IndexDescriptor::new("roads", "geom");
        assert!(!store.is_index_enabled(&desc).unwrap());

        store.enable_index(&desc);
        assert!(store.is_index_enabled(&desc).unwrap());
        assert_eq!(store.enabled_indexes().unwrap(), vec![desc.clone()]);
        assert_eq!(store.index_count(&desc.index_name()).unwrap(), 0);

        store.disable_index(&desc);
        assert!(!store.is_index_enabled(&desc).unwrap());
        assert!(store.enabled_indexes().unwrap().is_empty());
    }

    #[test]
    fn test_index_crud_and_counters() {
        let store = MemoryStore::new();
        let desc = IndexDescriptor::new("roads", "geom");
        store.enable_index(&desc);
        let name = desc.index_name();

        store
            .index_insert(&name, 1, BoundingBox::new(0.0, 0.0, 1.0, 1.0))
            .unwrap();
        store
            .index_insert(&name, 2, BoundingBox::new(2.0, 2.0, 3.0, 3.0))
            .unwrap();
        assert_eq!(store.index_count(&name).unwrap(), 2);
        assert_eq!(store.insert_count(), 2);

        store.index_clear(&name).unwrap();
        assert_eq!(store.index_count(&name).unwrap(), 0);
        assert_eq!(store.clear_count(), 1);
    }

    #[test]
    fn test_fault_injection_is_one_shot() {
        let store = MemoryStore::new();
        let desc = IndexDescriptor::new("roads", "geom");
        store.enable_index(&desc);
        let name = desc.index_name();

        store.fail_next_insert();
        assert!(store.index_insert(&name, 1, BoundingBox::default()).is_err());
        assert!(store.index_insert(&name, 1, BoundingBox::default()).is_ok());
    }

    #[test]
    fn test_audit_append() {
        let store = MemoryStore::new();
        let desc = IndexDescriptor::new("roads", "geom");
        store.log_event(&desc, "consistent");
        assert_eq!(store.audit_lines(), vec!["roads.geom: consistent".to_string()]);
    }
}
