//! Public check/recover API over one or all shadow indexes.
//!
//! `IndexMaintenance` sequences the reconciler and the rebuilder. A check
//! never writes; a recovery rebuilds only when the index is actually
//! divergent (unless told to skip the check), so repeated invocations are
//! idempotent. Batch variants aggregate per-descriptor outcomes: an
//! indeterminate outcome always stops the batch, because it marks an
//! external precondition failure that a rebuild cannot fix.

use std::sync::Arc;

use crate::rebuilder::IndexRebuilder;
use crate::reconciler::IndexReconciler;
use crate::store::{ConsistencyVerdict, GeometryStore, IndexDescriptor};

/// The externally invoked consistency API.
///
/// Cheap to clone; all clones share the same store handle.
#[derive(Clone)]
pub struct IndexMaintenance {
    store: Arc<dyn GeometryStore>,
}

impl IndexMaintenance {
    /// Creates a maintenance handle over the given store.
    pub fn new(store: Arc<dyn GeometryStore>) -> Self {
        Self { store }
    }

    /// The underlying store handle.
    pub fn store(&self) -> &Arc<dyn GeometryStore> {
        &self.store
    }

    /// Checks one descriptor.
    pub fn check_one(&self, descriptor: &IndexDescriptor) -> ConsistencyVerdict {
        IndexReconciler::new(self.store.as_ref()).check(descriptor)
    }

    /// Checks every enabled descriptor in the catalog.
    ///
    /// Stops at the first indeterminate outcome; continues past invalid
    /// ones so the answer reflects the whole catalog, not the first
    /// failure.
    pub fn check_all(&self) -> ConsistencyVerdict {
        let descriptors = match self.store.enabled_indexes() {
            Ok(descriptors) => descriptors,
            Err(err) => {
                log::warn!("catalog enumeration failed: {}", err);
                return ConsistencyVerdict::Indeterminate;
            }
        };

        let mut verdict = ConsistencyVerdict::Valid;
        for descriptor in &descriptors {
            match self.check_one(descriptor) {
                ConsistencyVerdict::Valid => {}
                ConsistencyVerdict::Invalid => verdict = ConsistencyVerdict::Invalid,
                ConsistencyVerdict::Indeterminate => return ConsistencyVerdict::Indeterminate,
            }
        }
        verdict
    }

    /// Checks one descriptor and rebuilds it when divergent.
    ///
    /// With `skip_check` the rebuild is unconditional. Returns `Valid` on
    /// success (including the no-op fast path when the index already
    /// checks out), `Invalid` when the rebuild failed, and `Indeterminate`
    /// when the preceding check could not run.
    pub fn recover_one(
        &self,
        descriptor: &IndexDescriptor,
        skip_check: bool,
    ) -> ConsistencyVerdict {
        if !skip_check {
            match self.check_one(descriptor) {
                ConsistencyVerdict::Valid => return ConsistencyVerdict::Valid,
                ConsistencyVerdict::Invalid => {}
                ConsistencyVerdict::Indeterminate => return ConsistencyVerdict::Indeterminate,
            }
        }

        match IndexRebuilder::new(self.store.as_ref()).rebuild(descriptor) {
            Ok(()) => ConsistencyVerdict::Valid,
            Err(err) => {
                log::warn!("{}: recovery failed: {}", descriptor, err);
                if err.is_indeterminate() {
                    ConsistencyVerdict::Indeterminate
                } else {
                    ConsistencyVerdict::Invalid
                }
            }
        }
    }

    /// Recovers every enabled descriptor in the catalog.
    ///
    /// Unlike [`check_all`](Self::check_all) this stops at the first
    /// non-valid outcome of either kind: an indeterminate check is a hard
    /// stop, and a failed rebuild makes the whole call invalid.
    pub fn recover_all(&self, skip_check: bool) -> ConsistencyVerdict {
        let descriptors = match self.store.enabled_indexes() {
            Ok(descriptors) => descriptors,
            Err(err) => {
                log::warn!("catalog enumeration failed: {}", err);
                return ConsistencyVerdict::Indeterminate;
            }
        };

        for descriptor in &descriptors {
            match self.recover_one(descriptor, skip_check) {
                ConsistencyVerdict::Valid => {}
                ConsistencyVerdict::Invalid => return ConsistencyVerdict::Invalid,
                ConsistencyVerdict::Indeterminate => return ConsistencyVerdict::Indeterminate,
            }
        }
        ConsistencyVerdict::Valid
    }
}
