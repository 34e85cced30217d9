//! # Quarry Spatial - Spatial-Index Consistency Engine
//!
//! This crate keeps the Quarry geometry store's shadow indexes honest. A
//! geometry-bearing table may carry an auxiliary bounding-box index (the
//! "shadow index"); every entry must reflect the truncated bounding
//! rectangle of the row's live geometry. Triggers normally maintain that
//! correspondence, but direct writes, crashes, and schema surgery can break
//! it — this crate detects the divergence and repairs it.
//!
//! ## Features
//!
//! - **Range predicates**: precision-compensated intersects and
//!   distance-within tests over stored rectangles
//! - **Reconciliation**: bidirectional base-table / index comparison with a
//!   count fast-path and a first-mismatch report
//! - **Recovery**: deterministic clear-and-repopulate rebuild, idempotent
//!   when the index already checks out
//! - **Tri-state verdicts**: valid / invalid / indeterminate, where
//!   "indeterminate" marks an external precondition failure rather than a
//!   broken index
//! - **Store-agnostic**: all storage reached through the [`GeometryStore`]
//!   trait; [`MemoryStore`] ships for embedding and tests
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use quarry_spatial::{
//!     ConsistencyVerdict, Geometry, IndexDescriptor, IndexMaintenance, MemoryStore,
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! let roads = IndexDescriptor::new("roads", "geom");
//! store.create_table("roads");
//! store.enable_index(&roads);
//! store.put_geometry("roads", 1, Some(Geometry::point(3.0, 4.0)));
//!
//! let maintenance = IndexMaintenance::new(store);
//! assert_eq!(maintenance.check_one(&roads), ConsistencyVerdict::Invalid);
//! assert_eq!(maintenance.recover_one(&roads, false), ConsistencyVerdict::Valid);
//! assert_eq!(maintenance.check_one(&roads), ConsistencyVerdict::Valid);
//! ```
//!
//! ## Concurrency
//!
//! The engine is synchronous, reentrant per call, and takes no locks of
//! its own. Checks and rebuilds run inside whatever transaction scope the
//! caller establishes; without one, a concurrent writer can produce a torn
//! view (either verdict) or a partially rebuilt index on crash.

// Core value types
pub mod bounding_box;
pub mod error;
pub mod geometry;
pub mod mbr;

// Query predicates
pub mod predicate;

// Consistency engine
pub mod memory;
pub mod ops;
pub mod orchestrator;
pub mod rebuilder;
pub mod reconciler;
pub mod store;

// Re-export value types
pub use bounding_box::BoundingBox;
pub use error::{SpatialError, SpatialResult};
pub use geometry::{Coordinate, Geometry};

// Re-export predicate types
pub use predicate::{DistanceQuery, IntersectsQuery};

// Re-export engine types
pub use memory::MemoryStore;
pub use ops::{dispatch, OpValue};
pub use orchestrator::IndexMaintenance;
pub use rebuilder::IndexRebuilder;
pub use reconciler::{IndexReconciler, Mismatch};
pub use store::{ConsistencyVerdict, GeometryStore, IndexDescriptor};
