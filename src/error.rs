//! Error types for spatial-index consistency operations.

use thiserror::Error;

/// Errors that can occur in spatial-index consistency operations.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The geometry has no coordinates and therefore no bounding rectangle.
    /// This is the expected state for empty geometries, not a defect: rows
    /// holding one must simply have no shadow-index entry.
    #[error("geometry has no coordinates")]
    EmptyGeometry,

    /// A caller contract violation, e.g. a dispatch call with the wrong
    /// number or type of arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// A named table or shadow index does not exist, or an underlying
    /// storage query failed. Always surfaces as an indeterminate verdict,
    /// never as "invalid".
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The requested operation needs an enabled shadow index and the
    /// descriptor has none.
    #[error("no spatial index is enabled for {table}.{column}")]
    NotIndexed {
        table: String,
        column: String,
    },

    /// A clear or insert step failed partway through a rebuild. The
    /// caller's transaction owns the rollback.
    #[error("index rebuild failed: {0}")]
    RebuildFailure(String),
}

/// Result type for spatial-index consistency operations.
pub type SpatialResult<T> = Result<T, SpatialError>;

impl SpatialError {
    /// Whether this error must surface as an indeterminate verdict and
    /// short-circuit any batch operation.
    pub fn is_indeterminate(&self) -> bool {
        matches!(
            self,
            SpatialError::StorageUnavailable(_) | SpatialError::NotIndexed { .. }
        )
    }
}
