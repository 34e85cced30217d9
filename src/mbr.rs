//! Minimal bounding rectangle (MBR) codec.
//!
//! The shadow index stores one rectangle per row at reduced precision: each
//! of the four extents is rounded to the nearest representable 32-bit float
//! and widened back to a double. Everything that compares live rectangles
//! against stored ones must therefore go through [`truncate`], and query
//! predicates compensate for the rounding with [`truncation_epsilon`].

use crate::bounding_box::BoundingBox;
use crate::error::{SpatialError, SpatialResult};
use crate::geometry::Geometry;

/// Computes the bounding rectangle of a geometry by scanning every
/// coordinate, recursing into nested collections.
///
/// Returns [`SpatialError::EmptyGeometry`] if the geometry holds no
/// coordinates at all. A single point yields a degenerate rectangle
/// (min == max), which is legal.
pub fn bounding_rectangle(geometry: &Geometry) -> SpatialResult<BoundingBox> {
    let mut rect: Option<BoundingBox> = None;
    geometry.for_each_coordinate(&mut |coord| match &mut rect {
        Some(r) => {
            r.min_x = r.min_x.min(coord.x);
            r.min_y = r.min_y.min(coord.y);
            r.max_x = r.max_x.max(coord.x);
            r.max_y = r.max_y.max(coord.y);
        }
        None => {
            rect = Some(BoundingBox::new(coord.x, coord.y, coord.x, coord.y));
        }
    });
    rect.ok_or(SpatialError::EmptyGeometry)
}

/// Rounds each extent of a rectangle through a 32-bit float and back,
/// matching the shadow index's physical storage precision.
///
/// Pure and idempotent: `truncate(truncate(r)) == truncate(r)`.
pub fn truncate(rect: &BoundingBox) -> BoundingBox {
    BoundingBox::new(
        rect.min_x as f32 as f64,
        rect.min_y as f32 as f64,
        rect.max_x as f32 as f64,
        rect.max_y as f32 as f64,
    )
}

/// The inflation margin that makes a truncated query rectangle safe:
/// twice the largest rounding error observed across the four extents.
pub fn truncation_epsilon(rect: &BoundingBox) -> f64 {
    let err = |v: f64| (v - (v as f32 as f64)).abs();
    let max_err = err(rect.min_x)
        .max(err(rect.min_y))
        .max(err(rect.max_x))
        .max(err(rect.max_y));
    2.0 * max_err
}
