//! Range-query predicates over shadow-index rectangles.
//!
//! A query object is built once and then tested against a stream of
//! candidate rectangles (one range scan may test thousands). Because index
//! rectangles are stored at reduced precision, [`IntersectsQuery`] inflates
//! the query rectangle by the truncation error actually observed on its own
//! coordinates; a candidate that intersects mathematically but was shrunk
//! or grown by rounding is then never wrongly excluded.
//!
//! [`DistanceQuery`] tests the bounding square of a circle and applies no
//! such inflation: the original engine left radius queries undefended
//! against precision loss, and the asymmetry is preserved as observed.

use std::sync::OnceLock;

use crate::bounding_box::BoundingBox;
use crate::error::{SpatialError, SpatialResult};
use crate::mbr;

/// A rectangle-intersection query, precision-compensated.
///
/// The epsilon-inflated rectangle is derived lazily on the first
/// [`matches`](IntersectsQuery::matches) call and cached for the lifetime
/// of the query.
#[derive(Debug)]
pub struct IntersectsQuery {
    raw: BoundingBox,
    inflated: OnceLock<BoundingBox>,
}

impl IntersectsQuery {
    /// Creates a query for the given rectangle.
    pub fn new(rect: BoundingBox) -> Self {
        Self {
            raw: rect,
            inflated: OnceLock::new(),
        }
    }

    /// The query rectangle as supplied, before inflation.
    pub fn rectangle(&self) -> &BoundingBox {
        &self.raw
    }

    /// Tests whether a candidate rectangle intersects the query rectangle.
    ///
    /// Rectangles are closed: touching at an edge or corner intersects.
    pub fn matches(&self, candidate: &BoundingBox) -> bool {
        let query = self
            .inflated
            .get_or_init(|| self.raw.inflate(mbr::truncation_epsilon(&self.raw)));
        query.intersects(candidate)
    }
}

/// A distance-within query: does a candidate rectangle touch the bounding
/// square of the circle (center ± radius)?
#[derive(Debug)]
pub struct DistanceQuery {
    square: BoundingBox,
}

impl DistanceQuery {
    /// Creates a query for a circle at (`cx`, `cy`) with the given radius.
    ///
    /// A negative radius is a caller contract violation.
    pub fn new(cx: f64, cy: f64, radius: f64) -> SpatialResult<Self> {
        if radius < 0.0 {
            return Err(SpatialError::InvalidArguments(
                "distance query radius must be non-negative".to_string(),
            ));
        }
        Ok(Self {
            square: BoundingBox::new(cx - radius, cy - radius, cx + radius, cy + radius),
        })
    }

    /// The bounding square being tested against.
    pub fn rectangle(&self) -> &BoundingBox {
        &self.square
    }

    /// Tests whether a candidate rectangle touches the query square.
    pub fn matches(&self, candidate: &BoundingBox) -> bool {
        self.square.intersects(candidate)
    }
}
