//! Decoded geometry types handed to the consistency engine.
//!
//! The blob decoder (an external collaborator) produces values of these
//! types; the engine itself never touches the wire format. Only coordinate
//! enumeration matters here — bounding-rectangle extraction walks every
//! coordinate of a possibly nested geometry — so the shapes carry no
//! geometric algebra of their own.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A 2D coordinate (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the Euclidean distance to another coordinate.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A decoded geometry.
///
/// Collections may nest arbitrarily; any variant may be structurally empty
/// (no coordinates at all), in which case the row owning it is expected to
/// have no shadow-index entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// A single 2D point.
    Point(Coordinate),
    /// A set of independent points.
    MultiPoint(Vec<Coordinate>),
    /// An ordered sequence of coordinates forming a line.
    LineString(Vec<Coordinate>),
    /// A polygon with an exterior ring and zero or more interior rings.
    Polygon {
        exterior: Vec<Coordinate>,
        holes: Vec<Vec<Coordinate>>,
    },
    /// A heterogeneous collection of geometries.
    Collection(Vec<Geometry>),
}

impl Geometry {
    /// Creates a point geometry.
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point(Coordinate::new(x, y))
    }

    /// Creates a multi-point geometry.
    pub fn multi_point(coordinates: Vec<Coordinate>) -> Self {
        Geometry::MultiPoint(coordinates)
    }

    /// Creates a line string geometry.
    pub fn line_string(coordinates: Vec<Coordinate>) -> Self {
        Geometry::LineString(coordinates)
    }

    /// Creates a polygon geometry without holes.
    pub fn polygon(exterior: Vec<Coordinate>) -> Self {
        Geometry::Polygon {
            exterior,
            holes: Vec::new(),
        }
    }

    /// Creates a polygon geometry with interior rings.
    pub fn polygon_with_holes(exterior: Vec<Coordinate>, holes: Vec<Vec<Coordinate>>) -> Self {
        Geometry::Polygon { exterior, holes }
    }

    /// Creates a geometry collection.
    pub fn collection(members: Vec<Geometry>) -> Self {
        Geometry::Collection(members)
    }

    /// Checks whether this geometry has no coordinates at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::MultiPoint(coords) | Geometry::LineString(coords) => coords.is_empty(),
            Geometry::Polygon { exterior, holes } => {
                exterior.is_empty() && holes.iter().all(|ring| ring.is_empty())
            }
            Geometry::Collection(members) => members.iter().all(|g| g.is_empty()),
        }
    }

    /// Visits every coordinate of this geometry, recursing into nested
    /// collections.
    pub fn for_each_coordinate<F: FnMut(&Coordinate)>(&self, f: &mut F) {
        match self {
            Geometry::Point(coord) => f(coord),
            Geometry::MultiPoint(coords) | Geometry::LineString(coords) => {
                for coord in coords {
                    f(coord);
                }
            }
            Geometry::Polygon { exterior, holes } => {
                for coord in exterior {
                    f(coord);
                }
                for ring in holes {
                    for coord in ring {
                        f(coord);
                    }
                }
            }
            Geometry::Collection(members) => {
                for member in members {
                    member.for_each_coordinate(f);
                }
            }
        }
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::Point(c) => write!(f, "POINT({} {})", c.x, c.y),
            Geometry::MultiPoint(coords) => write!(f, "MULTIPOINT[{}]", coords.len()),
            Geometry::LineString(coords) => write!(f, "LINESTRING[{}]", coords.len()),
            Geometry::Polygon { exterior, holes } => {
                write!(f, "POLYGON[{} ring(s), {} pts]", 1 + holes.len(), exterior.len())
            }
            Geometry::Collection(members) => write!(f, "GEOMETRYCOLLECTION[{}]", members.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_distance() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_point_not_empty() {
        assert!(!Geometry::point(1.0, 2.0).is_empty());
    }

    #[test]
    fn test_empty_linestring() {
        assert!(Geometry::line_string(vec![]).is_empty());
        assert!(!Geometry::line_string(vec![Coordinate::new(0.0, 0.0)]).is_empty());
    }

    #[test]
    fn test_empty_polygon() {
        assert!(Geometry::polygon(vec![]).is_empty());
        assert!(Geometry::polygon_with_holes(vec![], vec![vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_empty_collection() {
        assert!(Geometry::collection(vec![]).is_empty());
        assert!(Geometry::collection(vec![Geometry::line_string(vec![])]).is_empty());
        assert!(!Geometry::collection(vec![Geometry::point(1.0, 1.0)]).is_empty());
    }

    #[test]
    fn test_for_each_coordinate_nested() {
        let geom = Geometry::collection(vec![
            Geometry::point(1.0, 1.0),
            Geometry::collection(vec![
                Geometry::line_string(vec![Coordinate::new(2.0, 2.0), Coordinate::new(3.0, 3.0)]),
            ]),
            Geometry::polygon_with_holes(
                vec![Coordinate::new(4.0, 4.0)],
                vec![vec![Coordinate::new(5.0, 5.0)]],
            ),
        ]);

        let mut count = 0;
        geom.for_each_coordinate(&mut |_| count += 1);
        assert_eq!(count, 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Geometry::point(1.0, 2.0)), "POINT(1 2)");
        assert_eq!(
            format!("{}", Geometry::collection(vec![Geometry::point(0.0, 0.0)])),
            "GEOMETRYCOLLECTION[1]"
        );
    }
}
