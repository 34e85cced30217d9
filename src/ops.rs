//! Named-operation dispatch surface.
//!
//! The host query engine exposes consistency maintenance to SQL as a set
//! of registered functions. This module models that registration table:
//! operations are addressed by name with loosely typed argument lists, and
//! every result is one of exactly three states — success (1), failure (0),
//! or indeterminate (Null). Wrong arity or a non-coercible argument is a
//! caller contract violation reported as `InvalidArguments`, never a
//! panic.

use crate::bounding_box::BoundingBox;
use crate::error::{SpatialError, SpatialResult};
use crate::orchestrator::IndexMaintenance;
use crate::predicate::{DistanceQuery, IntersectsQuery};
use crate::store::{ConsistencyVerdict, IndexDescriptor};

/// A loosely typed argument or result value, mirroring the SQL value
/// classes the host hands through.
#[derive(Debug, Clone, PartialEq)]
pub enum OpValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl OpValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            OpValue::Int(i) => Some(*i as f64),
            OpValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            OpValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn as_flag(&self) -> Option<bool> {
        match self {
            OpValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }
}

/// Dispatches one named operation against the maintenance API.
///
/// Supported operations:
/// - `CheckIndex()` / `CheckIndex(table, column)`
/// - `RecoverIndex()` / `RecoverIndex(skip_check)` /
///   `RecoverIndex(table, column)` / `RecoverIndex(table, column, skip_check)`
/// - `EvaluateIntersects(qminx, qminy, qmaxx, qmaxy, cminx, cminy, cmaxx, cmaxy)`
/// - `EvaluateDistanceWithin(cx, cy, radius, cminx, cminy, cmaxx, cmaxy)`
pub fn dispatch(
    maintenance: &IndexMaintenance,
    name: &str,
    args: &[OpValue],
) -> SpatialResult<OpValue> {
    match name {
        "CheckIndex" => op_check_index(maintenance, args),
        "RecoverIndex" => op_recover_index(maintenance, args),
        "EvaluateIntersects" => op_evaluate_intersects(args),
        "EvaluateDistanceWithin" => op_evaluate_distance_within(args),
        _ => Err(SpatialError::InvalidArguments(format!(
            "unknown operation: {}",
            name
        ))),
    }
}

fn verdict_value(verdict: ConsistencyVerdict) -> OpValue {
    match verdict {
        ConsistencyVerdict::Valid => OpValue::Int(1),
        ConsistencyVerdict::Invalid => OpValue::Int(0),
        ConsistencyVerdict::Indeterminate => OpValue::Null,
    }
}

fn descriptor_arg(args: &[OpValue]) -> SpatialResult<IndexDescriptor> {
    let table = args[0].as_text().ok_or_else(|| {
        SpatialError::InvalidArguments("table name must be text".to_string())
    })?;
    let column = args[1].as_text().ok_or_else(|| {
        SpatialError::InvalidArguments("column name must be text".to_string())
    })?;
    Ok(IndexDescriptor::new(table, column))
}

fn rect_arg(args: &[OpValue]) -> SpatialResult<BoundingBox> {
    let mut scalars = [0.0_f64; 4];
    for (slot, arg) in scalars.iter_mut().zip(args) {
        *slot = arg.as_f64().ok_or_else(|| {
            SpatialError::InvalidArguments("rectangle extents must be numeric".to_string())
        })?;
    }
    Ok(BoundingBox::new(scalars[0], scalars[1], scalars[2], scalars[3]))
}

fn op_check_index(maintenance: &IndexMaintenance, args: &[OpValue]) -> SpatialResult<OpValue> {
    match args.len() {
        0 => Ok(verdict_value(maintenance.check_all())),
        2 => {
            let descriptor = descriptor_arg(args)?;
            Ok(verdict_value(maintenance.check_one(&descriptor)))
        }
        n => Err(SpatialError::InvalidArguments(format!(
            "CheckIndex takes 0 or 2 arguments, got {}",
            n
        ))),
    }
}

fn op_recover_index(maintenance: &IndexMaintenance, args: &[OpValue]) -> SpatialResult<OpValue> {
    let flag_err =
        || SpatialError::InvalidArguments("skip_check flag must be an integer".to_string());
    match args.len() {
        0 => Ok(verdict_value(maintenance.recover_all(false))),
        1 => {
            let skip_check = args[0].as_flag().ok_or_else(flag_err)?;
            Ok(verdict_value(maintenance.recover_all(skip_check)))
        }
        2 => {
            let descriptor = descriptor_arg(args)?;
            Ok(verdict_value(maintenance.recover_one(&descriptor, false)))
        }
        3 => {
            let descriptor = descriptor_arg(args)?;
            let skip_check = args[2].as_flag().ok_or_else(flag_err)?;
            Ok(verdict_value(maintenance.recover_one(&descriptor, skip_check)))
        }
        n => Err(SpatialError::InvalidArguments(format!(
            "RecoverIndex takes 0 to 3 arguments, got {}",
            n
        ))),
    }
}

fn op_evaluate_intersects(args: &[OpValue]) -> SpatialResult<OpValue> {
    if args.len() != 8 {
        return Err(SpatialError::InvalidArguments(format!(
            "EvaluateIntersects takes 8 arguments, got {}",
            args.len()
        )));
    }
    let query = IntersectsQuery::new(rect_arg(&args[0..4])?);
    let candidate = rect_arg(&args[4..8])?;
    Ok(OpValue::Int(query.matches(&candidate) as i64))
}

fn op_evaluate_distance_within(args: &[OpValue]) -> SpatialResult<OpValue> {
    if args.len() != 7 {
        return Err(SpatialError::InvalidArguments(format!(
            "EvaluateDistanceWithin takes 7 arguments, got {}",
            args.len()
        )));
    }
    let numeric_err =
        || SpatialError::InvalidArguments("circle parameters must be numeric".to_string());
    let cx = args[0].as_f64().ok_or_else(numeric_err)?;
    let cy = args[1].as_f64().ok_or_else(numeric_err)?;
    let radius = args[2].as_f64().ok_or_else(numeric_err)?;
    let query = DistanceQuery::new(cx, cy, radius)?;
    let candidate = rect_arg(&args[3..7])?;
    Ok(OpValue::Int(query.matches(&candidate) as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::memory::MemoryStore;
    use std::sync::Arc;

    fn maintenance() -> (IndexMaintenance, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.create_table("roads");
        store.enable_index(&IndexDescriptor::new("roads", "geom"));
        (IndexMaintenance::new(store.clone()), store)
    }

    fn text(s: &str) -> OpValue {
        OpValue::Text(s.to_string())
    }

    fn nums(values: &[f64]) -> Vec<OpValue> {
        values.iter().map(|v| OpValue::Float(*v)).collect()
    }

    #[test]
    fn test_check_index_two_args() {
        let (m, _s) = maintenance();
        let result = dispatch(&m, "CheckIndex", &[text("roads"), text("geom")]).unwrap();
        assert_eq!(result, OpValue::Int(1));
    }

    #[test]
    fn test_check_index_all() {
        let (m, store) = maintenance();
        store.put_geometry("roads", 1, Some(Geometry::point(1.0, 1.0)));
        assert_eq!(dispatch(&m, "CheckIndex", &[]).unwrap(), OpValue::Int(0));
    }

    #[test]
    fn test_check_index_indeterminate_is_null() {
        let (m, _s) = maintenance();
        let result =
            dispatch(&m, "CheckIndex", &[text("roads"), text("unindexed")]).unwrap();
        assert_eq!(result, OpValue::Null);
    }

    #[test]
    fn test_check_index_bad_arity() {
        let (m, _s) = maintenance();
        let err = dispatch(&m, "CheckIndex", &[text("roads")]).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidArguments(_)));
    }

    #[test]
    fn test_check_index_non_text_args() {
        let (m, _s) = maintenance();
        let err =
            dispatch(&m, "CheckIndex", &[OpValue::Int(1), text("geom")]).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidArguments(_)));
    }

    #[test]
    fn test_recover_index_variants() {
        let (m, store) = maintenance();
        store.put_geometry("roads", 1, Some(Geometry::point(1.0, 1.0)));

        assert_eq!(
            dispatch(&m, "RecoverIndex", &[text("roads"), text("geom")]).unwrap(),
            OpValue::Int(1)
        );
        assert_eq!(dispatch(&m, "RecoverIndex", &[]).unwrap(), OpValue::Int(1));
        assert_eq!(
            dispatch(&m, "RecoverIndex", &[OpValue::Int(1)]).unwrap(),
            OpValue::Int(1)
        );
        assert_eq!(
            dispatch(
                &m,
                "RecoverIndex",
                &[text("roads"), text("geom"), OpValue::Int(0)]
            )
            .unwrap(),
            OpValue::Int(1)
        );
    }

    #[test]
    fn test_recover_index_skip_check_flag_type() {
        let (m, _s) = maintenance();
        let err = dispatch(&m, "RecoverIndex", &[text("yes")]).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidArguments(_)));
    }

    #[test]
    fn test_recover_index_failure_maps_to_zero() {
        let (m, store) = maintenance();
        store.put_geometry("roads", 1, Some(Geometry::point(1.0, 1.0)));
        store.fail_next_insert();
        assert_eq!(
            dispatch(
                &m,
                "RecoverIndex",
                &[text("roads"), text("geom"), OpValue::Int(1)]
            )
            .unwrap(),
            OpValue::Int(0)
        );
    }

    #[test]
    fn test_recover_index_bad_arity() {
        let (m, _s) = maintenance();
        let args = vec![text("a"), text("b"), OpValue::Int(0), OpValue::Int(0)];
        let err = dispatch(&m, "RecoverIndex", &args).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidArguments(_)));
    }

    #[test]
    fn test_evaluate_intersects_corner_touch() {
        let (m, _s) = maintenance();
        // Scenario: query (0,0,1,1), candidate (1,1,2,2) share one corner.
        let args = nums(&[0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0]);
        assert_eq!(
            dispatch(&m, "EvaluateIntersects", &args).unwrap(),
            OpValue::Int(1)
        );
    }

    #[test]
    fn test_evaluate_intersects_disjoint() {
        let (m, _s) = maintenance();
        let args = nums(&[0.0, 0.0, 1.0, 1.0, 5.0, 5.0, 6.0, 6.0]);
        assert_eq!(
            dispatch(&m, "EvaluateIntersects", &args).unwrap(),
            OpValue::Int(0)
        );
    }

    #[test]
    fn test_evaluate_intersects_accepts_integer_args() {
        let (m, _s) = maintenance();
        let args: Vec<OpValue> = (0..8).map(|i| OpValue::Int(i % 2)).collect();
        assert!(dispatch(&m, "EvaluateIntersects", &args).is_ok());
    }

    #[test]
    fn test_evaluate_intersects_bad_arity() {
        let (m, _s) = maintenance();
        let err = dispatch(&m, "EvaluateIntersects", &nums(&[0.0; 7])).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidArguments(_)));
    }

    #[test]
    fn test_evaluate_intersects_non_numeric() {
        let (m, _s) = maintenance();
        let mut args = nums(&[0.0; 8]);
        args[3] = text("oops");
        let err = dispatch(&m, "EvaluateIntersects", &args).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidArguments(_)));
    }

    #[test]
    fn test_evaluate_distance_within() {
        let (m, _s) = maintenance();
        let inside = nums(&[0.0, 0.0, 10.0, 5.0, 5.0, 6.0, 6.0]);
        assert_eq!(
            dispatch(&m, "EvaluateDistanceWithin", &inside).unwrap(),
            OpValue::Int(1)
        );

        let outside = nums(&[0.0, 0.0, 10.0, 11.0, 0.0, 12.0, 1.0]);
        assert_eq!(
            dispatch(&m, "EvaluateDistanceWithin", &outside).unwrap(),
            OpValue::Int(0)
        );
    }

    #[test]
    fn test_evaluate_distance_within_negative_radius() {
        let (m, _s) = maintenance();
        let args = nums(&[0.0, 0.0, -1.0, 0.0, 0.0, 1.0, 1.0]);
        let err = dispatch(&m, "EvaluateDistanceWithin", &args).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidArguments(_)));
    }

    #[test]
    fn test_unknown_operation() {
        let (m, _s) = maintenance();
        let err = dispatch(&m, "DropIndex", &[]).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidArguments(_)));
    }
}
