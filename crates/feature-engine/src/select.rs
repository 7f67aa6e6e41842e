//! Face and edge selection by geometric predicate.
//!
//! Predicates only look at geometry the kernel reports for the current tip
//! (normals, bounding boxes, midpoints, lengths, directions), never at
//! feature names or list positions, so the same query picks the same entity
//! on every recompute.

use forge_types::{
    try_normalize, Axis, BoundingBox, EdgeFilter, EdgeQuery, FaceFilter, FaceQuery, Point3,
    TopoKind, Vector3,
};
use kernel_bridge::{
    BrepEdge, BrepFace, EdgeGeometry, FaceGeometry, KernelIntrospect, KernelSolidHandle,
};
use tracing::debug;

use crate::types::EngineError;

fn component(p: &Point3, axis: Axis) -> f64 {
    p[axis.index()]
}

/// Componentwise match of two unit vectors.
fn same_direction(a: &Vector3, b: &Vector3, tolerance: f64) -> bool {
    (a - b).amax() <= tolerance
}

fn face_matches(face: &BrepFace, query: &FaceQuery, wanted: &Vector3) -> bool {
    let tol = query.tolerances.bbox;
    let (u, v) = face.uv_center();
    if !same_direction(&face.normal(u, v), wanted, query.tolerances.normal) {
        return false;
    }
    let bbox: BoundingBox = face.bounding_box();
    query.filters.iter().all(|filter| match filter {
        FaceFilter::BoxCoordinate { axis, bound, value } => {
            (bbox.coordinate(*axis, *bound) - value).abs() <= tol
        }
        FaceFilter::ContainsPoint { point } => bbox.contains(point, tol),
        FaceFilter::PlaneThrough { point } => face
            .frame()
            .is_some_and(|frame| frame.height(point).abs() <= tol),
        FaceFilter::MinExtent { axis, min } => bbox.extent(*axis) >= min - tol,
    })
}

fn edge_matches(edge: &BrepEdge, query: &EdgeQuery) -> bool {
    let tol = query.tolerances.bbox;
    let mid = edge.midpoint();
    query.filters.iter().all(|filter| match filter {
        EdgeFilter::MidpointCoordinate { axis, value } => {
            (component(&mid, *axis) - value).abs() <= tol
        }
        EdgeFilter::MidpointWithin { min, max } => Axis::ALL.iter().all(|&axis| {
            let c = component(&mid, axis);
            c >= component(min, axis) - tol && c <= component(max, axis) + tol
        }),
        EdgeFilter::LongerThan { length } => edge.length() > *length,
        EdgeFilter::ShorterThan { length } => edge.length() < *length,
        EdgeFilter::Parallel { direction } => match try_normalize(direction) {
            Some(d) => {
                let e = edge.direction();
                let normal_tol = query.tolerances.normal;
                same_direction(&e, &d, normal_tol) || same_direction(&e, &-d, normal_tol)
            }
            None => false,
        },
    })
}

/// Every face of `tip` satisfying `query`, in kernel order.
pub fn matching_faces(
    kernel: &dyn KernelIntrospect,
    tip: &KernelSolidHandle,
    query: &FaceQuery,
) -> Result<Vec<BrepFace>, EngineError> {
    let wanted = try_normalize(&query.normal).ok_or_else(|| EngineError::InvalidParameter {
        reason: "face query normal has zero length".to_string(),
    })?;
    let mut faces: Vec<BrepFace> = kernel
        .faces(tip)?
        .into_iter()
        .filter(|f| face_matches(f, query, &wanted))
        .collect();
    faces.sort_by_key(|f| f.id);
    Ok(faces)
}

/// The single face of `tip` satisfying `query`.
///
/// Fails with `NoMatch` when nothing matches and `AmbiguousSelection` when
/// more than one face does.
pub fn select_face(
    kernel: &dyn KernelIntrospect,
    tip: &KernelSolidHandle,
    query: &FaceQuery,
) -> Result<BrepFace, EngineError> {
    let mut faces = matching_faces(kernel, tip, query)?;
    debug!(candidates = faces.len(), normal = ?query.normal, "face selection");
    match faces.len() {
        0 => Err(EngineError::NoMatch {
            kind: TopoKind::Face,
            query: describe_face_query(query),
        }),
        1 => Ok(faces.remove(0)),
        count => Err(EngineError::AmbiguousSelection {
            count,
            query: describe_face_query(query),
        }),
    }
}

/// All edges of `tip` satisfying `query`. An empty result is not an error.
pub fn select_edges(
    kernel: &dyn KernelIntrospect,
    tip: &KernelSolidHandle,
    query: &EdgeQuery,
) -> Result<Vec<BrepEdge>, EngineError> {
    let mut edges: Vec<BrepEdge> = kernel
        .edges(tip)?
        .into_iter()
        .filter(|e| edge_matches(e, query))
        .collect();
    edges.sort_by_key(|e| e.id);
    debug!(matched = edges.len(), "edge selection");
    Ok(edges)
}

fn describe_face_query(query: &FaceQuery) -> String {
    let n = query.normal;
    let mut out = format!("face facing ({:.3}, {:.3}, {:.3})", n.x, n.y, n.z);
    for filter in &query.filters {
        out.push_str(&match filter {
            FaceFilter::BoxCoordinate { axis, bound, value } => {
                format!(", {bound:?} {axis:?} = {value}")
            }
            FaceFilter::ContainsPoint { point } => {
                format!(", containing ({}, {}, {})", point.x, point.y, point.z)
            }
            FaceFilter::PlaneThrough { point } => {
                format!(", through ({}, {}, {})", point.x, point.y, point.z)
            }
            FaceFilter::MinExtent { axis, min } => format!(", {axis:?} extent >= {min}"),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_types::{Bound, DatumPlane, Placement, Point2, Profile};
    use kernel_bridge::{BooleanMode, Kernel, OpDescriptor, PrismKernel, SweepSpec};

    /// 20 × 10 × 4 block with a 4 mm rib standing on top at x 0..4.
    fn stepped_block(kernel: &mut PrismKernel) -> KernelSolidHandle {
        let rect = |x0: f64, y0: f64, x1: f64, y1: f64| Profile::Polygon {
            vertices: vec![
                Point2::new(x0, y0),
                Point2::new(x1, y0),
                Point2::new(x1, y1),
                Point2::new(x0, y1),
            ],
        };
        let base = kernel
            .execute(&OpDescriptor::Sweep {
                target: None,
                sweep: SweepSpec {
                    placement: Placement::datum(DatumPlane::XY),
                    profiles: vec![rect(0.0, 0.0, 20.0, 10.0)],
                    start: 0.0,
                    length: 4.0,
                },
                mode: BooleanMode::NewSolid,
            })
            .into_result()
            .unwrap();
        kernel
            .execute(&OpDescriptor::Sweep {
                target: Some(base),
                sweep: SweepSpec {
                    placement: Placement::datum(DatumPlane::XY),
                    profiles: vec![rect(0.0, 0.0, 4.0, 10.0)],
                    start: 4.0,
                    length: 4.0,
                },
                mode: BooleanMode::Union,
            })
            .into_result()
            .unwrap()
    }

    #[test]
    fn test_two_up_faces_are_ambiguous() {
        let mut kernel = PrismKernel::new();
        let h = stepped_block(&mut kernel);
        let err = select_face(&kernel, &h, &FaceQuery::facing(Vector3::z())).unwrap_err();
        assert!(matches!(err, EngineError::AmbiguousSelection { count: 2, .. }));
    }

    #[test]
    fn test_region_predicate_disambiguates() {
        let mut kernel = PrismKernel::new();
        let h = stepped_block(&mut kernel);
        let face = select_face(
            &kernel,
            &h,
            &FaceQuery::facing(Vector3::z()).at(Axis::Z, Bound::Max, 8.0),
        )
        .unwrap();
        assert!((face.bounding_box().extent(Axis::X) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_match() {
        let mut kernel = PrismKernel::new();
        let h = stepped_block(&mut kernel);
        let err = select_face(
            &kernel,
            &h,
            &FaceQuery::facing(Vector3::z()).at(Axis::Z, Bound::Max, 100.0),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NoMatch { kind: TopoKind::Face, .. }));
    }

    #[test]
    fn test_edge_predicates() {
        let mut kernel = PrismKernel::new();
        let h = stepped_block(&mut kernel);
        let long_x = select_edges(
            &kernel,
            &h,
            &EdgeQuery::new().parallel_to(Vector3::x()).longer_than(10.0),
        )
        .unwrap();
        // Bottom front/back, top-of-base front/back.
        assert_eq!(long_x.len(), 4);
        let none = select_edges(&kernel, &h, &EdgeQuery::new().longer_than(1000.0)).unwrap();
        assert!(none.is_empty());
    }
}
