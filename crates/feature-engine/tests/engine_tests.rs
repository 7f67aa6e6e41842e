use approx::assert_relative_eq;
use feature_engine::*;
use forge_types::{Axis, Bound, DatumPlane, EdgeQuery, FaceQuery, Point2, Point3, Profile, Vector3};
use kernel_bridge::{FaceGeometry, KernelIntrospect, PrismKernel};
use modeling_ops::PocketExtent;
use proptest::prelude::*;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Profile {
    Profile::Polygon {
        vertices: vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ],
    }
}

fn circle(x: f64, y: f64, r: f64) -> Profile {
    Profile::Circle {
        center: Point2::new(x, y),
        radius: r,
    }
}

/// 10 × 10 × 4 plate on the XY datum.
fn plate(kernel: &mut PrismKernel) -> Body {
    let mut body = Body::new("Plate");
    body.add_pad(
        kernel,
        "Base",
        Sketch::on_datum(DatumPlane::XY, 0.0, vec![rect(0.0, 0.0, 10.0, 10.0)]),
        4.0,
        false,
    )
    .unwrap();
    body
}

// ── Pad ────────────────────────────────────────────────────────────────────

#[test]
fn zero_distance_pad_leaves_body_unchanged() {
    let mut kernel = PrismKernel::new();
    let mut body = plate(&mut kernel);
    let tip = body.tip();
    let err = body
        .add_pad(
            &mut kernel,
            "Nothing",
            Sketch::on_datum(DatumPlane::XY, 4.0, vec![rect(0.0, 0.0, 2.0, 2.0)]),
            0.0,
            false,
        )
        .unwrap_err();
    assert_eq!(err.feature, "Nothing");
    assert!(matches!(err.error, EngineError::InvalidParameter { .. }));
    assert_eq!(body.tip(), tip);
    assert_eq!(body.features().len(), 1);
}

#[test]
fn pad_on_selected_face_unions() {
    let mut kernel = PrismKernel::new();
    let mut body = plate(&mut kernel);
    body.add_pad(
        &mut kernel,
        "Boss",
        Sketch::on_face(FaceQuery::facing(Vector3::z()), vec![circle(5.0, 5.0, 2.0)])
            .authored_in(DatumPlane::XY),
        3.0,
        false,
    )
    .unwrap();
    let tip = body.tip().unwrap();
    assert!(kernel.contains(&tip, &Point3::new(5.0, 5.0, 6.0)).unwrap());
    assert_relative_eq!(kernel.bounding_box(&tip).unwrap().max.z, 7.0, epsilon = 1e-6);
}

#[test]
fn invalid_profile_is_reported() {
    let mut kernel = PrismKernel::new();
    let mut body = Body::new("Broken");
    let err = body
        .add_pad(
            &mut kernel,
            "Degenerate",
            Sketch::on_datum(
                DatumPlane::XY,
                0.0,
                vec![Profile::Polygon {
                    vertices: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
                }],
            ),
            1.0,
            false,
        )
        .unwrap_err();
    assert!(matches!(err.error, EngineError::InvalidProfile { .. }));
    assert!(body.tip().is_none());
}

// ── Face frames ────────────────────────────────────────────────────────────

#[test]
fn bottom_face_datum_authoring_lands_at_global_position() {
    let mut kernel = PrismKernel::new();
    let mut body = plate(&mut kernel);
    body.add_pocket(
        &mut kernel,
        "BottomHole",
        Sketch::on_face(FaceQuery::facing(-Vector3::z()), vec![circle(7.0, 3.0, 1.0)])
            .authored_in(DatumPlane::XY),
        PocketExtent::Depth { depth: 1.0 },
        true,
    )
    .unwrap();
    let tip = body.tip().unwrap();
    assert!(!kernel.contains(&tip, &Point3::new(7.0, 3.0, 0.5)).unwrap());
    assert!(kernel.contains(&tip, &Point3::new(3.0, 3.0, 0.5)).unwrap());
    assert!(kernel.contains(&tip, &Point3::new(7.0, 3.0, 1.5)).unwrap());
}

#[test]
fn bottom_face_local_frame_has_mirrored_x() {
    let mut kernel = PrismKernel::new();
    let mut body = plate(&mut kernel);
    // Local +u on the bottom face is global −X, so (7, 3) falls off the part.
    let err = body
        .add_pocket(
            &mut kernel,
            "Misplaced",
            Sketch::on_face(FaceQuery::facing(-Vector3::z()), vec![circle(7.0, 3.0, 1.0)]),
            PocketExtent::Depth { depth: 1.0 },
            true,
        )
        .unwrap_err();
    assert!(matches!(err.error, EngineError::DisjointCut));
}

// ── Pocket ─────────────────────────────────────────────────────────────────

#[test]
fn pocket_on_empty_body_rejected() {
    let mut kernel = PrismKernel::new();
    let mut body = Body::new("Empty");
    let err = body
        .add_pocket(
            &mut kernel,
            "Cut",
            Sketch::on_datum(DatumPlane::XY, 0.0, vec![rect(0.0, 0.0, 1.0, 1.0)]),
            PocketExtent::ThroughAll,
            false,
        )
        .unwrap_err();
    assert!(matches!(err.error, EngineError::InvalidParameter { .. }));
}

#[test]
fn ambiguous_face_is_reported() {
    let mut kernel = PrismKernel::new();
    let mut body = plate(&mut kernel);
    body.add_pad(
        &mut kernel,
        "Rib",
        Sketch::on_datum(DatumPlane::XY, 4.0, vec![rect(0.0, 0.0, 2.0, 10.0)]),
        2.0,
        false,
    )
    .unwrap();
    let err = body
        .add_pocket(
            &mut kernel,
            "Hole",
            Sketch::on_face(FaceQuery::facing(Vector3::z()), vec![circle(6.0, 5.0, 1.0)]),
            PocketExtent::ThroughAll,
            false,
        )
        .unwrap_err();
    assert!(matches!(err.error, EngineError::AmbiguousSelection { count: 2, .. }));

    body.add_pocket(
        &mut kernel,
        "Hole",
        Sketch::on_face(
            FaceQuery::facing(Vector3::z()).at(Axis::Z, Bound::Max, 4.0),
            vec![circle(6.0, 5.0, 1.0)],
        )
        .authored_in(DatumPlane::XY),
        PocketExtent::ThroughAll,
        false,
    )
    .unwrap();
    assert!(!kernel
        .contains(&body.tip().unwrap(), &Point3::new(6.0, 5.0, 2.0))
        .unwrap());
}

#[test]
fn wide_through_pocket_cuts_a_thin_rib() {
    let mut kernel = PrismKernel::new();
    let mut body = Body::new("Rib");
    body.add_pad(
        &mut kernel,
        "Rib",
        Sketch::on_datum(DatumPlane::XY, 0.0, vec![rect(2.0, 0.0, 2.9, 10.0)]),
        4.0,
        false,
    )
    .unwrap();
    body.add_pocket(
        &mut kernel,
        "Window",
        Sketch::on_datum(DatumPlane::XY, 0.0, vec![rect(0.0, 2.0, 100.0, 8.0)]),
        PocketExtent::ThroughAll,
        false,
    )
    .unwrap();
    assert!(body.warnings().is_empty());
    let tip = body.tip().unwrap();
    assert!(!kernel.contains(&tip, &Point3::new(2.45, 5.0, 2.0)).unwrap());
    assert!(kernel.contains(&tip, &Point3::new(2.45, 1.0, 2.0)).unwrap());
    assert!(kernel.contains(&tip, &Point3::new(2.45, 9.0, 2.0)).unwrap());
}

#[test]
fn pocket_partly_over_the_solid_cuts_only_the_overlap() {
    let mut kernel = PrismKernel::new();
    let mut body = plate(&mut kernel);
    body.add_pocket(
        &mut kernel,
        "Corner",
        Sketch::on_datum(DatumPlane::XY, 0.0, vec![rect(6.0, -5.0, 30.0, 5.0)]),
        PocketExtent::ThroughAll,
        false,
    )
    .unwrap();
    assert!(body.warnings().is_empty());
    let tip = body.tip().unwrap();
    assert!(!kernel.contains(&tip, &Point3::new(8.0, 2.0, 2.0)).unwrap());
    assert!(kernel.contains(&tip, &Point3::new(8.0, 7.0, 2.0)).unwrap());
    assert!(kernel.contains(&tip, &Point3::new(3.0, 2.0, 2.0)).unwrap());
    assert_relative_eq!(kernel.volume(&tip).unwrap(), 320.0, max_relative = 2e-2);
}

#[test]
fn pocket_profile_missing_the_solid_is_a_warning() {
    let mut kernel = PrismKernel::new();
    let mut body = plate(&mut kernel);
    body.add_pocket(
        &mut kernel,
        "Notches",
        Sketch::on_datum(
            DatumPlane::XY,
            0.0,
            vec![rect(8.0, 8.0, 12.0, 12.0), rect(20.0, 20.0, 22.0, 22.0)],
        ),
        PocketExtent::ThroughAll,
        false,
    )
    .unwrap();
    assert_eq!(body.warnings().len(), 1);
    assert!(body.warnings()[0].starts_with("Notches"));
    assert!(!kernel
        .contains(&body.tip().unwrap(), &Point3::new(9.0, 9.0, 2.0))
        .unwrap());
}

#[test]
fn slot_across_the_top_leaves_two_faces() {
    let mut kernel = PrismKernel::new();
    let mut body = Body::new("Slotted");
    body.add_pad(
        &mut kernel,
        "Block",
        Sketch::on_datum(DatumPlane::XY, 0.0, vec![rect(0.0, 0.0, 30.0, 10.0)]),
        4.0,
        false,
    )
    .unwrap();
    body.add_pocket(
        &mut kernel,
        "Slot",
        Sketch::on_datum(DatumPlane::XY, 0.0, vec![rect(10.0, -1.0, 20.0, 11.0)]),
        PocketExtent::ThroughAll,
        false,
    )
    .unwrap();
    let tip = body.tip().unwrap();
    let top = FaceQuery::facing(Vector3::z()).at(Axis::Z, Bound::Max, 4.0);
    let err = select_face(&kernel, &tip, &top).unwrap_err();
    assert!(matches!(err, EngineError::AmbiguousSelection { count: 2, .. }));

    let left_query = top.clone().containing(Point3::new(5.0, 5.0, 4.0));
    let left = select_face(&kernel, &tip, &left_query).unwrap();
    assert_relative_eq!(left.bounding_box().max.x, 10.0, epsilon = 1e-6);
    let gap = select_face(&kernel, &tip, &top.containing(Point3::new(15.0, 5.0, 4.0)));
    assert!(matches!(gap, Err(EngineError::NoMatch { .. })));

    // A sketch on the split face needs a disambiguating predicate.
    let err = body
        .add_pocket(
            &mut kernel,
            "Hole",
            Sketch::on_face(FaceQuery::facing(Vector3::z()), vec![circle(5.0, 5.0, 1.0)]),
            PocketExtent::ThroughAll,
            false,
        )
        .unwrap_err();
    assert!(matches!(err.error, EngineError::AmbiguousSelection { count: 2, .. }));
}

// ── Fillet ─────────────────────────────────────────────────────────────────

#[test]
fn empty_fillet_selection_is_a_warning() {
    let mut kernel = PrismKernel::new();
    let mut body = plate(&mut kernel);
    let tip = body.tip();
    body.add_fillet(
        &mut kernel,
        "NoEdges",
        EdgeQuery::new().longer_than(1000.0),
        1.0,
    )
    .unwrap();
    assert_eq!(body.tip(), tip);
    assert_eq!(body.features().len(), 2);
    assert_eq!(body.warnings().len(), 1);
    assert!(body.warnings()[0].starts_with("NoEdges"));
}

#[test]
fn oversize_fillet_is_geometry_error() {
    let mut kernel = PrismKernel::new();
    let mut body = plate(&mut kernel);
    let err = body
        .add_fillet(
            &mut kernel,
            "Round",
            EdgeQuery::new()
                .midpoint_at(Axis::Y, 0.0)
                .midpoint_at(Axis::Z, 4.0),
            3.0,
        )
        .unwrap_err();
    assert!(matches!(err.error, EngineError::GeometryError { .. }));
}

// ── Recompute & mirror ─────────────────────────────────────────────────────

fn drilled_plate(kernel: &mut PrismKernel) -> Body {
    let mut body = plate(kernel);
    body.add_pocket(
        kernel,
        "Holes",
        Sketch::on_face(
            FaceQuery::facing(Vector3::z()),
            vec![circle(2.5, 5.0, 1.0), circle(7.5, 5.0, 1.0)],
        )
        .authored_in(DatumPlane::XY),
        PocketExtent::ThroughAll,
        false,
    )
    .unwrap();
    body
}

#[test]
fn recompute_matches_incremental() {
    let mut kernel = PrismKernel::new();
    let body = drilled_plate(&mut kernel);
    let again = recompute(body.name(), body.features(), &mut kernel).unwrap();
    assert_eq!(again.features(), body.features());
    let (a, b) = (body.tip().unwrap(), again.tip().unwrap());
    assert_ne!(a, b);
    assert_relative_eq!(
        kernel.volume(&a).unwrap(),
        kernel.volume(&b).unwrap(),
        epsilon = 1e-9
    );
    let (ba, bb) = (kernel.bounding_box(&a).unwrap(), kernel.bounding_box(&b).unwrap());
    assert_relative_eq!(ba.min, bb.min, epsilon = 1e-9);
    assert_relative_eq!(ba.max, bb.max, epsilon = 1e-9);
}

#[test]
fn mirror_body_is_independent_and_involutive() {
    let mut kernel = PrismKernel::new();
    let body = drilled_plate(&mut kernel);
    let plane = Point3::new(20.0, 0.0, 0.0);
    let right = mirror_body(&mut kernel, &body, "Right", plane, Vector3::x()).unwrap();
    assert_eq!(right.features().len(), 1);
    let rt = right.tip().unwrap();
    assert!(!kernel.contains(&rt, &Point3::new(37.5, 5.0, 2.0)).unwrap());
    assert!(kernel.contains(&rt, &Point3::new(35.0, 5.0, 2.0)).unwrap());

    let back = mirror_body(&mut kernel, &right, "Back", plane, Vector3::x()).unwrap();
    let (b0, b2) = (
        kernel.bounding_box(&body.tip().unwrap()).unwrap(),
        kernel.bounding_box(&back.tip().unwrap()).unwrap(),
    );
    assert_relative_eq!(b0.min, b2.min, epsilon = 1e-6);
    assert_relative_eq!(b0.max, b2.max, epsilon = 1e-6);

    // A mirrored body recomputes from its own history.
    let replayed = recompute(right.name(), right.features(), &mut kernel).unwrap();
    assert!(!kernel
        .contains(&replayed.tip().unwrap(), &Point3::new(37.5, 5.0, 2.0))
        .unwrap());
}

#[test]
fn sealed_body_rejects_features() {
    let mut kernel = PrismKernel::new();
    let mut body = plate(&mut kernel);
    body.seal();
    let err = body
        .add_fillet(&mut kernel, "Late", EdgeQuery::new(), 0.5)
        .unwrap_err();
    assert!(matches!(err.error, EngineError::SealedBody { .. }));
}

#[test]
fn features_serialize_round_trip() {
    let mut kernel = PrismKernel::new();
    let body = drilled_plate(&mut kernel);
    let json = serde_json::to_string(body.features()).unwrap();
    let back: Vec<Feature> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, body.features());
}

// ── Selection determinism ──────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn selection_is_repeatable(height in 1.0f64..8.0) {
        let mut kernel = PrismKernel::new();
        let mut body = plate(&mut kernel);
        body.add_pad(
            &mut kernel,
            "Rib",
            Sketch::on_datum(DatumPlane::XY, 4.0, vec![rect(0.0, 0.0, 2.0, 10.0)]),
            height,
            false,
        )
        .unwrap();
        let tip = body.tip().unwrap();
        let query = EdgeQuery::new().parallel_to(Vector3::y());
        let first = select_edges(&kernel, &tip, &query).unwrap();
        let second = select_edges(&kernel, &tip, &query).unwrap();
        prop_assert_eq!(first, second);
        let top = FaceQuery::facing(Vector3::z()).at(Axis::Z, Bound::Max, 4.0 + height);
        prop_assert_eq!(
            select_face(&kernel, &tip, &top).unwrap(),
            select_face(&kernel, &tip, &top).unwrap()
        );
    }
}
