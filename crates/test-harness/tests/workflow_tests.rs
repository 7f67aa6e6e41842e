//! Tests for the ModelBuilder workflow API.

use feature_engine::Sketch;
use forge_types::{Axis, Bound, DatumPlane, EdgeQuery, FaceQuery, Point3, Vector3};
use test_harness::assertions::{assert_bounding_box, assert_history};
use test_harness::helpers::rect;
use test_harness::{HarnessError, ModelBuilder};

/// A 30 × 20 × 4 plate with a 4 mm wall standing on its front edge.
fn walled_plate() -> ModelBuilder {
    let mut m = ModelBuilder::new("Walled");
    m.pad_on("Plate", DatumPlane::XY, 0.0, vec![rect(0.0, 0.0, 30.0, 20.0)], 4.0)
        .unwrap();
    m.pad(
        "Wall",
        Sketch::on_face(
            FaceQuery::facing(Vector3::z()).at(Axis::Z, Bound::Max, 4.0),
            vec![rect(0.0, 0.0, 30.0, 4.0)],
        )
        .authored_in(DatumPlane::XY),
        10.0,
        false,
    )
    .unwrap();
    m
}

fn wall_root_edge() -> EdgeQuery {
    EdgeQuery::new()
        .parallel_to(Vector3::x())
        .midpoint_at(Axis::Y, 4.0)
        .midpoint_at(Axis::Z, 4.0)
}

// ── Construction ────────────────────────────────────────────────────────────

#[test]
fn empty_builder_has_no_solid() {
    let m = ModelBuilder::new("Empty");
    assert!(matches!(m.solid(), Err(HarnessError::NoSolid { .. })));
    assert!(m.body().features().is_empty());
}

#[test]
fn face_pad_stacks_on_the_plate() {
    let mut m = walled_plate();
    assert_history(m.body(), &[("Plate", "pad"), ("Wall", "pad")]).unwrap();
    assert!(m.contains(Point3::new(15.0, 2.0, 10.0)).unwrap());
    assert!(!m.contains(Point3::new(15.0, 10.0, 10.0)).unwrap());

    let mesh = m.mesh(kernel_bridge::Deflection::new(0.5, 0.5)).unwrap();
    assert_bounding_box(&mesh, [0.0, 0.0, 0.0], [30.0, 20.0, 14.0], 1e-3, "walled plate")
        .unwrap();
}

// ── Fillets ─────────────────────────────────────────────────────────────────

#[test]
fn concave_fillet_fills_the_wall_root() {
    let mut m = walled_plate();
    let probe = Point3::new(15.0, 4.2, 4.2);
    assert!(!m.contains(probe).unwrap());
    m.fillet("WallFillet", wall_root_edge(), 2.0).unwrap();
    assert!(m.contains(probe).unwrap());
    assert!(m.body().warnings().is_empty());
}

#[test]
fn empty_fillet_selection_warns_and_keeps_tip() {
    let mut m = walled_plate();
    let before = m.solid().unwrap();
    m.fillet("Nowhere", EdgeQuery::new().midpoint_at(Axis::Z, 100.0), 1.0)
        .unwrap();
    assert_eq!(m.solid().unwrap(), before);
    assert_eq!(m.body().warnings().len(), 1);
    assert!(m.body().warnings()[0].starts_with("Nowhere"));
}

#[test]
fn failed_fillet_is_recorded_by_name() {
    let mut m = walled_plate();
    assert!(m.fillet("Huge", wall_root_edge(), 50.0).is_err());
    assert_eq!(m.errors().len(), 1);
    assert_eq!(m.errors()[0].0, "Huge");
    assert_eq!(m.body().features().len(), 2);
}

// ── Mirror & Recompute ──────────────────────────────────────────────────────

#[test]
fn mirror_produces_independent_body() {
    let mut m = walled_plate();
    let right = m.mirror("Right", Point3::origin(), Vector3::x()).unwrap();
    assert_eq!(right.name(), "Right");
    assert_eq!(right.features().len(), 1);
    assert_eq!(right.features()[0].name, "Mirror of Walled");
    let tip = right.tip().unwrap();
    assert!(m.kernel().contains(&tip, &Point3::new(-15.0, 2.0, 10.0)).unwrap());
    // The source body is untouched.
    assert_eq!(m.body().features().len(), 2);
}

#[test]
fn recompute_reproduces_history() {
    let mut m = walled_plate();
    m.fillet("WallFillet", wall_root_edge(), 2.0).unwrap();
    let rebuilt = m.recompute().unwrap();
    assert_eq!(rebuilt.features(), m.body().features());
    let tip = rebuilt.tip().unwrap();
    assert!(m.kernel().contains(&tip, &Point3::new(15.0, 4.2, 4.2)).unwrap());
}
