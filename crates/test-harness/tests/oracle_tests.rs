//! Tests for verification oracles.

use forge_types::{DatumPlane, EdgeQuery, FaceQuery, Point3, Vector3};
use kernel_bridge::{Deflection, FaceRange, KernelId, RenderMesh};
use test_harness::helpers::rect;
use test_harness::oracle::*;
use test_harness::ModelBuilder;

/// A 30 × 20 × 4 slab on the XY plane.
fn slab() -> ModelBuilder {
    let mut m = ModelBuilder::new("Slab");
    m.pad_on("Base", DatumPlane::XY, 0.0, vec![rect(0.0, 0.0, 30.0, 20.0)], 4.0)
        .unwrap();
    m
}

/// One triangle in the XY plane, facing +Z.
fn single_triangle() -> RenderMesh {
    RenderMesh {
        vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        indices: vec![0, 1, 2],
        face_ranges: vec![FaceRange {
            face_id: KernelId(0),
            start_index: 0,
            end_index: 3,
        }],
    }
}

// ── Membership Oracle Tests ─────────────────────────────────────────────────

#[test]
fn void_box_passes_outside_slab() {
    let m = slab();
    let v = m
        .check_void(Point3::new(31.0, 0.0, 0.0), Point3::new(40.0, 20.0, 4.0), 4)
        .unwrap();
    assert!(v.passed, "{}", v.detail);
}

#[test]
fn void_box_fails_inside_slab() {
    let m = slab();
    let v = m
        .check_void(Point3::new(10.0, 5.0, 1.0), Point3::new(20.0, 15.0, 3.0), 3)
        .unwrap();
    assert!(!v.passed);
    assert_eq!(v.value, Some(27.0));
}

#[test]
fn solid_points_reports_points_outside() {
    let m = slab();
    let inside = m.check_solid(&[Point3::new(15.0, 10.0, 2.0)]).unwrap();
    assert!(inside.passed, "{}", inside.detail);
    let outside = m
        .check_solid(&[Point3::new(15.0, 10.0, 2.0), Point3::new(15.0, 10.0, 5.0)])
        .unwrap();
    assert!(!outside.passed);
    assert!(outside.detail.contains("1 points outside"), "{}", outside.detail);
}

// ── Geometry Oracle Tests ───────────────────────────────────────────────────

#[test]
fn bounding_box_matches_slab() {
    let m = slab();
    let solid = m.solid().unwrap();
    let v = check_bounding_box(
        m.kernel(),
        &solid,
        Point3::origin(),
        Point3::new(30.0, 20.0, 4.0),
        1e-6,
    );
    assert!(v.passed, "{}", v.detail);

    let wrong = check_bounding_box(
        m.kernel(),
        &solid,
        Point3::origin(),
        Point3::new(30.0, 20.0, 5.0),
        0.1,
    );
    assert!(!wrong.passed);
}

#[test]
fn volume_check_uses_relative_tolerance() {
    let m = slab();
    let solid = m.solid().unwrap();
    let ok = check_volume(m.kernel(), &solid, 2400.0, 1e-6);
    assert!(ok.passed, "{}", ok.detail);
    let bad = check_volume(m.kernel(), &solid, 2500.0, 1e-3);
    assert!(!bad.passed);
    assert!(bad.value.is_some());
}

#[test]
fn mirror_pair_accepts_reflection_and_rejects_copy() {
    let mut m = slab();
    let original = m.solid().unwrap();
    let mirrored = m
        .mirror("SlabMirror", Point3::origin(), Vector3::x())
        .unwrap()
        .tip()
        .unwrap();

    let v = check_mirror_pair(
        m.kernel(),
        &original,
        &mirrored,
        Point3::origin(),
        Vector3::x(),
        1e-3,
    );
    assert!(v.passed, "{}", v.detail);

    let same = check_mirror_pair(
        m.kernel(),
        &original,
        &original,
        Point3::origin(),
        Vector3::x(),
        1e-3,
    );
    assert!(!same.passed);
}

// ── Selection Oracle Tests ──────────────────────────────────────────────────

#[test]
fn face_selection_is_stable() {
    let m = slab();
    let solid = m.solid().unwrap();
    let v = check_face_selection_stable(m.kernel(), &solid, &FaceQuery::facing(Vector3::z()), 5);
    assert!(v.passed, "{}", v.detail);
    assert_eq!(v.value, Some(1.0));
}

#[test]
fn edge_selection_is_stable() {
    let m = slab();
    let solid = m.solid().unwrap();
    let query = EdgeQuery::new().parallel_to(Vector3::x());
    let v = check_edge_selection_stable(m.kernel(), &solid, &query, 5);
    assert!(v.passed, "{}", v.detail);
    assert_eq!(v.value, Some(4.0));
}

#[test]
fn zero_normal_face_query_fails_selection_check() {
    let m = slab();
    let solid = m.solid().unwrap();
    let v = check_face_selection_stable(m.kernel(), &solid, &FaceQuery::facing(Vector3::zeros()), 2);
    assert!(!v.passed);
}

// ── Mesh Oracle Tests ───────────────────────────────────────────────────────

#[test]
fn slab_mesh_passes_all_checks() {
    let mut m = slab();
    let mesh = m.mesh(Deflection::new(0.5, 0.5)).unwrap();
    let verdicts = run_all_mesh_checks(&mesh);
    assert_eq!(verdicts.len(), 5);
    for v in &verdicts {
        assert!(v.passed, "{}: {}", v.oracle_name, v.detail);
    }
}

#[test]
fn flipped_normals_are_detected() {
    let mut mesh = single_triangle();
    for n in mesh.normals.iter_mut() {
        *n = -*n;
    }
    let v = check_consistent_normals(&mesh);
    assert!(!v.passed);
    assert!(v.detail.contains("1 of 1"), "{}", v.detail);
}

#[test]
fn degenerate_triangle_is_detected() {
    let mut mesh = single_triangle();
    mesh.vertices = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0];
    assert!(!check_no_degenerate_triangles(&mesh).passed);
}

#[test]
fn non_unit_normals_are_detected() {
    let mut mesh = single_triangle();
    mesh.normals[2] = 2.0;
    assert!(!check_unit_normals(&mesh).passed);
}

#[test]
fn face_range_gap_is_detected() {
    let mut mesh = single_triangle();
    mesh.face_ranges[0].start_index = 1;
    let v = check_face_range_coverage(&mesh);
    assert!(!v.passed);
    assert!(v.detail.contains("gap/overlap"), "{}", v.detail);

    mesh.face_ranges.clear();
    assert!(!check_face_range_coverage(&mesh).passed);
}

#[test]
fn bad_index_stops_remaining_checks() {
    let mut mesh = single_triangle();
    mesh.indices[2] = 7;
    let verdicts = run_all_mesh_checks(&mesh);
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].oracle_name, "valid_indices");
    assert!(!verdicts[0].passed);
}
