//! Oracle checks over the finished rack-panel and bracket designs.

use feature_engine::Body;
use forge_types::{Point3, Vector3};
use kernel_bridge::{Deflection, Kernel, KernelSolidHandle, PrismKernel};
use part_recipes::{build_design, BuildReport, Design};
use test_harness::assertions::assert_verdict;
use test_harness::oracle::*;

fn build(design: &Design) -> (PrismKernel, BuildReport) {
    let mut kernel = PrismKernel::new();
    let report = build_design(design, &mut kernel);
    assert!(report.is_success(), "{}", report.to_text());
    (kernel, report)
}

fn tip(report: &BuildReport, name: &str) -> KernelSolidHandle {
    report
        .body(name)
        .and_then(Body::tip)
        .unwrap_or_else(|| panic!("{name} was not built"))
}

// ── Rack Panel ──────────────────────────────────────────────────────────────

#[test]
fn tabs_are_mirror_images_about_the_panel_center() {
    let (kernel, report) = build(&Design::rack_panel(false).unwrap());
    let left = tip(&report, "LeftTab");
    let right = tip(&report, "RightTab");
    let v = check_mirror_pair(
        &kernel,
        &left,
        &right,
        Point3::new(106.0, 0.0, 0.0),
        Vector3::x(),
        1e-3,
    );
    assert_verdict(v, "tabs").unwrap();
}

#[test]
fn center_panel_mesh_is_well_formed() {
    let (mut kernel, report) = build(&Design::rack_panel(true).unwrap());
    let panel = tip(&report, "CenterPanel");
    let mesh = kernel.tessellate(&panel, Deflection::new(0.5, 0.5)).unwrap();
    assert!(mesh.triangle_count() > 0);
    assert_verdict(check_valid_indices(&mesh), "panel indices").unwrap();
    assert_verdict(check_face_range_coverage(&mesh), "panel ranges").unwrap();
}

#[test]
fn box_cutouts_are_open_through_the_faceplate() {
    let (kernel, report) = build(&Design::rack_panel(false).unwrap());
    let panel = tip(&report, "CenterPanel");
    // Left bay opening inset by the cutout lip: x 36..93, y 7..38.
    let v = check_void_box(
        &kernel,
        &panel,
        Point3::new(36.5, 7.5, 0.1),
        Point3::new(92.5, 37.5, 3.9),
        5,
    );
    assert_verdict(v, "left cutout").unwrap();
}

// ── Brackets ────────────────────────────────────────────────────────────────

#[test]
fn right_brackets_mirror_the_left_ones() {
    let (kernel, report) = build(&Design::brackets().unwrap());
    for (left, right) in [
        ("TopBracketLeft", "TopBracketRight"),
        ("BottomBracketLeft", "BottomBracketRight"),
    ] {
        let v = check_mirror_pair(
            &kernel,
            &tip(&report, left),
            &tip(&report, right),
            Point3::origin(),
            Vector3::x(),
            1e-3,
        );
        assert_verdict(v, left).unwrap();
    }
}

#[test]
fn bracket_selection_is_stable_after_build() {
    let (kernel, report) = build(&Design::brackets().unwrap());
    let solid = tip(&report, "TopBracketLeft");
    let query = forge_types::EdgeQuery::new().parallel_to(Vector3::z());
    let v = check_edge_selection_stable(&kernel, &solid, &query, 3);
    assert!(v.passed, "{}", v.detail);
    assert!(v.value.unwrap_or(0.0) > 0.0);
}
