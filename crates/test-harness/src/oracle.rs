//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics.
//! This lets a scenario collect all failures in one pass.

use feature_engine::{matching_faces, select_edges};
use forge_types::{EdgeQuery, FaceQuery, Point3, Vector3};
use kernel_bridge::{KernelIntrospect, KernelSolidHandle, PrismKernel, RenderMesh};

use crate::helpers::{sample_box, triangle_normal};

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::pass(name, detail)
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::fail(name, detail)
        }
    }
}

fn fmt_point(p: &Point3) -> String {
    format!("({:.3}, {:.3}, {:.3})", p.x, p.y, p.z)
}

// ── Membership Oracles ──────────────────────────────────────────────────────

/// Check that no sample of the box `[min, max]` lies inside the solid.
pub fn check_void_box(
    kernel: &PrismKernel,
    solid: &KernelSolidHandle,
    min: Point3,
    max: Point3,
    samples: usize,
) -> OracleVerdict {
    let points = sample_box(&min, &max, samples);
    let mut filled = Vec::new();
    for p in &points {
        match kernel.contains(solid, p) {
            Ok(false) => {}
            Ok(true) => filled.push(*p),
            Err(e) => return OracleVerdict::fail("void_box", e.to_string()),
        }
    }
    if filled.is_empty() {
        OracleVerdict::pass(
            "void_box",
            format!("{} samples in {} -> {} are empty", points.len(), fmt_point(&min), fmt_point(&max)),
        )
    } else {
        OracleVerdict::fail_val(
            "void_box",
            format!(
                "{} of {} samples hold material, first at {}",
                filled.len(),
                points.len(),
                fmt_point(&filled[0])
            ),
            filled.len() as f64,
        )
    }
}

/// Check that every point lies inside the solid.
pub fn check_solid_points(
    kernel: &PrismKernel,
    solid: &KernelSolidHandle,
    points: &[Point3],
) -> OracleVerdict {
    let mut missing = Vec::new();
    for p in points {
        match kernel.contains(solid, p) {
            Ok(true) => {}
            Ok(false) => missing.push(fmt_point(p)),
            Err(e) => return OracleVerdict::fail("solid_points", e.to_string()),
        }
    }
    if missing.is_empty() {
        OracleVerdict::pass("solid_points", format!("all {} points inside", points.len()))
    } else {
        OracleVerdict::fail(
            "solid_points",
            format!("{} points outside: {}", missing.len(), missing.join(", ")),
        )
    }
}

// ── Geometry Oracles ────────────────────────────────────────────────────────

/// Check the solid's bounding box against expected corners.
pub fn check_bounding_box(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    expected_min: Point3,
    expected_max: Point3,
    tolerance: f64,
) -> OracleVerdict {
    let bbox = match introspect.bounding_box(solid) {
        Ok(b) => b,
        Err(e) => return OracleVerdict::fail("bounding_box", e.to_string()),
    };
    let off_min = (bbox.min - expected_min).amax();
    let off_max = (bbox.max - expected_max).amax();
    if off_min <= tolerance && off_max <= tolerance {
        OracleVerdict::pass(
            "bounding_box",
            format!("{} -> {}", fmt_point(&bbox.min), fmt_point(&bbox.max)),
        )
    } else {
        OracleVerdict::fail(
            "bounding_box",
            format!(
                "got {} -> {}, expected {} -> {} (tol={})",
                fmt_point(&bbox.min),
                fmt_point(&bbox.max),
                fmt_point(&expected_min),
                fmt_point(&expected_max),
                tolerance
            ),
        )
    }
}

/// Check the solid's volume within a relative tolerance.
pub fn check_volume(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    expected: f64,
    rel_tol: f64,
) -> OracleVerdict {
    let volume = match introspect.volume(solid) {
        Ok(v) => v,
        Err(e) => return OracleVerdict::fail("volume", e.to_string()),
    };
    let error = (volume - expected).abs() / expected.abs().max(f64::EPSILON);
    if error <= rel_tol {
        OracleVerdict::pass_val("volume", format!("{volume:.3} mm³ (expected {expected:.3})"), volume)
    } else {
        OracleVerdict::fail_val(
            "volume",
            format!("{volume:.3} mm³, expected {expected:.3} (rel err {error:.2e} > {rel_tol:.1e})"),
            volume,
        )
    }
}

/// Check that `mirrored` is the reflection of `original` across the plane
/// through `point` with `normal`: equal volumes and reflected bounding
/// boxes.
pub fn check_mirror_pair(
    introspect: &dyn KernelIntrospect,
    original: &KernelSolidHandle,
    mirrored: &KernelSolidHandle,
    point: Point3,
    normal: Vector3,
    rel_tol: f64,
) -> OracleVerdict {
    let Some(n) = forge_types::try_normalize(&normal) else {
        return OracleVerdict::fail("mirror_pair", "zero mirror normal".to_string());
    };
    let reflect = |p: &Point3| p - n * (2.0 * (p - point).dot(&n));
    let fetch = || -> Result<_, kernel_bridge::KernelError> {
        Ok((
            introspect.bounding_box(original)?,
            introspect.bounding_box(mirrored)?,
            introspect.volume(original)?,
            introspect.volume(mirrored)?,
        ))
    };
    let (a, b, va, vb) = match fetch() {
        Ok(values) => values,
        Err(e) => return OracleVerdict::fail("mirror_pair", e.to_string()),
    };

    let reflected = forge_types::BoundingBox::from_points(&[reflect(&a.min), reflect(&a.max)]);
    let bbox_off = (reflected.min - b.min).amax().max((reflected.max - b.max).amax());
    let vol_err = (va - vb).abs() / va.abs().max(f64::EPSILON);
    if bbox_off <= 1e-4 && vol_err <= rel_tol {
        OracleVerdict::pass_val(
            "mirror_pair",
            format!("volumes {va:.3} / {vb:.3}, boxes reflect"),
            vol_err,
        )
    } else {
        OracleVerdict::fail_val(
            "mirror_pair",
            format!("bbox offset {bbox_off:.2e}, volume rel err {vol_err:.2e}"),
            vol_err,
        )
    }
}

// ── Selection Oracles ───────────────────────────────────────────────────────

/// Run a face query `runs` times and check every run returns the same ids.
pub fn check_face_selection_stable(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    query: &FaceQuery,
    runs: usize,
) -> OracleVerdict {
    let select = || {
        matching_faces(introspect, solid, query)
            .map(|faces| faces.iter().map(|f| f.id).collect::<Vec<_>>())
    };
    stable("face_selection_stable", runs, select)
}

/// Run an edge query `runs` times and check every run returns the same ids.
pub fn check_edge_selection_stable(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    query: &EdgeQuery,
    runs: usize,
) -> OracleVerdict {
    let select = || {
        select_edges(introspect, solid, query)
            .map(|edges| edges.iter().map(|e| e.id).collect::<Vec<_>>())
    };
    stable("edge_selection_stable", runs, select)
}

fn stable<T: PartialEq + std::fmt::Debug, E: std::fmt::Display>(
    name: &str,
    runs: usize,
    select: impl Fn() -> Result<Vec<T>, E>,
) -> OracleVerdict {
    let first = match select() {
        Ok(ids) => ids,
        Err(e) => return OracleVerdict::fail(name, e.to_string()),
    };
    for run in 1..runs {
        match select() {
            Ok(ids) if ids == first => {}
            Ok(ids) => {
                return OracleVerdict::fail(
                    name,
                    format!("run {run} returned {ids:?}, first run {first:?}"),
                )
            }
            Err(e) => return OracleVerdict::fail(name, e.to_string()),
        }
    }
    OracleVerdict::pass_val(
        name,
        format!("{} entities, identical across {runs} runs", first.len()),
        first.len() as f64,
    )
}

// ── Mesh Oracles ────────────────────────────────────────────────────────────

/// Check that stored normals agree with triangle winding.
pub fn check_consistent_normals(mesh: &RenderMesh) -> OracleVerdict {
    let total = mesh.triangle_count();
    let inconsistent = (0..total)
        .filter(|&t| {
            let g = triangle_normal(mesh, t);
            let stored: f32 = (0..3)
                .map(|k| {
                    let i = mesh.indices[3 * t + k] as usize * 3;
                    g[0] * mesh.normals[i] + g[1] * mesh.normals[i + 1] + g[2] * mesh.normals[i + 2]
                })
                .sum();
            stored < 0.0
        })
        .count();
    if inconsistent == 0 {
        OracleVerdict::pass(
            "consistent_normals",
            format!("all {total} triangles have consistent winding"),
        )
    } else {
        OracleVerdict::fail(
            "consistent_normals",
            format!("{inconsistent} of {total} triangles have reversed normals"),
        )
    }
}

/// Check that no triangles have zero area.
pub fn check_no_degenerate_triangles(mesh: &RenderMesh) -> OracleVerdict {
    let total = mesh.triangle_count();
    let degenerate = (0..total)
        .filter(|&t| {
            let n = triangle_normal(mesh, t);
            (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() / 2.0 < 1e-12
        })
        .count();
    if degenerate == 0 {
        OracleVerdict::pass(
            "no_degenerate_triangles",
            format!("all {total} triangles have non-zero area"),
        )
    } else {
        OracleVerdict::fail(
            "no_degenerate_triangles",
            format!("{degenerate} of {total} triangles are degenerate"),
        )
    }
}

/// Check that all stored normals have approximately unit length.
pub fn check_unit_normals(mesh: &RenderMesh) -> OracleVerdict {
    let vertex_count = mesh.normals.len() / 3;
    let bad = mesh
        .normals
        .chunks(3)
        .filter(|n| n.len() == 3 && ((n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() - 1.0).abs() > 0.01)
        .count();
    if bad == 0 {
        OracleVerdict::pass("unit_normals", format!("all {vertex_count} normals are unit length"))
    } else {
        OracleVerdict::fail(
            "unit_normals",
            format!("{bad} of {vertex_count} normals are not unit length"),
        )
    }
}

/// Check that face ranges cover all indices without gaps or overlaps.
pub fn check_face_range_coverage(mesh: &RenderMesh) -> OracleVerdict {
    let ranges = &mesh.face_ranges;
    if ranges.is_empty() {
        return OracleVerdict::fail("face_range_coverage", "no face ranges defined".to_string());
    }
    let mut expected_start = 0u32;
    for (i, fr) in ranges.iter().enumerate() {
        if fr.start_index != expected_start {
            return OracleVerdict::fail(
                "face_range_coverage",
                format!(
                    "gap/overlap at range {i}: expected start={expected_start}, got start={}",
                    fr.start_index
                ),
            );
        }
        if fr.end_index <= fr.start_index {
            return OracleVerdict::fail("face_range_coverage", format!("empty range at index {i}"));
        }
        expected_start = fr.end_index;
    }
    if expected_start as usize != mesh.indices.len() {
        return OracleVerdict::fail(
            "face_range_coverage",
            format!(
                "ranges end at {expected_start} but mesh has {} indices",
                mesh.indices.len()
            ),
        );
    }
    OracleVerdict::pass("face_range_coverage", format!("{} ranges, no gaps", ranges.len()))
}

/// Check that all index values are within bounds.
pub fn check_valid_indices(mesh: &RenderMesh) -> OracleVerdict {
    let vertex_count = mesh.vertices.len() / 3;
    let bad: Vec<(usize, u32)> = mesh
        .indices
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, idx)| idx as usize >= vertex_count)
        .collect();
    if bad.is_empty() {
        OracleVerdict::pass("valid_indices", format!("all indices < {vertex_count}"))
    } else {
        OracleVerdict::fail(
            "valid_indices",
            format!(
                "{} out-of-bounds indices (vertex_count={vertex_count}): {:?}",
                bad.len(),
                &bad[..bad.len().min(5)]
            ),
        )
    }
}

// ── Composite ───────────────────────────────────────────────────────────────

/// Run every mesh check. Index validity runs first; the remaining checks
/// index into the vertex arrays and are skipped if it fails.
pub fn run_all_mesh_checks(mesh: &RenderMesh) -> Vec<OracleVerdict> {
    let indices = check_valid_indices(mesh);
    if !indices.passed {
        return vec![indices];
    }
    vec![
        indices,
        check_consistent_normals(mesh),
        check_no_degenerate_triangles(mesh),
        check_unit_normals(mesh),
        check_face_range_coverage(mesh),
    ]
}
