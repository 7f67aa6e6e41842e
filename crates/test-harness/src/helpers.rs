//! Helper functions: error type, profile shortcuts, mesh math.

use feature_engine::FeatureError;
use forge_types::{Point2, Point3, Profile};
use kernel_bridge::{KernelError, RenderMesh};
use sketch_profiles::ProfileError;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("body '{name}' has no solid yet")]
    NoSolid { name: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },
}

// ── Profile Shortcuts ───────────────────────────────────────────────────────

/// Axis-aligned rectangle, unvalidated.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Profile {
    Profile::Polygon {
        vertices: vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ],
    }
}

pub fn circle(x: f64, y: f64, radius: f64) -> Profile {
    Profile::Circle {
        center: Point2::new(x, y),
        radius,
    }
}

// ── Sampling ────────────────────────────────────────────────────────────────

/// Cell-centered `n × n × n` sample grid over the box `[min, max]`.
pub fn sample_box(min: &Point3, max: &Point3, n: usize) -> Vec<Point3> {
    let n = n.max(1);
    let step = (max - min) / n as f64;
    let mut points = Vec::with_capacity(n * n * n);
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                points.push(Point3::new(
                    min.x + step.x * (i as f64 + 0.5),
                    min.y + step.y * (j as f64 + 0.5),
                    min.z + step.z * (k as f64 + 0.5),
                ));
            }
        }
    }
    points
}

// ── Mesh Math ───────────────────────────────────────────────────────────────

/// Compute the bounding box of a mesh: (min, max).
pub fn mesh_bounding_box(mesh: &RenderMesh) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for chunk in mesh.vertices.chunks(3) {
        if chunk.len() < 3 {
            continue;
        }
        for i in 0..3 {
            min[i] = min[i].min(chunk[i]);
            max[i] = max[i].max(chunk[i]);
        }
    }
    (min, max)
}

/// Geometric (unnormalized) normal of triangle `t`.
pub(crate) fn triangle_normal(mesh: &RenderMesh, t: usize) -> [f32; 3] {
    let [a, b, c] = [
        mesh.vertex(mesh.indices[3 * t]),
        mesh.vertex(mesh.indices[3 * t + 1]),
        mesh.vertex(mesh.indices[3 * t + 2]),
    ];
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}
