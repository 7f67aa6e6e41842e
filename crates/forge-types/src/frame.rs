//! Sketch placements and the global <-> face-local coordinate mapping.
//!
//! A [`Placement`] is an orthonormal frame: an origin on the sketch plane,
//! in-plane `x_axis`/`y_axis`, and the plane `normal`. Local sketch
//! coordinates `(u, v)` map to `origin + u·x_axis + v·y_axis`.
//!
//! The frame a face placement uses always comes from the face's realized
//! orientation reported by the kernel. Two faces of a symmetric part can
//! legitimately have opposite `x_axis` signs; callers must not assume one.

use serde::{Deserialize, Serialize};

use crate::geom::{try_normalize, Point2, Point3, Vector3};

/// Round-trip precision guaranteed by `to_local`/`from_local`, in mm.
pub const ROUND_TRIP_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("degenerate frame: {reason}")]
    Degenerate { reason: String },
}

/// Fixed reference planes through the global origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatumPlane {
    /// u = +X, v = +Y, normal = +Z.
    XY,
    /// u = +X, v = +Z, normal = −Y.
    XZ,
    /// u = +Y, v = +Z, normal = +X.
    YZ,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub origin: Point3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
    pub normal: Vector3,
}

impl Placement {
    /// Build a right-handed frame from a normal and an in-plane direction hint.
    ///
    /// The hint is projected onto the plane; it must not be parallel to
    /// the normal.
    pub fn new(origin: Point3, normal: Vector3, x_hint: Vector3) -> Result<Self, FrameError> {
        let normal = try_normalize(&normal).ok_or_else(|| FrameError::Degenerate {
            reason: "normal has zero length".to_string(),
        })?;
        let projected = x_hint - normal * x_hint.dot(&normal);
        let x_axis = try_normalize(&projected).ok_or_else(|| FrameError::Degenerate {
            reason: "x direction is parallel to the normal".to_string(),
        })?;
        let y_axis = normal.cross(&x_axis);
        Ok(Self {
            origin,
            x_axis,
            y_axis,
            normal,
        })
    }

    /// Frame with an x axis derived from the normal alone.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self, FrameError> {
        Self::new(origin, normal, tangent_x_from_normal(&normal))
    }

    pub fn datum(plane: DatumPlane) -> Self {
        let (x_axis, y_axis, normal) = match plane {
            DatumPlane::XY => (Vector3::x(), Vector3::y(), Vector3::z()),
            DatumPlane::XZ => (Vector3::x(), Vector3::z(), -Vector3::y()),
            DatumPlane::YZ => (Vector3::y(), Vector3::z(), Vector3::x()),
        };
        Self {
            origin: Point3::origin(),
            x_axis,
            y_axis,
            normal,
        }
    }

    /// Same frame moved `distance` along its normal.
    pub fn offset(&self, distance: f64) -> Self {
        Self {
            origin: self.origin + self.normal * distance,
            ..*self
        }
    }

    /// The frame seen from the other side: normal and x axis negated.
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            x_axis: -self.x_axis,
            y_axis: self.y_axis,
            normal: -self.normal,
        }
    }

    /// `true` when `x × y` points along `normal`. Reflected frames are
    /// left-handed.
    pub fn is_right_handed(&self) -> bool {
        self.x_axis.cross(&self.y_axis).dot(&self.normal) > 0.0
    }

    /// Global point to local `(u, v)`. Points off the plane are projected
    /// along the normal first.
    pub fn to_local(&self, p: &Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(&self.x_axis), d.dot(&self.y_axis))
    }

    /// Local `(u, v)` to the global point on the plane.
    pub fn from_local(&self, uv: &Point2) -> Point3 {
        self.origin + self.x_axis * uv.x + self.y_axis * uv.y
    }

    /// Signed distance of `p` from the plane along the normal.
    pub fn height(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(&self.normal)
    }

    pub fn project(&self, p: &Point3) -> Point3 {
        p - self.normal * self.height(p)
    }

    pub fn contains(&self, p: &Point3, tolerance: f64) -> bool {
        self.height(p).abs() <= tolerance
    }

    /// Local coordinates of a global direction, ignoring its normal part.
    pub fn direction_to_local(&self, d: &Vector3) -> (f64, f64) {
        (d.dot(&self.x_axis), d.dot(&self.y_axis))
    }

    /// Map a point authored in `authoring` coordinates onto this plane.
    ///
    /// The authored point is lifted to 3D through `authoring`, projected
    /// onto this plane, and expressed in this frame's axes. When this frame's
    /// axes are mirrored relative to `authoring` the result carries the
    /// opposite sign, which keeps the geometry at the same global location.
    pub fn remap_from(&self, authoring: &Placement, uv: &Point2) -> Point2 {
        self.to_local(&self.project(&authoring.from_local(uv)))
    }
}

/// Pick a stable in-plane direction for a plane with the given normal.
pub fn tangent_x_from_normal(normal: &Vector3) -> Vector3 {
    let up = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let y = normal.cross(&up);
    let x = y.cross(normal);
    try_normalize(&x).unwrap_or_else(Vector3::x)
}
