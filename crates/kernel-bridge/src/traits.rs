use forge_types::{BoundingBox, Placement, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::descriptor::{BackendReply, OpDescriptor};
use crate::types::*;

/// Solid-modeling execution backend.
///
/// Implemented by [`crate::PrismKernel`], the deterministic reference
/// backend; other modelers plug in behind the same contract.
pub trait Kernel {
    /// Execute one operation. Never panics on bad input; failures come back
    /// as `success = false` replies.
    fn execute(&mut self, op: &OpDescriptor) -> BackendReply;

    /// Tessellate a solid's boundary.
    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        deflection: Deflection,
    ) -> Result<RenderMesh, KernelError>;
}

/// Read-only boundary queries over a solid.
///
/// Face and edge ids returned here are valid only for the snapshot of the
/// solid they were read from.
pub trait KernelIntrospect {
    fn faces(&self, solid: &KernelSolidHandle) -> Result<Vec<BrepFace>, KernelError>;

    fn edges(&self, solid: &KernelSolidHandle) -> Result<Vec<BrepEdge>, KernelError>;

    /// Faces meeting at an edge.
    fn edge_faces(&self, edge: KernelId) -> Result<Vec<KernelId>, KernelError>;

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<BoundingBox, KernelError>;

    /// Enclosed volume in mm³. Sampling backends return an estimate.
    fn volume(&self, solid: &KernelSolidHandle) -> Result<f64, KernelError>;
}

/// Capability contract for a face, independent of the kernel that
/// produced it.
pub trait FaceGeometry {
    fn id(&self) -> KernelId;

    /// Outward unit normal at surface parameters `(u, v)`.
    fn normal(&self, u: f64, v: f64) -> Vector3;

    /// Parameters of a representative interior point.
    fn uv_center(&self) -> (f64, f64);

    fn bounding_box(&self) -> BoundingBox;

    fn vertices(&self) -> &[Point3];

    /// Realized sketch frame for planar faces: normal is the outward normal,
    /// axes follow the face's own orientation. `None` for curved faces.
    fn frame(&self) -> Option<Placement>;
}

/// Capability contract for an edge.
pub trait EdgeGeometry {
    fn id(&self) -> KernelId;

    fn midpoint(&self) -> Point3;

    fn length(&self) -> f64;

    /// Unit tangent at the midpoint.
    fn direction(&self) -> Vector3;
}

/// Underlying surface of a face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceKind {
    Planar {
        frame: Placement,
    },
    /// Points are `base + axis·v + radius·(cos u · x_ref + sin u · y_ref)`.
    /// `outward` is `true` when the normal points away from the axis.
    Cylindrical {
        base: Point3,
        axis: Vector3,
        x_ref: Vector3,
        y_ref: Vector3,
        radius: f64,
        outward: bool,
    },
}

/// A boundary face snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrepFace {
    pub id: KernelId,
    pub surface: SurfaceKind,
    pub bbox: BoundingBox,
    pub vertices: Vec<Point3>,
    pub uv_center: (f64, f64),
}

impl FaceGeometry for BrepFace {
    fn id(&self) -> KernelId {
        self.id
    }

    fn normal(&self, u: f64, _v: f64) -> Vector3 {
        match &self.surface {
            SurfaceKind::Planar { frame } => frame.normal,
            SurfaceKind::Cylindrical {
                x_ref,
                y_ref,
                outward,
                ..
            } => {
                let radial = x_ref * u.cos() + y_ref * u.sin();
                if *outward {
                    radial
                } else {
                    -radial
                }
            }
        }
    }

    fn uv_center(&self) -> (f64, f64) {
        self.uv_center
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    fn frame(&self) -> Option<Placement> {
        match &self.surface {
            SurfaceKind::Planar { frame } => Some(*frame),
            SurfaceKind::Cylindrical { .. } => None,
        }
    }
}

/// Underlying curve of an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CurveKind {
    Line {
        start: Point3,
        end: Point3,
    },
    /// Arc from angle `start_angle` sweeping `sweep` radians about `axis`.
    Arc {
        center: Point3,
        axis: Vector3,
        x_ref: Vector3,
        y_ref: Vector3,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
}

impl CurveKind {
    pub fn point_at(&self, t: f64) -> Point3 {
        match self {
            CurveKind::Line { start, end } => start + (end - start) * t,
            CurveKind::Arc {
                center,
                x_ref,
                y_ref,
                radius,
                start_angle,
                sweep,
                ..
            } => {
                let a = start_angle + sweep * t;
                center + (x_ref * a.cos() + y_ref * a.sin()) * *radius
            }
        }
    }

    pub fn tangent_at(&self, t: f64) -> Vector3 {
        match self {
            CurveKind::Line { start, end } => {
                forge_types::try_normalize(&(end - start)).unwrap_or_else(Vector3::x)
            }
            CurveKind::Arc {
                x_ref,
                y_ref,
                start_angle,
                sweep,
                ..
            } => {
                let a = start_angle + sweep * t;
                let d = -x_ref * a.sin() + y_ref * a.cos();
                if *sweep < 0.0 {
                    -d
                } else {
                    d
                }
            }
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            CurveKind::Line { start, end } => (end - start).norm(),
            CurveKind::Arc { radius, sweep, .. } => radius * sweep.abs(),
        }
    }
}

/// A boundary edge snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrepEdge {
    pub id: KernelId,
    pub curve: CurveKind,
}

impl EdgeGeometry for BrepEdge {
    fn id(&self) -> KernelId {
        self.id
    }

    fn midpoint(&self) -> Point3 {
        self.curve.point_at(0.5)
    }

    fn length(&self) -> f64 {
        self.curve.length()
    }

    fn direction(&self) -> Vector3 {
        self.curve.tangent_at(0.5)
    }
}
