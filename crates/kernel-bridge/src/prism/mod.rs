//! PrismKernel: the deterministic reference backend.
//!
//! A solid is an ordered list of swept profiles and fillet wedges, each
//! either added or removed. Membership is exact; the boundary (faces,
//! edges, frames) is recovered by sampling and cached per handle. Solids
//! are immutable once created, so cached boundaries never go stale.

mod boundary;
mod mesh;
mod solid;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use forge_types::{BoundingBox, Matrix4, Point3};
use tracing::{debug, instrument};

use boundary::Boundary;
use solid::{prisms_from_sweep, FilletWedge, Primitive, PrismSolid, Term};

use crate::descriptor::{BackendReply, BooleanMode, OpDescriptor, SweepSpec};
use crate::traits::*;
use crate::types::*;

/// Grid resolution per axis for volume estimates.
const VOLUME_RESOLUTION: usize = 64;

/// Reference backend over exact CSG membership.
pub struct PrismKernel {
    next_handle: u64,
    solids: HashMap<u64, PrismSolid>,
    boundaries: RefCell<HashMap<u64, Rc<Boundary>>>,
}

impl PrismKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
            boundaries: RefCell::new(HashMap::new()),
        }
    }

    fn store_solid(&mut self, solid: PrismSolid) -> KernelSolidHandle {
        let handle = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn solid(&self, handle: &KernelSolidHandle) -> Result<&PrismSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::SolidNotFound { handle: *handle })
    }

    fn boundary(&self, handle: &KernelSolidHandle) -> Result<Rc<Boundary>, KernelError> {
        if let Some(b) = self.boundaries.borrow().get(&handle.id()) {
            return Ok(Rc::clone(b));
        }
        let extracted = Rc::new(boundary::extract(self.solid(handle)?, handle));
        debug!(
            handle = handle.id(),
            faces = extracted.faces.len(),
            edges = extracted.edges.len(),
            "extracted boundary"
        );
        self.boundaries
            .borrow_mut()
            .insert(handle.id(), Rc::clone(&extracted));
        Ok(extracted)
    }

    /// Point membership test. Points on the boundary may go either way.
    pub fn contains(&self, solid: &KernelSolidHandle, p: &Point3) -> Result<bool, KernelError> {
        Ok(self.solid(solid)?.contains(p))
    }

    /// Number of solids held by this session.
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn sweep(
        &mut self,
        target: Option<KernelSolidHandle>,
        sweep: &SweepSpec,
        mode: BooleanMode,
    ) -> Result<KernelSolidHandle, KernelError> {
        let prisms = prisms_from_sweep(sweep)?;
        let solid = match (mode, target) {
            (BooleanMode::NewSolid, None) => PrismSolid {
                terms: prisms
                    .into_iter()
                    .map(|p| Term::Add(Primitive::Prism(p)))
                    .collect(),
            },
            (BooleanMode::NewSolid, Some(_)) => {
                return Err(KernelError::InvalidInput {
                    reason: "a new solid takes no target".to_string(),
                })
            }
            (_, None) => {
                return Err(KernelError::InvalidInput {
                    reason: "boolean sweep needs a target".to_string(),
                })
            }
            (BooleanMode::Union, Some(t)) => self
                .solid(&t)?
                .with_terms(prisms.into_iter().map(|p| Term::Add(Primitive::Prism(p)))),
            (BooleanMode::Subtract, Some(t)) => {
                let base = self.solid(&t)?;
                if !prisms.iter().any(|p| base.intersects(p)) {
                    return Err(KernelError::DisjointTool);
                }
                base.with_terms(prisms.into_iter().map(|p| Term::Cut(Primitive::Prism(p))))
            }
        };
        Ok(self.store_solid(solid))
    }

    fn fillet(
        &mut self,
        target: KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(KernelError::InvalidInput {
                reason: format!("fillet radius {radius} must be positive"),
            });
        }
        if edges.is_empty() {
            return Err(KernelError::InvalidInput {
                reason: "fillet needs at least one edge".to_string(),
            });
        }
        let boundary = self.boundary(&target)?;
        let mut wedges = Vec::with_capacity(edges.len());
        for &id in edges {
            let record = boundary
                .edges
                .get(id.index())
                .filter(|_| id.is_edge() && id.solid() == target)
                .ok_or(KernelError::EntityNotFound { id })?;
            let CurveKind::Line { start, end } = record.edge.curve else {
                return Err(KernelError::FilletFailed {
                    reason: format!("edge {} is not straight", id.0),
                });
            };
            let frames = (
                boundary.faces[record.faces[0]].face.frame(),
                boundary.faces[record.faces[1]].face.frame(),
            );
            let (Some(a), Some(b)) = frames else {
                return Err(KernelError::FilletFailed {
                    reason: format!("edge {} borders a curved face", id.0),
                });
            };
            if a.normal.dot(&b.normal).abs() > 1e-6 {
                return Err(KernelError::FilletFailed {
                    reason: format!("faces at edge {} are not perpendicular", id.0),
                });
            }
            let span = end - start;
            let length = span.norm();
            let (u, v) = if record.convex {
                (-a.normal, -b.normal)
            } else {
                (a.normal, b.normal)
            };
            let wedge = Primitive::Wedge(FilletWedge::new(start, span / length, u, v, length, radius));
            wedges.push(if record.convex {
                Term::Cut(wedge)
            } else {
                Term::Add(wedge)
            });
        }
        let solid = self.solid(&target)?.with_terms(wedges);
        Ok(self.store_solid(solid))
    }

    fn transform(
        &mut self,
        target: KernelSolidHandle,
        matrix: &Matrix4,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid = self.solid(&target)?.transformed(matrix)?;
        Ok(self.store_solid(solid))
    }
}

impl Default for PrismKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for PrismKernel {
    #[instrument(skip(self, op), fields(op = op.name()))]
    fn execute(&mut self, op: &OpDescriptor) -> BackendReply {
        let result = match op {
            OpDescriptor::Sweep {
                target,
                sweep,
                mode,
            } => self.sweep(*target, sweep, *mode),
            OpDescriptor::Fillet {
                target,
                edges,
                radius,
            } => self.fillet(*target, edges, *radius),
            OpDescriptor::Transform { target, matrix } => self.transform(*target, matrix),
        };
        match &result {
            Ok(handle) => debug!(handle = handle.id(), "operation complete"),
            Err(err) => debug!(error = %err, "operation rejected"),
        }
        BackendReply::from_result(result)
    }

    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        deflection: Deflection,
    ) -> Result<RenderMesh, KernelError> {
        let boundary = self.boundary(solid)?;
        mesh::tessellate(self.solid(solid)?, &boundary, deflection)
    }
}

impl KernelIntrospect for PrismKernel {
    fn faces(&self, solid: &KernelSolidHandle) -> Result<Vec<BrepFace>, KernelError> {
        Ok(self
            .boundary(solid)?
            .faces
            .iter()
            .map(|f| f.face.clone())
            .collect())
    }

    fn edges(&self, solid: &KernelSolidHandle) -> Result<Vec<BrepEdge>, KernelError> {
        Ok(self
            .boundary(solid)?
            .edges
            .iter()
            .map(|e| e.edge.clone())
            .collect())
    }

    fn edge_faces(&self, edge: KernelId) -> Result<Vec<KernelId>, KernelError> {
        let boundary = self.boundary(&edge.solid())?;
        let record = boundary
            .edges
            .get(edge.index())
            .filter(|_| edge.is_edge())
            .ok_or(KernelError::EntityNotFound { id: edge })?;
        Ok(record
            .faces
            .iter()
            .map(|&i| boundary.faces[i].face.id)
            .collect())
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<BoundingBox, KernelError> {
        Ok(self.boundary(solid)?.bbox)
    }

    /// Approximate: a midpoint-rule count over a `VOLUME_RESOLUTION³` grid
    /// spanning the added material. Exact only when every face lies on a
    /// grid plane, so compare volumes with a relative tolerance.
    fn volume(&self, solid: &KernelSolidHandle) -> Result<f64, KernelError> {
        Ok(self.solid(solid)?.volume(VOLUME_RESOLUTION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FailureKind;
    use approx::assert_relative_eq;
    use forge_types::{DatumPlane, Placement, Point2, Profile, Vector3};

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

    fn sweep_op(
        target: Option<KernelSolidHandle>,
        profile: Profile,
        start: f64,
        length: f64,
        mode: BooleanMode,
    ) -> OpDescriptor {
        OpDescriptor::Sweep {
            target,
            sweep: SweepSpec {
                placement: Placement::datum(DatumPlane::XY),
                profiles: vec![profile],
                start,
                length,
            },
            mode,
        }
    }

    fn plate(kernel: &mut PrismKernel) -> KernelSolidHandle {
        kernel
            .execute(&sweep_op(None, rect(0.0, 0.0, 30.0, 20.0), 0.0, 4.0, BooleanMode::NewSolid))
            .into_result()
            .unwrap()
    }

    #[test]
    fn test_new_solid_volume_and_faces() {
        let mut kernel = PrismKernel::new();
        let h = plate(&mut kernel);
        assert_relative_eq!(kernel.volume(&h).unwrap(), 2400.0, epsilon = 1e-6);
        assert_eq!(kernel.faces(&h).unwrap().len(), 6);
        assert_eq!(kernel.edges(&h).unwrap().len(), 12);
    }

    #[test]
    fn test_volume_is_an_estimate_off_grid() {
        let mut kernel = PrismKernel::new();
        let h = plate(&mut kernel);
        // x = 10.1 falls between grid planes.
        let cut = kernel
            .execute(&sweep_op(Some(h), rect(-1.0, -1.0, 10.1, 21.0), -1.0, 6.0, BooleanMode::Subtract))
            .into_result()
            .unwrap();
        let exact = 19.9 * 20.0 * 4.0;
        let estimate = kernel.volume(&cut).unwrap();
        assert!((estimate - exact).abs() > 1.0);
        assert_relative_eq!(estimate, exact, max_relative = 2.0 / VOLUME_RESOLUTION as f64);
    }

    #[test]
    fn test_wide_subtract_over_thin_rib_is_not_disjoint() {
        let mut kernel = PrismKernel::new();
        let rib = kernel
            .execute(&sweep_op(None, rect(2.0, 0.0, 2.9, 10.0), 0.0, 4.0, BooleanMode::NewSolid))
            .into_result()
            .unwrap();
        let cut = kernel
            .execute(&sweep_op(Some(rib), rect(0.0, 2.0, 100.0, 8.0), -1.0, 6.0, BooleanMode::Subtract))
            .into_result()
            .unwrap();
        assert!(!kernel.contains(&cut, &Point3::new(2.45, 5.0, 2.0)).unwrap());
        assert!(kernel.contains(&cut, &Point3::new(2.45, 9.0, 2.0)).unwrap());
    }

    #[test]
    fn test_disjoint_subtract_is_classified() {
        let mut kernel = PrismKernel::new();
        let h = plate(&mut kernel);
        let reply = kernel.execute(&sweep_op(
            Some(h),
            rect(50.0, 50.0, 60.0, 60.0),
            0.0,
            4.0,
            BooleanMode::Subtract,
        ));
        assert!(!reply.success);
        assert_eq!(reply.failure_kind, Some(FailureKind::DisjointTool));
        assert_eq!(kernel.solid_count(), 1);
    }

    #[test]
    fn test_subtract_creates_new_handle() {
        let mut kernel = PrismKernel::new();
        let h = plate(&mut kernel);
        let cut = kernel
            .execute(&sweep_op(
                Some(h),
                rect(10.0, 5.0, 20.0, 15.0),
                -1.0,
                6.0,
                BooleanMode::Subtract,
            ))
            .into_result()
            .unwrap();
        assert_ne!(cut, h);
        assert!(kernel.contains(&h, &Point3::new(15.0, 10.0, 2.0)).unwrap());
        assert!(!kernel.contains(&cut, &Point3::new(15.0, 10.0, 2.0)).unwrap());
        assert_relative_eq!(kernel.volume(&cut).unwrap(), 2000.0, epsilon = 20.0);
    }

    #[test]
    fn test_concave_fillet_adds_material() {
        let mut kernel = PrismKernel::new();
        let h = plate(&mut kernel);
        let walled = kernel
            .execute(&sweep_op(
                Some(h),
                rect(0.0, 0.0, 30.0, 4.0),
                4.0,
                10.0,
                BooleanMode::Union,
            ))
            .into_result()
            .unwrap();
        let concave = kernel
            .edges(&walled)
            .unwrap()
            .into_iter()
            .find(|e| (e.midpoint() - Point3::new(15.0, 4.0, 4.0)).norm() < 1e-6)
            .unwrap();
        let faces = kernel.edge_faces(concave.id).unwrap();
        assert_eq!(faces.len(), 2);

        let filleted = kernel
            .execute(&OpDescriptor::Fillet {
                target: walled,
                edges: vec![concave.id],
                radius: 2.0,
            })
            .into_result()
            .unwrap();
        assert!(kernel
            .contains(&filleted, &Point3::new(15.0, 4.2, 4.2))
            .unwrap());
        assert!(!kernel.contains(&walled, &Point3::new(15.0, 4.2, 4.2)).unwrap());
    }

    #[test]
    fn test_convex_fillet_removes_corner() {
        let mut kernel = PrismKernel::new();
        let h = plate(&mut kernel);
        let edge = kernel
            .edges(&h)
            .unwrap()
            .into_iter()
            .find(|e| (e.midpoint() - Point3::new(15.0, 0.0, 4.0)).norm() < 1e-6)
            .unwrap();
        let rounded = kernel
            .execute(&OpDescriptor::Fillet {
                target: h,
                edges: vec![edge.id],
                radius: 1.0,
            })
            .into_result()
            .unwrap();
        assert!(!kernel
            .contains(&rounded, &Point3::new(15.0, 0.05, 3.95))
            .unwrap());
        assert!(kernel.contains(&rounded, &Point3::new(15.0, 0.5, 3.5)).unwrap());
    }

    #[test]
    fn test_reflection_transform() {
        let mut kernel = PrismKernel::new();
        let h = plate(&mut kernel);
        let mut m = Matrix4::identity();
        m[(0, 0)] = -1.0;
        let mirrored = kernel
            .execute(&OpDescriptor::Transform {
                target: h,
                matrix: m,
            })
            .into_result()
            .unwrap();
        let bb = kernel.bounding_box(&mirrored).unwrap();
        assert_relative_eq!(bb.min.x, -30.0, epsilon = 1e-6);
        assert_relative_eq!(bb.max.x, 0.0, epsilon = 1e-6);
        let top = kernel
            .faces(&mirrored)
            .unwrap()
            .into_iter()
            .find(|f| f.frame().is_some_and(|p| p.normal.z > 0.5))
            .unwrap();
        assert!(top.frame().unwrap().is_right_handed());
        assert_relative_eq!(top.normal(0.0, 0.0), Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_solid() {
        let kernel = PrismKernel::new();
        assert!(matches!(
            kernel.volume(&KernelSolidHandle(42)),
            Err(KernelError::SolidNotFound { .. })
        ));
    }

    #[test]
    fn test_tessellate_plate() {
        let mut kernel = PrismKernel::new();
        let h = plate(&mut kernel);
        let mesh = kernel.tessellate(&h, Deflection::new(0.5, 0.5)).unwrap();
        assert!(mesh.triangle_count() > 0);
        assert_eq!(mesh.face_ranges.len(), 6);
    }
}
