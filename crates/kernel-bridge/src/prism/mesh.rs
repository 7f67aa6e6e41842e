//! Quad-grid tessellation of realized faces.
//!
//! Each face is covered by a regular grid over its surface group's
//! parameter domain; a cell is kept when its center lies on the face and,
//! among coplanar faces of the same orientation, in this face's footprint.
//! Vertices are shared within a face, not across faces.

use std::f64::consts::TAU;

use forge_types::{Point3, Vector3};

use super::boundary::{owner, side, siblings, Boundary, Surface};
use super::solid::PrismSolid;
use crate::types::{Deflection, FaceRange, KernelError, RenderMesh};

const MAX_CELLS: usize = 400;
const MIN_ARC_SEGMENTS: usize = 16;
const MAX_ARC_SEGMENTS: usize = 720;

fn cells(length: f64, pitch: f64) -> usize {
    ((length / pitch).ceil() as usize).clamp(1, MAX_CELLS)
}

fn arc_segments(radius: f64, deflection: &Deflection) -> usize {
    let chordal = if deflection.linear < radius {
        2.0 * (1.0 - deflection.linear / radius).acos()
    } else {
        deflection.angular
    };
    let step = chordal.min(deflection.angular).max(1e-3);
    ((TAU / step).ceil() as usize).clamp(MIN_ARC_SEGMENTS, MAX_ARC_SEGMENTS)
}

fn grid_vertex(
    mesh: &mut RenderMesh,
    grid: &mut [Option<u32>],
    key: usize,
    p: Point3,
    n: Vector3,
) -> u32 {
    if let Some(index) = grid[key] {
        return index;
    }
    let index = (mesh.vertices.len() / 3) as u32;
    mesh.vertices.extend([p.x as f32, p.y as f32, p.z as f32]);
    mesh.normals.extend([n.x as f32, n.y as f32, n.z as f32]);
    grid[key] = Some(index);
    index
}

pub(crate) fn tessellate(
    solid: &PrismSolid,
    boundary: &Boundary,
    deflection: Deflection,
) -> Result<RenderMesh, KernelError> {
    let valid = |x: f64| x.is_finite() && x > 0.0;
    if !valid(deflection.linear) || !valid(deflection.angular) {
        return Err(KernelError::TessellationFailed {
            reason: format!(
                "deflection ({}, {}) must be positive",
                deflection.linear, deflection.angular
            ),
        });
    }
    let pitch = (deflection.linear * 5.0).clamp(0.05, 5.0);
    let mut mesh = RenderMesh::default();

    for (index, face) in boundary.faces.iter().enumerate() {
        let group = &boundary.groups[face.group];
        let family = siblings(&boundary.faces, index);
        let Some(domain) = group.full_domain() else {
            continue;
        };
        let surface = &group.surface;
        let nu = match surface {
            Surface::Plane(_) => cells(domain.u.1 - domain.u.0, pitch),
            Surface::Cylinder { radius, .. } => arc_segments(*radius, &deflection),
        };
        let nv = cells(domain.v.1 - domain.v.0, pitch);
        let u_at = |i: f64| domain.u.0 + (domain.u.1 - domain.u.0) * i / nu as f64;
        let v_at = |j: f64| domain.v.0 + (domain.v.1 - domain.v.0) * j / nv as f64;
        let sign = f64::from(face.orientation);

        let start_index = mesh.indices.len() as u32;
        let mut grid = vec![None; (nu + 1) * (nv + 1)];
        for j in 0..nv {
            for i in 0..nu {
                let (uc, vc) = (u_at(i as f64 + 0.5), v_at(j as f64 + 0.5));
                let center = surface.point(uc, vc);
                if side(solid, &center, &surface.normal(uc, vc)) != face.orientation {
                    continue;
                }
                if family.len() > 1
                    && owner(&boundary.faces, &family, (uc, vc), surface.u_scale()) != Some(index)
                {
                    continue;
                }
                let mut quad = [0u32; 4];
                for (slot, (a, b)) in [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)]
                    .into_iter()
                    .enumerate()
                {
                    let (u, v) = (u_at(a as f64), v_at(b as f64));
                    quad[slot] = grid_vertex(
                        &mut mesh,
                        &mut grid,
                        b * (nu + 1) + a,
                        surface.point(u, v),
                        surface.normal(u, v) * sign,
                    );
                }
                let [q0, q1, q2, q3] = quad;
                if face.orientation > 0 {
                    mesh.indices.extend([q0, q1, q2, q0, q2, q3]);
                } else {
                    mesh.indices.extend([q0, q2, q1, q0, q3, q2]);
                }
            }
        }
        let end_index = mesh.indices.len() as u32;
        if end_index > start_index {
            mesh.face_ranges.push(FaceRange {
                face_id: face.face.id,
                start_index,
                end_index,
            });
        }
    }

    if mesh.indices.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "solid has no boundary cells".to_string(),
        });
    }
    Ok(mesh)
}
