use std::collections::HashMap;

use forge_types::Point3;
use kernel_bridge::{
    BrepFace, FaceGeometry, KernelId, KernelIntrospect, KernelSolidHandle, OpDescriptor,
};
use tracing::{debug, warn};

use crate::kernel_ext::{submit, KernelBundle};
use crate::types::{Diagnostics, OpError, OpResult};

/// Shortest extent of a face measured in its own plane.
///
/// Planar faces are measured along their frame axes over the boundary
/// vertices; curved faces fall back to the smallest bounding-box extent.
pub fn in_plane_extent(face: &BrepFace) -> f64 {
    let Some(frame) = face.frame() else {
        return face.bounding_box().sorted_extents()[0];
    };
    let corners = face.bounding_box().corners();
    let points: &[Point3] = if face.vertices().len() >= 2 {
        face.vertices()
    } else {
        &corners
    };
    let (mut u_min, mut u_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut v_min, mut v_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        let uv = frame.to_local(p);
        u_min = u_min.min(uv.x);
        u_max = u_max.max(uv.x);
        v_min = v_min.min(uv.y);
        v_max = v_max.max(uv.y);
    }
    (u_max - u_min).min(v_max - v_min)
}

/// Execute a constant-radius fillet on `edges` of `solid`.
///
/// The radius must stay below half the shortest in-plane extent of every
/// face adjacent to a selected edge. An empty edge set is not an error: the
/// solid is returned unchanged with a warning.
pub fn execute_fillet(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    edges: &[KernelId],
    radius: f64,
) -> Result<OpResult, OpError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(OpError::invalid(format!(
            "fillet radius must be positive, got {radius}"
        )));
    }
    let mut diagnostics = Diagnostics::default();
    if edges.is_empty() {
        warn!(radius, "fillet selected no edges; solid unchanged");
        diagnostics
            .warnings
            .push("fillet selected no edges; solid unchanged".to_string());
        return Ok(OpResult {
            handle: *solid,
            diagnostics,
        });
    }

    let faces: HashMap<KernelId, BrepFace> = kb
        .faces(solid)?
        .into_iter()
        .map(|f| (f.id, f))
        .collect();
    for &edge in edges {
        for face_id in kb.edge_faces(edge)? {
            let Some(face) = faces.get(&face_id) else {
                continue;
            };
            let limit = in_plane_extent(face) / 2.0;
            if radius >= limit {
                return Err(OpError::RadiusTooLarge {
                    radius,
                    limit,
                    edge: edge.0,
                });
            }
        }
    }

    let op = OpDescriptor::Fillet {
        target: *solid,
        edges: edges.to_vec(),
        radius,
    };
    let handle = submit(kb, &op, &mut diagnostics)?;
    debug!(handle = handle.id(), edges = edges.len(), radius, "fillet applied");
    Ok(OpResult {
        handle,
        diagnostics,
    })
}
