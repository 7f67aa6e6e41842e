use forge_types::{try_normalize, Matrix4, Point3, Vector3};
use kernel_bridge::{KernelSolidHandle, OpDescriptor};
use tracing::debug;

use crate::kernel_ext::{submit, KernelBundle};
use crate::types::{Diagnostics, OpError, OpResult};

/// Affine reflection across the plane through `point` with `normal`:
/// `x' = x − 2((x − p)·n)n`.
pub fn reflection_matrix(point: &Point3, normal: &Vector3) -> Result<Matrix4, OpError> {
    let n = try_normalize(normal)
        .ok_or_else(|| OpError::invalid("mirror plane normal has zero length"))?;
    if !point.coords.iter().all(|c| c.is_finite()) {
        return Err(OpError::invalid("mirror plane point must be finite"));
    }
    let linear = nalgebra::Matrix3::identity() - n * n.transpose() * 2.0;
    let translation = n * (2.0 * point.coords.dot(&n));
    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&linear);
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
    Ok(m)
}

/// Reflect a copy of `solid` across the given plane. The source is left
/// untouched and the copy shares nothing with it.
pub fn execute_mirror(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    point: &Point3,
    normal: &Vector3,
) -> Result<OpResult, OpError> {
    let matrix = reflection_matrix(point, normal)?;
    let mut diagnostics = Diagnostics::default();
    let handle = submit(
        kb,
        &OpDescriptor::Transform {
            target: *solid,
            matrix,
        },
        &mut diagnostics,
    )?;
    debug!(source = solid.id(), handle = handle.id(), "mirror applied");
    Ok(OpResult {
        handle,
        diagnostics,
    })
}
