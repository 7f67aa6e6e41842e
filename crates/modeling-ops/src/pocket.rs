use forge_types::{Placement, Profile};
use kernel_bridge::{
    BooleanMode, KernelError, KernelIntrospect, KernelSolidHandle, OpDescriptor, SweepSpec,
};
use tracing::debug;

use crate::kernel_ext::{submit, KernelBundle};
use crate::pad::directed_sweep;
use crate::types::{Diagnostics, OpError, OpResult, PocketExtent};

/// Extra length on each side of a through-all tool.
pub const THROUGH_ALL_MARGIN: f64 = 1.0;

/// Sweep spanning the whole of `target`'s extent along the placement
/// normal, plus a margin on both ends.
pub fn through_all_sweep(
    kb: &dyn KernelBundle,
    target: &KernelSolidHandle,
    placement: &Placement,
    profiles: &[Profile],
) -> Result<SweepSpec, OpError> {
    let bbox = kb.bounding_box(target)?;
    let heights = bbox.corners().map(|c| placement.height(&c));
    let low = heights.iter().copied().fold(f64::INFINITY, f64::min);
    let high = heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(SweepSpec {
        placement: *placement,
        profiles: profiles.to_vec(),
        start: low - THROUGH_ALL_MARGIN,
        length: (high - low) + 2.0 * THROUGH_ALL_MARGIN,
    })
}

/// Execute a pocket: subtract the swept profiles from `target`.
///
/// Profiles are cut one at a time so a profile that misses the solid can be
/// reported on its own. The pocket fails with [`OpError::DisjointCut`] only
/// when every profile misses; partial misses come back as warnings.
pub fn execute_pocket(
    kb: &mut dyn KernelBundle,
    target: &KernelSolidHandle,
    placement: &Placement,
    profiles: &[Profile],
    extent: PocketExtent,
    reversed: bool,
) -> Result<OpResult, OpError> {
    if profiles.is_empty() {
        return Err(OpError::NoProfiles);
    }
    let sweep = match extent {
        PocketExtent::Depth { depth } => {
            if !depth.is_finite() || depth <= 0.0 {
                return Err(OpError::invalid(format!(
                    "pocket depth must be positive, got {depth}"
                )));
            }
            directed_sweep(placement, profiles, depth, reversed)
        }
        PocketExtent::ThroughAll => through_all_sweep(&*kb, target, placement, profiles)?,
    };

    let mut diagnostics = Diagnostics::default();
    let mut handle = *target;
    let mut missed = Vec::new();
    for (index, profile) in profiles.iter().enumerate() {
        let op = OpDescriptor::Sweep {
            target: Some(handle),
            sweep: SweepSpec {
                profiles: vec![profile.clone()],
                ..sweep.clone()
            },
            mode: BooleanMode::Subtract,
        };
        match submit(kb, &op, &mut diagnostics) {
            Ok(next) => handle = next,
            Err(KernelError::DisjointTool) => missed.push(index),
            Err(err) => return Err(err.into()),
        }
    }

    if missed.len() == profiles.len() {
        return Err(OpError::DisjointCut);
    }
    if !missed.is_empty() {
        diagnostics
            .warnings
            .push(format!("pocket profiles {missed:?} do not intersect the solid"));
    }
    debug!(
        handle = handle.id(),
        start = sweep.start,
        length = sweep.length,
        missed = missed.len(),
        "pocket applied"
    );
    Ok(OpResult {
        handle,
        diagnostics,
    })
}
