use forge_types::{Placement, Profile};
use kernel_bridge::{BooleanMode, KernelSolidHandle, OpDescriptor, SweepSpec};
use tracing::debug;

use crate::kernel_ext::{submit, KernelBundle};
use crate::types::{Diagnostics, OpError, OpResult};

/// Sweep spec for `length` along the placement normal, or against it when
/// `reversed`. The sketch plane is always one end of the tool.
pub(crate) fn directed_sweep(
    placement: &Placement,
    profiles: &[Profile],
    length: f64,
    reversed: bool,
) -> SweepSpec {
    SweepSpec {
        placement: *placement,
        profiles: profiles.to_vec(),
        start: if reversed { -length } else { 0.0 },
        length,
    }
}

/// Execute a pad: extrude `profiles` by `distance` and union with `target`,
/// or start a new solid when there is no target yet.
pub fn execute_pad(
    kb: &mut dyn KernelBundle,
    target: Option<&KernelSolidHandle>,
    placement: &Placement,
    profiles: &[Profile],
    distance: f64,
    reversed: bool,
) -> Result<OpResult, OpError> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(OpError::invalid(format!(
            "pad distance must be positive, got {distance}"
        )));
    }
    if profiles.is_empty() {
        return Err(OpError::NoProfiles);
    }

    let op = OpDescriptor::Sweep {
        target: target.copied(),
        sweep: directed_sweep(placement, profiles, distance, reversed),
        mode: if target.is_some() {
            BooleanMode::Union
        } else {
            BooleanMode::NewSolid
        },
    };
    let mut diagnostics = Diagnostics::default();
    let handle = submit(kb, &op, &mut diagnostics)?;
    debug!(handle = handle.id(), distance, reversed, "pad applied");
    Ok(OpResult {
        handle,
        diagnostics,
    })
}
