use std::time::Instant;

use kernel_bridge::{Kernel, KernelError, KernelIntrospect, KernelSolidHandle, OpDescriptor};
use tracing::debug;

use crate::types::Diagnostics;

/// Combined trait for operations that need both mutable Kernel access
/// and read-only KernelIntrospect access on the same object.
pub trait KernelBundle: Kernel + KernelIntrospect {
    fn as_introspect(&self) -> &dyn KernelIntrospect;
}

// Blanket implementation for any type that implements both traits
impl<T: Kernel + KernelIntrospect> KernelBundle for T {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}

/// Issue one descriptor, time it, and unwrap the reply.
pub(crate) fn submit(
    kb: &mut dyn KernelBundle,
    op: &OpDescriptor,
    diagnostics: &mut Diagnostics,
) -> Result<KernelSolidHandle, KernelError> {
    let started = Instant::now();
    let reply = kb.execute(op);
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;
    diagnostics.kernel_calls += 1;
    diagnostics.kernel_time_ms += elapsed;
    debug!(op = op.name(), success = reply.success, elapsed_ms = elapsed, "backend call");
    reply.into_result()
}
