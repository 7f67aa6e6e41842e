use kernel_bridge::{KernelError, KernelSolidHandle};
use serde::{Deserialize, Serialize};

/// Result of one modeling operation: the new solid plus diagnostics.
#[derive(Debug, Clone)]
pub struct OpResult {
    /// Handle to the solid in the kernel. Runtime-only, not persisted.
    pub handle: KernelSolidHandle,
    pub diagnostics: Diagnostics,
}

/// Non-fatal diagnostics from an operation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Number of backend calls issued.
    pub kernel_calls: usize,
    /// Time spent inside the backend, in milliseconds.
    pub kernel_time_ms: f64,
}

/// How far a pocket cuts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PocketExtent {
    /// Fixed depth in mm along the sweep direction.
    Depth { depth: f64 },
    /// Through the whole tip along the sweep axis, both sides of the sketch
    /// plane.
    ThroughAll,
}

/// Errors from modeling operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("no profiles available for operation")]
    NoProfiles,

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("pocket does not intersect the target solid")]
    DisjointCut,

    #[error("fillet radius {radius} must be below {limit} at edge {edge}")]
    RadiusTooLarge { radius: f64, limit: f64, edge: u64 },
}

impl OpError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        OpError::InvalidParameter {
            reason: reason.into(),
        }
    }
}
