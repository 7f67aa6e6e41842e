//! Operation descriptors and the backend reply envelope.
//!
//! A backend receives exactly one [`OpDescriptor`] per call and answers
//! with a [`BackendReply`]. Both are plain serde data so the same contract
//! can be carried over an RPC transport.

use forge_types::{Matrix4, Placement, Profile};
use serde::{Deserialize, Serialize};

use crate::types::{KernelError, KernelId, KernelSolidHandle};

/// A set of closed loops swept along a placement normal.
///
/// The tool spans heights `[start, start + length]` measured along
/// `placement.normal` from the placement origin. `length` must be > 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    pub placement: Placement,
    pub profiles: Vec<Profile>,
    pub start: f64,
    pub length: f64,
}

impl SweepSpec {
    pub fn end(&self) -> f64 {
        self.start + self.length
    }
}

/// How a sweep combines with its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanMode {
    /// Start a new solid; no target.
    NewSolid,
    Union,
    Subtract,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum OpDescriptor {
    Sweep {
        target: Option<KernelSolidHandle>,
        sweep: SweepSpec,
        mode: BooleanMode,
    },
    Fillet {
        target: KernelSolidHandle,
        edges: Vec<KernelId>,
        radius: f64,
    },
    /// Apply a rigid motion or reflection (orthogonal linear part) to a copy
    /// of the target.
    Transform {
        target: KernelSolidHandle,
        matrix: Matrix4,
    },
}

impl OpDescriptor {
    pub fn name(&self) -> &'static str {
        match self {
            OpDescriptor::Sweep {
                mode: BooleanMode::Subtract,
                ..
            } => "sweep-subtract",
            OpDescriptor::Sweep {
                mode: BooleanMode::Union,
                ..
            } => "sweep-union",
            OpDescriptor::Sweep { .. } => "sweep-new",
            OpDescriptor::Fillet { .. } => "fillet",
            OpDescriptor::Transform { .. } => "transform",
        }
    }
}

/// Classification of a failed reply so callers can map it onto their own
/// error taxonomy without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The backend executed the operation but the geometry was rejected.
    Geometry,
    /// A subtractive tool missed the target entirely.
    DisjointTool,
    /// The request was malformed or referenced unknown entities.
    Input,
    /// Transport or execution failure inside the backend.
    Backend,
}

/// The reply envelope every backend call produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendReply {
    pub success: bool,
    pub result: Option<KernelSolidHandle>,
    pub error_message: Option<String>,
    pub error_traceback: Option<String>,
    #[serde(default)]
    pub failure_kind: Option<FailureKind>,
}

impl BackendReply {
    pub fn ok(result: KernelSolidHandle) -> Self {
        Self {
            success: true,
            result: Some(result),
            error_message: None,
            error_traceback: None,
            failure_kind: None,
        }
    }

    pub fn failure(err: &KernelError) -> Self {
        let (kind, traceback) = match err {
            KernelError::BooleanFailed { .. }
            | KernelError::FilletFailed { .. }
            | KernelError::TessellationFailed { .. } => (FailureKind::Geometry, None),
            KernelError::DisjointTool => (FailureKind::DisjointTool, None),
            KernelError::EntityNotFound { .. }
            | KernelError::SolidNotFound { .. }
            | KernelError::InvalidInput { .. }
            | KernelError::NotSupported { .. } => (FailureKind::Input, None),
            KernelError::Backend { traceback, .. } => (FailureKind::Backend, traceback.clone()),
        };
        Self {
            success: false,
            result: None,
            error_message: Some(err.to_string()),
            error_traceback: traceback,
            failure_kind: Some(kind),
        }
    }

    pub fn from_result(result: Result<KernelSolidHandle, KernelError>) -> Self {
        match result {
            Ok(handle) => Self::ok(handle),
            Err(err) => Self::failure(&err),
        }
    }

    /// Convert back into a `Result`, reconstructing the error class.
    pub fn into_result(self) -> Result<KernelSolidHandle, KernelError> {
        if self.success {
            return self.result.ok_or_else(|| KernelError::Backend {
                message: "backend reported success without a result".to_string(),
                traceback: None,
            });
        }
        let message = self
            .error_message
            .unwrap_or_else(|| "backend reported failure without a message".to_string());
        Err(match self.failure_kind {
            Some(FailureKind::Geometry) => KernelError::BooleanFailed { reason: message },
            Some(FailureKind::DisjointTool) => KernelError::DisjointTool,
            Some(FailureKind::Input) => KernelError::InvalidInput { reason: message },
            Some(FailureKind::Backend) | None => KernelError::Backend {
                message,
                traceback: self.error_traceback,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_round_trip_keeps_class() {
        let reply = BackendReply::failure(&KernelError::DisjointTool);
        assert!(!reply.success);
        assert_eq!(reply.failure_kind, Some(FailureKind::DisjointTool));
        assert!(matches!(reply.into_result(), Err(KernelError::DisjointTool)));
    }

    #[test]
    fn test_backend_failure_keeps_traceback() {
        let err = KernelError::Backend {
            message: "socket closed".to_string(),
            traceback: Some("line 1".to_string()),
        };
        let reply = BackendReply::failure(&err);
        assert_eq!(reply.error_traceback.as_deref(), Some("line 1"));
        match reply.into_result() {
            Err(KernelError::Backend { message, traceback }) => {
                assert!(message.contains("socket closed"));
                assert_eq!(traceback.as_deref(), Some("line 1"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_untyped_failure_is_backend() {
        let reply = BackendReply {
            success: false,
            result: None,
            error_message: Some("boom".to_string()),
            error_traceback: Some("tb".to_string()),
            failure_kind: None,
        };
        assert!(matches!(
            reply.into_result(),
            Err(KernelError::Backend { .. })
        ));
    }

    #[test]
    fn test_reply_json_shape() {
        let json = serde_json::to_value(BackendReply::ok(KernelSolidHandle(3))).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["result"], 3);
        assert!(json["error_message"].is_null());
        let back: BackendReply = serde_json::from_value(json).unwrap();
        assert_eq!(back.result, Some(KernelSolidHandle(3)));
    }
}
