use forge_types::{DatumPlane, EdgeQuery, FaceQuery, Point3, Profile, TopoKind, Vector3};
use kernel_bridge::KernelError;
use modeling_ops::{OpError, PocketExtent};
use serde::{Deserialize, Serialize};
use sketch_profiles::ProfileError;
use uuid::Uuid;

/// Where a sketch plane sits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SketchPlacement {
    /// A fixed reference plane moved `offset` along its normal.
    Datum { plane: DatumPlane, offset: f64 },
    /// The face of the current tip matched by `query`, moved `offset` along
    /// its outward normal. Resolved against the tip at execution time.
    Face { query: FaceQuery, offset: f64 },
}

/// Frame the profile coordinates are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProfileFrame {
    /// The placement's own local frame.
    Local,
    /// A datum frame parallel to the placement plane. Coordinates are
    /// re-expressed in the realized placement frame when the sketch resolves.
    Datum { plane: DatumPlane },
}

/// One or more closed profiles bound to a placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    pub placement: SketchPlacement,
    pub frame: ProfileFrame,
    pub profiles: Vec<Profile>,
}

impl Sketch {
    /// Sketch on a datum plane, authored in that plane's frame.
    pub fn on_datum(plane: DatumPlane, offset: f64, profiles: Vec<Profile>) -> Self {
        Self {
            placement: SketchPlacement::Datum { plane, offset },
            frame: ProfileFrame::Local,
            profiles,
        }
    }

    /// Sketch on a selected face, authored in the face's realized frame.
    pub fn on_face(query: FaceQuery, profiles: Vec<Profile>) -> Self {
        Self {
            placement: SketchPlacement::Face { query, offset: 0.0 },
            frame: ProfileFrame::Local,
            profiles,
        }
    }

    /// Author the profiles in a datum frame instead of the placement frame.
    pub fn authored_in(mut self, plane: DatumPlane) -> Self {
        self.frame = ProfileFrame::Datum { plane };
        self
    }

    /// Move the sketch plane along its normal.
    pub fn offset(mut self, distance: f64) -> Self {
        match &mut self.placement {
            SketchPlacement::Datum { offset, .. } | SketchPlacement::Face { offset, .. } => {
                *offset = distance
            }
        }
        self
    }
}

/// A parametric modeling operation with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    Pad {
        sketch: Sketch,
        distance: f64,
        reversed: bool,
    },
    Pocket {
        sketch: Sketch,
        extent: PocketExtent,
        reversed: bool,
    },
    Fillet {
        edges: EdgeQuery,
        radius: f64,
    },
    /// Reflected copy of another body's finished tip. The source history is
    /// carried along so the copy can be recomputed on its own.
    Mirror {
        source: String,
        source_features: Vec<Feature>,
        point: Point3,
        normal: Vector3,
    },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Pad { .. } => "pad",
            Operation::Pocket { .. } => "pocket",
            Operation::Fillet { .. } => "fillet",
            Operation::Mirror { .. } => "mirror",
        }
    }
}

/// A single entry of a body's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Unique identifier.
    pub id: Uuid,
    /// User-visible name.
    pub name: String,
    /// The modeling operation this feature performs.
    pub operation: Operation,
}

/// Errors from the feature engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("invalid profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("no {kind:?} matches {query}")]
    NoMatch { kind: TopoKind, query: String },

    #[error("{count} faces match {query}; expected exactly one")]
    AmbiguousSelection { count: usize, query: String },

    #[error("pocket does not intersect the solid")]
    DisjointCut,

    #[error("geometry error: {reason}")]
    GeometryError { reason: String },

    #[error("backend failure: {message}")]
    BackendFailure {
        message: String,
        traceback: Option<String>,
    },

    #[error("body '{body}' is sealed")]
    SealedBody { body: String },
}

impl From<ProfileError> for EngineError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::InvalidProfile { reason } => EngineError::InvalidProfile { reason },
            ProfileError::InvalidGeometry { reason } => EngineError::InvalidGeometry { reason },
        }
    }
}

impl From<KernelError> for EngineError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::DisjointTool => EngineError::DisjointCut,
            KernelError::BooleanFailed { .. }
            | KernelError::FilletFailed { .. }
            | KernelError::TessellationFailed { .. }
            | KernelError::NotSupported { .. } => EngineError::GeometryError {
                reason: err.to_string(),
            },
            KernelError::InvalidInput { reason } => EngineError::InvalidGeometry { reason },
            KernelError::Backend { message, traceback } => {
                EngineError::BackendFailure { message, traceback }
            }
            KernelError::EntityNotFound { .. } | KernelError::SolidNotFound { .. } => {
                EngineError::BackendFailure {
                    message: err.to_string(),
                    traceback: None,
                }
            }
        }
    }
}

impl From<OpError> for EngineError {
    fn from(err: OpError) -> Self {
        match err {
            OpError::Kernel(k) => k.into(),
            OpError::NoProfiles => EngineError::InvalidProfile {
                reason: "sketch has no profiles".to_string(),
            },
            OpError::InvalidParameter { reason } => EngineError::InvalidParameter { reason },
            OpError::DisjointCut => EngineError::DisjointCut,
            OpError::RadiusTooLarge { .. } => EngineError::GeometryError {
                reason: err.to_string(),
            },
        }
    }
}

/// An [`EngineError`] tagged with the feature that raised it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("feature '{feature}' failed: {error}")]
pub struct FeatureError {
    pub feature: String,
    #[source]
    pub error: EngineError,
}

impl FeatureError {
    pub fn new(feature: impl Into<String>, error: impl Into<EngineError>) -> Self {
        Self {
            feature: feature.into(),
            error: error.into(),
        }
    }
}
