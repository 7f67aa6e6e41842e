use serde::{Deserialize, Serialize};

/// Opaque handle to a solid held by a backend.
/// Valid only for the kernel session that issued it; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernelSolidHandle(pub(crate) u64);

impl KernelSolidHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Transient face or edge identifier.
/// Stable for one boundary snapshot of one solid, meaningless after the
/// next operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KernelId(pub u64);

/// Face ids are `handle * ID_STRIDE + index`; edge ids add `EDGE_ID_OFFSET`.
pub const ID_STRIDE: u64 = 100_000;
pub const EDGE_ID_OFFSET: u64 = 50_000;

impl KernelId {
    pub fn face(solid: &KernelSolidHandle, index: usize) -> Self {
        KernelId(solid.0 * ID_STRIDE + index as u64)
    }

    pub fn edge(solid: &KernelSolidHandle, index: usize) -> Self {
        KernelId(solid.0 * ID_STRIDE + EDGE_ID_OFFSET + index as u64)
    }

    pub fn solid(&self) -> KernelSolidHandle {
        KernelSolidHandle(self.0 / ID_STRIDE)
    }

    pub fn is_edge(&self) -> bool {
        self.0 % ID_STRIDE >= EDGE_ID_OFFSET
    }

    /// Position within the face or edge list of its snapshot.
    pub fn index(&self) -> usize {
        let local = self.0 % ID_STRIDE;
        if local >= EDGE_ID_OFFSET {
            (local - EDGE_ID_OFFSET) as usize
        } else {
            local as usize
        }
    }
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("tool does not intersect the target solid")]
    DisjointTool,

    #[error("fillet failed: {reason}")]
    FilletFailed { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: KernelId },

    #[error("solid not found: {handle:?}")]
    SolidNotFound { handle: KernelSolidHandle },

    #[error("invalid operation: {reason}")]
    InvalidInput { reason: String },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("backend failure: {message}")]
    Backend {
        message: String,
        traceback: Option<String>,
    },
}

/// Tessellation tolerances handed to the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deflection {
    /// Maximum chordal deviation in mm.
    pub linear: f64,
    /// Maximum angle between adjacent facet normals, in radians.
    pub angular: f64,
}

impl Deflection {
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }
}

/// Triangle mesh of a solid's boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderMesh {
    /// Flat array of vertex positions [x0, y0, z0, x1, y1, z1, ...].
    pub vertices: Vec<f32>,
    /// Flat array of vertex normals, parallel to `vertices`.
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex array.
    pub indices: Vec<u32>,
    /// Mapping from triangle ranges to logical faces.
    pub face_ranges: Vec<FaceRange>,
}

impl RenderMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex(&self, index: u32) -> [f32; 3] {
        let i = index as usize * 3;
        [self.vertices[i], self.vertices[i + 1], self.vertices[i + 2]]
    }
}

/// Maps a contiguous range of triangle indices to a logical face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceRange {
    pub face_id: KernelId,
    /// Start index in the indices array (inclusive).
    pub start_index: u32,
    /// End index in the indices array (exclusive).
    pub end_index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_encoding_round_trip() {
        let h = KernelSolidHandle(7);
        let f = KernelId::face(&h, 12);
        let e = KernelId::edge(&h, 3);
        assert_eq!(f.solid(), h);
        assert_eq!(e.solid(), h);
        assert!(!f.is_edge());
        assert!(e.is_edge());
        assert_eq!(f.index(), 12);
        assert_eq!(e.index(), 3);
    }
}
