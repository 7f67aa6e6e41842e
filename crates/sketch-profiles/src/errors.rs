/// Errors from building or validating a 2D profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    /// The loop itself is degenerate: too few points, zero area, or
    /// self-intersecting.
    #[error("invalid profile: {reason}")]
    InvalidProfile { reason: String },

    /// A dimension handed to a builder is out of range.
    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },
}

impl ProfileError {
    pub(crate) fn profile(reason: impl Into<String>) -> Self {
        ProfileError::InvalidProfile {
            reason: reason.into(),
        }
    }

    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        ProfileError::InvalidGeometry {
            reason: reason.into(),
        }
    }
}
