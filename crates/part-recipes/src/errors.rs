use feature_engine::{EngineError, FeatureError};
use file_format::ExportError;
use forge_types::ParamError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RecipeError {
    #[error(transparent)]
    Parameter(#[from] ParamError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("mirror source '{body}' was not built")]
    MissingSource { body: String },

    #[error("{failures} bodies failed to build; nothing exported")]
    BuildFailed { failures: usize },

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("cannot create {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Attach a feature name to profile-building and engine errors.
pub(crate) trait InFeature<T> {
    fn in_feature(self, feature: &str) -> Result<T, FeatureError>;
}

impl<T, E: Into<EngineError>> InFeature<T> for Result<T, E> {
    fn in_feature(self, feature: &str) -> Result<T, FeatureError> {
        self.map_err(|e| FeatureError::new(feature, e))
    }
}
