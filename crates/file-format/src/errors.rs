use forge_types::ParamError;
use kernel_bridge::KernelError;

/// Errors while reading a parameter file or a saved document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse file: {0}")]
    ParseError(String),

    #[error("unknown file format: {0}")]
    UnknownFormat(String),

    #[error("file version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },

    #[error("unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error(transparent)]
    Parameter(#[from] ParamError),

    #[error("cannot read {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Errors while writing a document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SaveError {
    #[error("document serialization failed: {0}")]
    Serialize(String),

    #[error(transparent)]
    Parameter(#[from] ParamError),

    #[error("cannot write {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Errors during mesh export.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("tessellation failed: {0}")]
    Kernel(#[from] KernelError),

    #[error("STL export failed: {reason}")]
    StlError { reason: String },

    #[error("body '{body}' has no solid to export")]
    NoSolid { body: String },

    #[error("cannot write {path}: {reason}")]
    Io { path: String, reason: String },
}
