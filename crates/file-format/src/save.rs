use std::collections::BTreeMap;
use std::path::Path;

use feature_engine::{Body, Feature};
use forge_types::ParameterSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::SaveError;
use crate::metadata::ProjectMetadata;

/// Format identifier written into every document.
pub const FORMAT_NAME: &str = "rack-forge";

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// One body's history. Kernel handles are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub name: String,
    pub features: Vec<Feature>,
}

impl From<&Body> for BodyRecord {
    fn from(body: &Body) -> Self {
        Self {
            name: body.name().to_string(),
            features: body.features().to_vec(),
        }
    }
}

/// The top-level file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    /// Format identifier.
    pub format: String,
    /// Format version number.
    pub version: u32,
    /// Project metadata.
    pub project: ProjectMetadata,
    /// Every parameter value, derived ones included, at save time.
    pub parameters: BTreeMap<String, f64>,
    /// The bodies (the parametric recipe).
    pub bodies: Vec<BodyRecord>,
}

/// Serialize a design to a pretty-printed JSON string.
pub fn save_document<'a>(
    bodies: impl IntoIterator<Item = &'a Body>,
    params: &ParameterSet,
    metadata: &ProjectMetadata,
) -> Result<String, SaveError> {
    let file = DocumentFile {
        format: FORMAT_NAME.to_string(),
        version: FORMAT_VERSION,
        project: metadata.clone(),
        parameters: params.snapshot()?,
        bodies: bodies.into_iter().map(BodyRecord::from).collect(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| SaveError::Serialize(e.to_string()))
}

/// Save a design to `path`.
pub fn write_document<'a>(
    path: &Path,
    bodies: impl IntoIterator<Item = &'a Body>,
    params: &ParameterSet,
    metadata: &ProjectMetadata,
) -> Result<(), SaveError> {
    let text = save_document(bodies, params, metadata)?;
    std::fs::write(path, text).map_err(|e| SaveError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    info!(path = %path.display(), "document saved");
    Ok(())
}
