use crate::errors::LoadError;
use crate::save::{DocumentFile, FORMAT_NAME, FORMAT_VERSION};

/// Deserialize a saved document from a JSON string.
///
/// Validates the format identifier and version.
pub fn load_document(json: &str) -> Result<DocumentFile, LoadError> {
    let doc: DocumentFile =
        serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))?;

    if doc.format != FORMAT_NAME {
        return Err(LoadError::UnknownFormat(doc.format));
    }
    if doc.version > FORMAT_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: doc.version,
            supported_version: FORMAT_VERSION,
        });
    }
    Ok(doc)
}
