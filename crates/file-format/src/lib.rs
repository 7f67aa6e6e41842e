//! Collaborator surfaces around the engine: parameter files, persisted
//! documents and STL export.

pub mod errors;
pub mod load;
pub mod metadata;
pub mod params;
pub mod save;
pub mod stl;

pub use errors::{ExportError, LoadError, SaveError};
pub use load::load_document;
pub use metadata::ProjectMetadata;
pub use params::{apply_overrides, load_parameter_file, parse_overrides};
pub use save::{save_document, write_document, BodyRecord, DocumentFile, FORMAT_NAME, FORMAT_VERSION};
pub use stl::{ascii_stl, binary_stl, export_body};
