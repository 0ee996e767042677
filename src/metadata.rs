//! Correlation metadata files: path mirroring and JSON encoding.
//!
//! Correlation entries live under a project-relative hidden folder, one
//! JSON array per originating XML file, at a path mirroring that file's
//! relative path. Reading and writing the actual files is the caller's
//! job; this module only maps paths and encodes/decodes byte buffers.
//!
//! ```text
//! systems/main.arxml  ->  .arxsync/systems/main.arxml.json
//! ```

use crate::correlation::CorrelationEntry;
use crate::error::SyncError;

/// Hidden folder holding all correlation entry files.
pub const METADATA_DIR: &str = ".arxsync";

/// Extension appended to the mirrored XML path.
pub const METADATA_EXT: &str = "json";

/// Metadata path for an XML file's relative path.
pub fn metadata_path_for(relative_path: &str) -> String {
    let normalized = relative_path.replace('\\', "/");
    let normalized = normalized.trim_start_matches("./").trim_start_matches('/');
    format!("{METADATA_DIR}/{normalized}.{METADATA_EXT}")
}

/// Serialize one file's entry array (pretty-printed, stable field order).
pub fn entries_to_json(entries: &[CorrelationEntry]) -> Result<Vec<u8>, SyncError> {
    serde_json::to_vec_pretty(entries).map_err(|e| SyncError::metadata(e.to_string()))
}

/// Parse one file's entry array.
pub fn entries_from_json(bytes: &[u8]) -> Result<Vec<CorrelationEntry>, SyncError> {
    serde_json::from_slice(bytes).map_err(|e| SyncError::metadata(e.to_string()))
}
