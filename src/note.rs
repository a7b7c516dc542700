//! Note loading and front matter stripping.

use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::error::{Error, Result};

/// Front matter delimiter used by Obsidian and most markdown tooling.
const FRONT_MATTER_DELIMITER: &str = "---";

/// Read a markdown note, dropping a leading `---`-delimited metadata block
/// when one is present.
pub(crate) fn read_note(path: &Path) -> Result<String> {
    info!("Reading note: {}", path.display());

    if !path.exists() {
        error!("Input file not found at {}", path.display());
        return Err(Error::NoteNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| {
        error!("Error reading file {}: {}", path.display(), source);
        Error::NoteRead {
            path: path.to_path_buf(),
            source,
        }
    })?;

    if content.starts_with(FRONT_MATTER_DELIMITER) {
        let parts: Vec<&str> = content.splitn(3, FRONT_MATTER_DELIMITER).collect();
        if parts.len() >= 3 {
            return Ok(parts[2].trim().to_string());
        }
    }

    Ok(content.trim().to_string())
}
