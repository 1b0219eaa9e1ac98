use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, trace};
use tempfile::NamedTempFile;

use crate::{PlanError, Result};

// Helper method for parsing comma-separated tags typed at the prompt
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| split_tags(&t, ',')).unwrap_or_default()
}

/// Splits `raw` on `separator`, trimming each piece and dropping empty ones
pub fn split_tags(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// First non-empty line of `content`, cut to `max_chars` characters
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

/// Writes `bytes` to `path` through a temporary file in the same directory,
/// so the destination either holds the complete content or is left untouched.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !dir.exists() {
        debug!("Creating parent directory: {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| {
            error!("Failed to create directory {}: {}", dir.display(), e);
            PlanError::Io(e)
        })?;
    }

    debug!("Creating temporary file in directory: {}", dir.display());
    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temporary file: {}", e);
        PlanError::Io(e)
    })?;

    trace!("Writing {} bytes to temporary file", bytes.len());
    temp_file.write_all(bytes)?;
    temp_file.flush()?;

    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist file {}: {}", path.display(), e.error);
        PlanError::Io(e.error)
    })?;

    Ok(path.to_path_buf())
}
