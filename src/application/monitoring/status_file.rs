//! Status file for external monitoring.
//!
//! Writes the latest [`Snapshot`] as JSON so external tools can poll it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::snapshot::Snapshot;
use crate::error::Result;

/// Writes snapshots to a fixed path.
pub struct StatusFileWriter {
    path: PathBuf,
}

impl StatusFileWriter {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `snapshot` atomically, creating the parent directory if needed.
    #[allow(clippy::result_large_err)]
    pub fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to a sibling temp file, then rename over the target.
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;

        let cleanup_and_err = |e| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, &self.path).map_err(cleanup_and_err)?;

        Ok(())
    }
}
