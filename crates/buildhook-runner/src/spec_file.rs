//! Scoped temporary file holding an infrastructure spec.
//!
//! The external build process reads the spec from disk, so each build
//! writes its spec to a named temp file first. The file must exist before
//! the process is launched and must be gone afterwards no matter how the
//! build ends, so it lives in a guard whose drop removes it.

use std::{io::Write, path::Path};

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::{BuildError, Result};

/// A pretty-printed infrastructure spec on disk, removed on drop.
///
/// Dropping the guard deletes the file on every exit path, including
/// launch failures and timeouts.
#[derive(Debug)]
pub struct SpecFile {
    file: NamedTempFile,
}

impl SpecFile {
    /// Writes the spec to a fresh temp file.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::SpecFile`] if the file cannot be created or
    /// written.
    pub fn write(spec: &Value) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("infrastructure-spec-")
            .suffix(".json")
            .tempfile()
            .map_err(BuildError::spec_file)?;

        let pretty =
            serde_json::to_vec_pretty(spec).map_err(|e| BuildError::spec_file(e.into()))?;
        file.write_all(&pretty).map_err(BuildError::spec_file)?;
        file.flush().map_err(BuildError::spec_file)?;

        Ok(Self { file })
    }

    /// Path of the spec file, valid for the lifetime of the guard.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
