use crate::config::IndexFormat;
use crate::error::{IndexError, Result};
use crate::models::LocationIndex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Serializes a [`LocationIndex`] and swaps it into place atomically.
///
/// The document is written to a temporary file in the destination directory,
/// synced, then renamed over the final path. Readers see either the previous
/// artifact or the complete new one, never a partial file; on any failure the
/// temporary file is removed and the previous artifact is left untouched.
pub struct IndexWriter {
    format: IndexFormat,
}

impl IndexWriter {
    pub fn new() -> Self {
        Self {
            format: IndexFormat::Index,
        }
    }

    pub fn with_format(format: IndexFormat) -> Self {
        Self { format }
    }

    /// Exact bytes that [`IndexWriter::write`] puts on disk
    pub fn to_bytes(&self, index: &LocationIndex) -> Result<Vec<u8>> {
        let mut bytes = match self.format {
            IndexFormat::Index => serde_json::to_vec_pretty(index)?,
            IndexFormat::Manifest => serde_json::to_vec_pretty(&index.to_manifest())?,
        };
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn write(&self, index: &LocationIndex, path: &Path) -> Result<()> {
        let bytes = self.to_bytes(index)?;

        let output_error = |source: std::io::Error| IndexError::OutputWrite {
            path: path.to_path_buf(),
            source,
        };

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&directory).map_err(output_error)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index".to_string());

        let mut temp_file = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".tmp")
            .tempfile_in(&directory)
            .map_err(output_error)?;
        debug!("Writing index to temporary file {}", temp_file.path().display());

        temp_file.write_all(&bytes).map_err(output_error)?;
        temp_file.flush().map_err(output_error)?;
        temp_file.as_file().sync_all().map_err(output_error)?;

        temp_file
            .persist(path)
            .map_err(|e| output_error(e.error))?;

        info!(
            "Wrote {} location(s) to {} ({} format, {} bytes)",
            index.len(),
            path.display(),
            self.format,
            bytes.len()
        );
        Ok(())
    }
}

impl Default for IndexWriter {
    fn default() -> Self {
        Self::new()
    }
}
