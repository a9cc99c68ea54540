use crate::error::{IndexError, Result};
use crate::readers::{CorpusFile, CorpusSource, FileContents};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Corpus packed into a zip archive with the same `<PROVINCE>/<file>.csv` layout.
///
/// Archives that wrap everything in a single top-level folder (as produced by
/// zipping the `climate_data` directory itself) are unwrapped transparently.
pub struct ZipCorpus {
    zip_path: PathBuf,
    prefix: String,
    layout: BTreeMap<String, Vec<String>>,
}

impl ZipCorpus {
    pub fn open(zip_path: impl Into<PathBuf>) -> Result<Self> {
        let zip_path = zip_path.into();
        let file = File::open(&zip_path).map_err(|e| IndexError::CorpusRoot {
            path: zip_path.clone(),
            reason: e.to_string(),
        })?;
        let archive = ZipArchive::new(file).map_err(|e| IndexError::CorpusRoot {
            path: zip_path.clone(),
            reason: e.to_string(),
        })?;

        let entries: Vec<String> = archive.file_names().map(str::to_string).collect();
        let prefix = Self::common_prefix(&entries);
        let layout = Self::build_layout(&entries, &prefix);

        Ok(Self {
            zip_path,
            prefix,
            layout,
        })
    }

    pub fn is_zip_path(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    }

    /// Single wrapping folder shared by every file entry, if any
    fn common_prefix(entries: &[String]) -> String {
        let mut files = entries.iter().filter(|name| !name.ends_with('/'));
        let first = match files.next() {
            Some(name) => name,
            None => return String::new(),
        };

        let candidate = match first.split_once('/') {
            Some((top, rest)) if rest.contains('/') => format!("{}/", top),
            _ => return String::new(),
        };

        let all_wrapped = entries
            .iter()
            .filter(|name| !name.ends_with('/'))
            .all(|name| {
                name.strip_prefix(&candidate)
                    .is_some_and(|rest| rest.contains('/'))
            });

        if all_wrapped {
            candidate
        } else {
            String::new()
        }
    }

    fn build_layout(entries: &[String], prefix: &str) -> BTreeMap<String, Vec<String>> {
        let mut layout: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for entry in entries {
            let relative = match entry.strip_prefix(prefix) {
                Some(relative) if !relative.is_empty() => relative,
                _ => continue,
            };

            let (directory, rest) = match relative.split_once('/') {
                Some(parts) => parts,
                // Files at the root level are not locations
                None => continue,
            };

            let files = layout.entry(directory.to_string()).or_default();
            if !rest.is_empty() && !rest.contains('/') {
                files.push(rest.to_string());
            }
        }

        layout
    }
}

impl CorpusSource for ZipCorpus {
    fn describe(&self) -> String {
        format!("{} (zip)", self.zip_path.display())
    }

    fn list_provinces(&self) -> Result<Vec<String>> {
        Ok(self.layout.keys().cloned().collect())
    }

    fn list_files(&self, directory: &str) -> Result<Vec<CorpusFile>> {
        let names = self.layout.get(directory).ok_or_else(|| {
            IndexError::InvalidFormat(format!(
                "Directory '{}' not found in archive '{}'",
                directory,
                self.zip_path.display()
            ))
        })?;

        Ok(names
            .iter()
            .map(|name| CorpusFile::new(directory, name.as_str()))
            .collect())
    }

    fn read(&self, file: &CorpusFile) -> Result<FileContents> {
        let archive_file = File::open(&self.zip_path)?;
        let mut archive = ZipArchive::new(archive_file)?;

        let entry_name = format!("{}{}", self.prefix, file.relative_path());
        let mut zip_file = archive.by_name(&entry_name).map_err(|_| {
            IndexError::InvalidFormat(format!(
                "File '{}' not found in archive '{}'",
                entry_name,
                self.zip_path.display()
            ))
        })?;

        // The declared size comes from the archive header and is not trusted
        let capacity = zip_file.size().min(DEFAULT_BUFFER_SIZE as u64) as usize;
        let mut bytes = Vec::with_capacity(capacity);
        zip_file.read_to_end(&mut bytes)?;
        Ok(bytes.into())
    }
}
