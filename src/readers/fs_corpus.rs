use crate::error::{IndexError, Result};
use crate::readers::{CorpusFile, CorpusSource, FileContents};
use memmap2::Mmap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Corpus stored as a directory tree on disk
pub struct FsCorpus {
    root: PathBuf,
    use_mmap: bool,
}

impl FsCorpus {
    /// Open a corpus root, failing if it is missing or not a readable directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let metadata = fs::metadata(&root).map_err(|e| IndexError::CorpusRoot {
            path: root.clone(),
            reason: e.to_string(),
        })?;

        if !metadata.is_dir() {
            return Err(IndexError::CorpusRoot {
                path: root,
                reason: "not a directory".to_string(),
            });
        }

        Ok(Self {
            root,
            use_mmap: false,
        })
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn path_of(&self, file: &CorpusFile) -> PathBuf {
        self.root.join(&file.directory).join(&file.name)
    }

    fn entry_names(&self, dir: &Path, want_dirs: bool) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // Follows symlinks, so linked province folders are still scanned
            let metadata = match fs::metadata(entry.path()) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Skipping unreadable entry {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            let keep = if want_dirs {
                metadata.is_dir()
            } else {
                metadata.is_file()
            };
            if !keep {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => warn!("Skipping non UTF-8 entry name {:?}", name),
            }
        }

        Ok(names)
    }

    fn read_mmap(path: &Path) -> Result<FileContents> {
        let file = File::open(path)?;
        // Mapping a zero-length file is an error on some platforms
        if file.metadata()?.len() == 0 {
            return Ok(FileContents::Owned(Vec::new()));
        }
        // The corpus is not modified while an index build is running
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(FileContents::Mapped(mmap))
    }
}

impl CorpusSource for FsCorpus {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn list_provinces(&self) -> Result<Vec<String>> {
        self.entry_names(&self.root, true)
            .map_err(|e| IndexError::CorpusRoot {
                path: self.root.clone(),
                reason: e.to_string(),
            })
    }

    fn list_files(&self, directory: &str) -> Result<Vec<CorpusFile>> {
        let names = self.entry_names(&self.root.join(directory), false)?;
        Ok(names
            .into_iter()
            .map(|name| CorpusFile::new(directory, name))
            .collect())
    }

    fn read(&self, file: &CorpusFile) -> Result<FileContents> {
        let path = self.path_of(file);
        if self.use_mmap {
            Self::read_mmap(&path)
        } else {
            Ok(fs::read(path)?.into())
        }
    }
}
