use crate::error::{IndexError, Result};
use crate::readers::{CorpusFile, CorpusSource, FileContents};

/// In-memory corpus used by tests and benchmarks.
///
/// Directories and files are listed in insertion order, which lets callers
/// simulate arbitrary directory-listing orders.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    directories: Vec<(String, Vec<(String, Vec<u8>)>)>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty directory
    pub fn with_directory(mut self, directory: &str) -> Self {
        self.directory_mut(directory);
        self
    }

    pub fn with_file(mut self, directory: &str, name: &str, contents: impl AsRef<[u8]>) -> Self {
        self.add_file(directory, name, contents);
        self
    }

    pub fn add_file(&mut self, directory: &str, name: &str, contents: impl AsRef<[u8]>) {
        let files = self.directory_mut(directory);
        let contents = contents.as_ref().to_vec();
        match files.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, data)) => *data = contents,
            None => files.push((name.to_string(), contents)),
        }
    }

    fn directory_mut(&mut self, directory: &str) -> &mut Vec<(String, Vec<u8>)> {
        let position = match self.directories.iter().position(|(d, _)| d == directory) {
            Some(position) => position,
            None => {
                self.directories.push((directory.to_string(), Vec::new()));
                self.directories.len() - 1
            }
        };
        &mut self.directories[position].1
    }

    fn files_in(&self, directory: &str) -> Option<&Vec<(String, Vec<u8>)>> {
        self.directories
            .iter()
            .find(|(d, _)| d == directory)
            .map(|(_, files)| files)
    }
}

impl CorpusSource for MemoryCorpus {
    fn describe(&self) -> String {
        "in-memory corpus".to_string()
    }

    fn list_provinces(&self) -> Result<Vec<String>> {
        Ok(self.directories.iter().map(|(d, _)| d.clone()).collect())
    }

    fn list_files(&self, directory: &str) -> Result<Vec<CorpusFile>> {
        let files = self.files_in(directory).ok_or_else(|| {
            IndexError::InvalidFormat(format!("Directory '{}' not found", directory))
        })?;
        Ok(files
            .iter()
            .map(|(name, _)| CorpusFile::new(directory, name.as_str()))
            .collect())
    }

    fn read(&self, file: &CorpusFile) -> Result<FileContents> {
        self.files_in(&file.directory)
            .and_then(|files| files.iter().find(|(name, _)| *name == file.name))
            .map(|(_, data)| FileContents::Owned(data.clone()))
            .ok_or_else(|| IndexError::InvalidFormat(format!("File '{}' not found", file)))
    }
}
