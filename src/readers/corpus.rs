use crate::error::Result;
use memmap2::Mmap;
use std::fmt;
use std::ops::Deref;

/// A CSV file inside a province directory of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorpusFile {
    pub directory: String,
    pub name: String,
}

impl CorpusFile {
    pub fn new(directory: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            name: name.into(),
        }
    }

    /// Path relative to the corpus root, always with forward slashes
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.directory, self.name)
    }
}

impl fmt::Display for CorpusFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.directory, self.name)
    }
}

/// Contents of a corpus file, either owned or mapped straight from disk
pub enum FileContents {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for FileContents {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileContents::Owned(bytes) => bytes,
            FileContents::Mapped(mmap) => mmap,
        }
    }
}

impl From<Vec<u8>> for FileContents {
    fn from(bytes: Vec<u8>) -> Self {
        FileContents::Owned(bytes)
    }
}

impl fmt::Debug for FileContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContents::Owned(bytes) => write!(f, "Owned({} bytes)", bytes.len()),
            FileContents::Mapped(mmap) => write!(f, "Mapped({} bytes)", mmap.len()),
        }
    }
}

/// Read access to a corpus laid out as `<root>/<PROVINCE>/<locationId>.csv`.
///
/// The builder only talks to the corpus through this trait, so tests can swap
/// the filesystem for [`crate::readers::MemoryCorpus`]. Implementations must be
/// shareable across extraction threads.
pub trait CorpusSource: Sync {
    /// Short human-readable description used in logs and reports
    fn describe(&self) -> String;

    /// Names of all sub-directories directly under the root, recognised or not
    fn list_provinces(&self) -> Result<Vec<String>>;

    /// Regular files directly inside `directory`, in no particular order
    fn list_files(&self, directory: &str) -> Result<Vec<CorpusFile>>;

    /// Raw bytes of a file
    fn read(&self, file: &CorpusFile) -> Result<FileContents>;
}
