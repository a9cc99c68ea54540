pub mod corpus;
pub mod fs_corpus;
pub mod location_reader;
pub mod memory_corpus;
pub mod station_lookup;
pub mod zip_corpus;

pub use corpus::{CorpusFile, CorpusSource, FileContents};
pub use fs_corpus::FsCorpus;
pub use location_reader::{Extraction, LocationReader, SkippedRow};
pub use memory_corpus::MemoryCorpus;
pub use station_lookup::{StationEntry, StationLookup};
pub use zip_corpus::ZipCorpus;

use crate::error::Result;
use std::path::Path;

/// Open the corpus at `root`: a `.zip` archive or a directory tree
pub fn open_corpus(root: &Path, use_mmap: bool) -> Result<Box<dyn CorpusSource>> {
    if ZipCorpus::is_zip_path(root) && root.is_file() {
        Ok(Box::new(ZipCorpus::open(root)?))
    } else {
        Ok(Box::new(FsCorpus::open(root)?.with_mmap(use_mmap)))
    }
}
