pub mod build_report;
pub mod index_builder;
pub mod scanner;

pub use build_report::{BuildReport, Rejection};
pub use index_builder::{IndexBuild, IndexBuilder};
pub use scanner::{CorpusScanner, DirectorySkipReason, SkippedDirectory};
