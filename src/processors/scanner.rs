use crate::error::Result;
use crate::models::Province;
use crate::readers::{CorpusFile, CorpusSource};
use crate::utils::filename::is_csv_file_name;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, warn};

/// Why a directory under the corpus root was not scanned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorySkipReason {
    UnrecognizedProvince,
    NotConfigured,
    Unreadable(String),
}

impl fmt::Display for DirectorySkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectorySkipReason::UnrecognizedProvince => f.write_str("not a recognised province code"),
            DirectorySkipReason::NotConfigured => f.write_str("province not selected for this run"),
            DirectorySkipReason::Unreadable(e) => write!(f, "could not be listed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDirectory {
    pub name: String,
    pub reason: DirectorySkipReason,
}

/// Lazy walk over the CSV files of a corpus.
///
/// Province directories are visited in canonical order and files within a
/// province by name, so a scan is stable regardless of how the source lists
/// entries. Each province directory is listed only when the iterator reaches
/// it. A scanner is single-use; scan again by creating a new one.
pub struct CorpusScanner<'a, S: CorpusSource + ?Sized> {
    source: &'a S,
    provinces: VecDeque<(Province, String)>,
    pending: VecDeque<(Province, CorpusFile)>,
    skipped: Vec<SkippedDirectory>,
    files_seen: usize,
}

impl<'a, S: CorpusSource + ?Sized> CorpusScanner<'a, S> {
    /// List the corpus root; failing to do so is fatal for the build.
    pub fn new(source: &'a S, configured: &[Province]) -> Result<Self> {
        let mut directories = source.list_provinces()?;
        directories.sort();

        let mut provinces = Vec::new();
        let mut skipped = Vec::new();

        for name in directories {
            match Province::from_code(&name) {
                Some(province) if configured.contains(&province) => {
                    provinces.push((province, name));
                }
                Some(_) => {
                    debug!("Skipping province directory '{}': not selected", name);
                    skipped.push(SkippedDirectory {
                        name,
                        reason: DirectorySkipReason::NotConfigured,
                    });
                }
                None => {
                    warn!(
                        "Skipping directory '{}' in {}: not a recognised province code",
                        name,
                        source.describe()
                    );
                    skipped.push(SkippedDirectory {
                        name,
                        reason: DirectorySkipReason::UnrecognizedProvince,
                    });
                }
            }
        }

        provinces.sort_by_key(|(province, _)| *province);

        Ok(Self {
            source,
            provinces: provinces.into(),
            pending: VecDeque::new(),
            skipped,
            files_seen: 0,
        })
    }

    /// Provinces still to be listed, in visiting order
    pub fn remaining_provinces(&self) -> Vec<Province> {
        self.provinces.iter().map(|(province, _)| *province).collect()
    }

    pub fn skipped_directories(&self) -> &[SkippedDirectory] {
        &self.skipped
    }

    pub fn into_skipped_directories(self) -> Vec<SkippedDirectory> {
        self.skipped
    }

    /// CSV files yielded so far
    pub fn files_seen(&self) -> usize {
        self.files_seen
    }

    fn load_next_province(&mut self) -> bool {
        while let Some((province, directory)) = self.provinces.pop_front() {
            match self.source.list_files(&directory) {
                Ok(files) => {
                    let mut csv_files: Vec<CorpusFile> = files
                        .into_iter()
                        .filter(|file| is_csv_file_name(&file.name))
                        .collect();
                    csv_files.sort_by(|a, b| a.name.cmp(&b.name));

                    debug!("{}: {} CSV file(s)", directory, csv_files.len());
                    if csv_files.is_empty() {
                        continue;
                    }
                    self.pending
                        .extend(csv_files.into_iter().map(|file| (province, file)));
                    return true;
                }
                Err(e) => {
                    warn!("Skipping directory '{}': {}", directory, e);
                    self.skipped.push(SkippedDirectory {
                        name: directory,
                        reason: DirectorySkipReason::Unreadable(e.to_string()),
                    });
                }
            }
        }
        false
    }
}

impl<S: CorpusSource + ?Sized> Iterator for CorpusScanner<'_, S> {
    type Item = (Province, CorpusFile);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_empty() && !self.load_next_province() {
            return None;
        }
        let item = self.pending.pop_front()?;
        self.files_seen += 1;
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::readers::{FileContents, MemoryCorpus};
    use pretty_assertions::assert_eq;

    fn scan_paths(corpus: &MemoryCorpus, configured: &[Province]) -> Vec<String> {
        CorpusScanner::new(corpus, configured)
            .unwrap()
            .map(|(_, file)| file.relative_path())
            .collect()
    }

    #[test]
    fn test_canonical_order_regardless_of_listing() {
        let corpus = MemoryCorpus::new()
            .with_file("PEI", "Summerside.csv", "")
            .with_file("NS", "Sydney.csv", "")
            .with_file("NB", "Moncton.csv", "")
            .with_file("NS", "Halifax.csv", "")
            .with_file("NL", "Gander.csv", "");

        assert_eq!(
            scan_paths(&corpus, &Province::ALL),
            vec![
                "NB/Moncton.csv",
                "NL/Gander.csv",
                "NS/Halifax.csv",
                "NS/Sydney.csv",
                "PEI/Summerside.csv"
            ]
        );
    }

    #[test]
    fn test_skips_unknown_and_non_csv() {
        let corpus = MemoryCorpus::new()
            .with_file("QC", "Montreal.csv", "")
            .with_file("nb", "Moncton.csv", "")
            .with_file("NB", "notes.txt", "")
            .with_file("NB", "Fredericton.csv", "");

        let mut scanner = CorpusScanner::new(&corpus, &Province::ALL).unwrap();
        let items: Vec<(Province, CorpusFile)> = scanner.by_ref().collect();

        assert_eq!(
            items,
            vec![(Province::NewBrunswick, CorpusFile::new("NB", "Fredericton.csv"))]
        );
        assert_eq!(scanner.files_seen(), 1);
        let skipped: Vec<&str> = scanner
            .skipped_directories()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(skipped, vec!["QC", "nb"]);
        assert!(scanner
            .skipped_directories()
            .iter()
            .all(|d| d.reason == DirectorySkipReason::UnrecognizedProvince));
    }

    #[test]
    fn test_respects_configured_provinces() {
        let corpus = MemoryCorpus::new()
            .with_file("NB", "Moncton.csv", "")
            .with_file("NS", "Halifax.csv", "");

        let scanner = CorpusScanner::new(&corpus, &[Province::NovaScotia]).unwrap();
        assert_eq!(scanner.remaining_provinces(), vec![Province::NovaScotia]);
        assert_eq!(
            scanner.skipped_directories(),
            &[SkippedDirectory {
                name: "NB".to_string(),
                reason: DirectorySkipReason::NotConfigured,
            }]
        );
        assert_eq!(scan_paths(&corpus, &[Province::NovaScotia]), vec!["NS/Halifax.csv"]);
    }

    #[test]
    fn test_empty_corpus_yields_nothing() {
        let corpus = MemoryCorpus::new();
        assert!(scan_paths(&corpus, &Province::ALL).is_empty());
    }

    struct BrokenCorpus;

    impl CorpusSource for BrokenCorpus {
        fn describe(&self) -> String {
            "broken".to_string()
        }
        fn list_provinces(&self) -> Result<Vec<String>> {
            Ok(vec!["NS".to_string(), "NB".to_string()])
        }
        fn list_files(&self, directory: &str) -> Result<Vec<CorpusFile>> {
            if directory == "NB" {
                Err(IndexError::InvalidFormat("permission denied".to_string()))
            } else {
                Ok(vec![CorpusFile::new(directory, "Halifax.csv")])
            }
        }
        fn read(&self, _file: &CorpusFile) -> Result<FileContents> {
            Ok(FileContents::Owned(Vec::new()))
        }
    }

    #[test]
    fn test_unreadable_province_directory_is_skipped() {
        let mut scanner = CorpusScanner::new(&BrokenCorpus, &Province::ALL).unwrap();
        let items: Vec<_> = scanner.by_ref().collect();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].0, Province::NovaScotia);
        assert!(matches!(
            scanner.skipped_directories()[0].reason,
            DirectorySkipReason::Unreadable(_)
        ));
    }
}
