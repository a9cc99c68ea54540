use crate::config::IndexConfig;
use crate::error::{IndexError, RejectionReason, Result};
use crate::models::{LocationIndex, Province};
use crate::processors::{BuildReport, CorpusScanner, Rejection, SkippedDirectory};
use crate::readers::{CorpusFile, CorpusSource, Extraction, LocationReader, StationLookup};
use crate::utils::progress::ProgressReporter;
use crate::writers::IndexWriter;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

type FileOutcome = (Province, CorpusFile, std::result::Result<Extraction, RejectionReason>);

/// Result of a build pass: the assembled index and what happened along the way
#[derive(Debug, Clone)]
pub struct IndexBuild {
    pub index: LocationIndex,
    pub report: BuildReport,
}

/// Scans a corpus, extracts one record per CSV and assembles the index.
///
/// Extraction runs on a rayon pool when `max_workers > 1`; every file is
/// handled independently and the assembler waits for all of them before
/// sorting. Writing is always a single atomic step at the end.
pub struct IndexBuilder {
    config: IndexConfig,
    reader: LocationReader,
    writer: IndexWriter,
    cancelled: Arc<AtomicBool>,
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;

        let mut reader = LocationReader::new()
            .with_date_format(config.date_format.clone())
            .with_file_prefix(config.file_prefix.clone());

        if let Some(path) = &config.stations_file {
            let lookup = StationLookup::read_file(path)?;
            info!("Loaded {} station(s) from {}", lookup.len(), path.display());
            reader = reader.with_lookup(lookup);
        }

        let writer = IndexWriter::with_format(config.format);

        Ok(Self {
            config,
            reader,
            writer,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Share a flag that, once set, stops the build before the next file or write
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Scan and extract the whole corpus without writing anything
    pub fn build<S: CorpusSource + ?Sized>(
        &self,
        source: &S,
        progress: Option<&ProgressReporter>,
    ) -> Result<IndexBuild> {
        let mut scanner = CorpusScanner::new(source, &self.config.provinces)?;

        let outcomes = if self.config.max_workers <= 1 {
            self.extract_sequential(source, &mut scanner, progress)?
        } else {
            let files: Vec<(Province, CorpusFile)> = scanner.by_ref().collect();
            if let Some(p) = progress {
                p.set_length(files.len() as u64);
            }
            self.extract_parallel(source, files, progress)?
        };

        let files_scanned = scanner.files_seen();
        let skipped = scanner.into_skipped_directories();

        let build = self.assemble(source.describe(), files_scanned, skipped, outcomes)?;

        if let Some(p) = progress {
            p.finish_with_message(&format!("Indexed {} location(s)", build.index.len()));
        }

        Ok(build)
    }

    /// Write a finished build to the configured output path.
    ///
    /// An empty index is never written, so the dashboard keeps its previous one.
    pub fn write(&self, build: &IndexBuild) -> Result<()> {
        if build.index.is_empty() {
            return Err(IndexError::EmptyIndex {
                rejected: build.report.rejections.len(),
            });
        }
        if self.is_cancelled() {
            return Err(IndexError::Cancelled);
        }
        self.writer.write(&build.index, &self.config.output_path)
    }

    pub fn build_and_write<S: CorpusSource + ?Sized>(
        &self,
        source: &S,
        progress: Option<&ProgressReporter>,
    ) -> Result<IndexBuild> {
        let build = self.build(source, progress)?;
        self.write(&build)?;
        Ok(build)
    }

    fn extract_sequential<S: CorpusSource + ?Sized>(
        &self,
        source: &S,
        scanner: &mut CorpusScanner<'_, S>,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<FileOutcome>> {
        let mut outcomes = Vec::new();

        for (province, file) in scanner.by_ref() {
            if self.is_cancelled() {
                return Err(IndexError::Cancelled);
            }
            let outcome = self.reader.read_location(source, province, &file);
            if let Some(p) = progress {
                p.increment(1);
            }
            outcomes.push((province, file, outcome));
        }

        Ok(outcomes)
    }

    fn extract_parallel<S: CorpusSource + ?Sized>(
        &self,
        source: &S,
        files: Vec<(Province, CorpusFile)>,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<FileOutcome>> {
        let processed_count = Arc::new(AtomicUsize::new(0));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()
            .map_err(|e| IndexError::Config(e.to_string()))?;

        // Indexed collect keeps scan order, so duplicate handling stays deterministic
        let outcomes: Vec<FileOutcome> = pool.install(|| {
            files
                .into_par_iter()
                .map(|(province, file)| {
                    if self.is_cancelled() {
                        return (province, file, Err(RejectionReason::Cancelled));
                    }
                    let outcome = self.reader.read_location(source, province, &file);

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    (province, file, outcome)
                })
                .collect()
        });

        if self.is_cancelled() {
            return Err(IndexError::Cancelled);
        }
        Ok(outcomes)
    }

    fn assemble(
        &self,
        corpus: String,
        files_scanned: usize,
        skipped_directories: Vec<SkippedDirectory>,
        outcomes: Vec<FileOutcome>,
    ) -> Result<IndexBuild> {
        let mut report = BuildReport::new(corpus);
        report.files_scanned = files_scanned;
        report.skipped_directories = skipped_directories;

        let mut records = Vec::with_capacity(outcomes.len());
        let mut seen: HashMap<(Province, String), String> = HashMap::new();

        for (province, file, outcome) in outcomes {
            let extraction = match outcome {
                Ok(extraction) => extraction,
                Err(RejectionReason::Cancelled) => return Err(IndexError::Cancelled),
                Err(reason) => {
                    warn!("Rejected {}: {}", file, reason);
                    report.rejections.push(Rejection {
                        province,
                        file: file.relative_path(),
                        reason,
                    });
                    continue;
                }
            };

            let key = (province, extraction.record.location_id.clone());
            if let Some(existing) = seen.get(&key) {
                let reason = RejectionReason::DuplicateLocation {
                    location_id: key.1.clone(),
                    existing: existing.clone(),
                };
                warn!("Rejected {}: {}", file, reason);
                report.rejections.push(Rejection {
                    province,
                    file: file.relative_path(),
                    reason,
                });
                continue;
            }
            seen.insert(key, file.relative_path());

            report.skipped_rows += extraction.skipped_rows.len();
            report.duplicate_dates += extraction.duplicate_dates;
            for field in extraction.unrecognized_fields {
                if !report.unrecognized_fields.contains(&field) {
                    warn!(
                        "Field '{}' (first seen in {}) is outside the known climate vocabulary; indexed as-is",
                        field, file
                    );
                    report.unrecognized_fields.insert(field);
                }
            }

            *report.indexed.entry(province).or_insert(0) += 1;
            records.push(extraction.record);
        }

        let index = LocationIndex::from_records(records);
        info!("{}", report.summary_line());

        Ok(IndexBuild { index, report })
    }
}
