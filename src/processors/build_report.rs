use crate::error::RejectionReason;
use crate::models::Province;
use crate::processors::SkippedDirectory;
use std::collections::{BTreeMap, BTreeSet};

/// A corpus file left out of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub province: Province,
    /// Path relative to the corpus root (e.g. `NS/Halifax.csv`)
    pub file: String,
    pub reason: RejectionReason,
}

/// Outcome of one build pass, printed at the end of every run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub corpus: String,
    pub files_scanned: usize,
    pub indexed: BTreeMap<Province, usize>,
    pub rejections: Vec<Rejection>,
    pub skipped_directories: Vec<SkippedDirectory>,
    pub skipped_rows: usize,
    pub duplicate_dates: usize,
    pub unrecognized_fields: BTreeSet<String>,
}

impl BuildReport {
    pub fn new(corpus: impl Into<String>) -> Self {
        Self {
            corpus: corpus.into(),
            indexed: Province::ALL.iter().map(|p| (*p, 0)).collect(),
            ..Default::default()
        }
    }

    pub fn total_indexed(&self) -> usize {
        self.indexed.values().sum()
    }

    pub fn has_rejections(&self) -> bool {
        !self.rejections.is_empty()
    }

    pub fn rejections_by_province(&self) -> BTreeMap<Province, usize> {
        let mut counts = BTreeMap::new();
        for rejection in &self.rejections {
            *counts.entry(rejection.province).or_insert(0) += 1;
        }
        counts
    }

    /// One-line per-province count of indexed locations
    pub fn summary_line(&self) -> String {
        let per_province: Vec<String> = self
            .indexed
            .iter()
            .map(|(province, count)| format!("{}: {}", province, count))
            .collect();

        format!(
            "Indexed {} location(s) ({}); {} file(s) rejected",
            self.total_indexed(),
            per_province.join(", "),
            self.rejections.len()
        )
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Location Index Report ===\n");
        summary.push_str(&format!("Corpus: {}\n", self.corpus));
        summary.push_str(&format!("CSV files scanned: {}\n", self.files_scanned));
        summary.push_str(&format!("Locations indexed: {}\n", self.total_indexed()));
        for (province, count) in &self.indexed {
            summary.push_str(&format!("  {:<4} {:>4}  {}\n", province.code(), count, province.name()));
        }

        if self.skipped_rows > 0 {
            summary.push_str(&format!("Rows skipped (bad date or malformed): {}\n", self.skipped_rows));
        }
        if self.duplicate_dates > 0 {
            summary.push_str(&format!("Duplicate date rows kept: {}\n", self.duplicate_dates));
        }
        if !self.unrecognized_fields.is_empty() {
            let fields: Vec<&str> = self.unrecognized_fields.iter().map(String::as_str).collect();
            summary.push_str(&format!("Unrecognised fields (kept): {}\n", fields.join(", ")));
        }

        if !self.skipped_directories.is_empty() {
            summary.push_str(&format!(
                "\nSkipped directories: {}\n",
                self.skipped_directories.len()
            ));
            for directory in &self.skipped_directories {
                summary.push_str(&format!("  {}: {}\n", directory.name, directory.reason));
            }
        }

        summary.push_str(&format!("\nRejected files: {}\n", self.rejections.len()));
        if self.has_rejections() {
            let per_province: Vec<String> = self
                .rejections_by_province()
                .iter()
                .map(|(province, count)| format!("{}: {}", province, count))
                .collect();
            summary.push_str(&format!("  By province: {}\n", per_province.join(", ")));
            for rejection in &self.rejections {
                summary.push_str(&format!("  {}: {}\n", rejection.file, rejection.reason));
            }
        }

        summary
    }
}
