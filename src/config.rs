use crate::error::{IndexError, Result};
use crate::models::Province;
use crate::utils::constants::{
    CONFIG_FILE_STEM, DEFAULT_CORPUS_ROOT, DEFAULT_DATE_FORMAT, DEFAULT_FILE_PREFIX,
    DEFAULT_OUTPUT_PATH, ENV_PREFIX, FORMAT_INDEX, FORMAT_MANIFEST,
};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Serialized shape of the output artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexFormat {
    /// Ordered list of full location records
    #[default]
    Index,
    /// Province → `[{label, file}]` map read by the original dashboard
    Manifest,
}

impl FromStr for IndexFormat {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            FORMAT_INDEX => Ok(IndexFormat::Index),
            FORMAT_MANIFEST => Ok(IndexFormat::Manifest),
            other => Err(IndexError::Config(format!(
                "Unknown index format '{}' (expected '{}' or '{}')",
                other, FORMAT_INDEX, FORMAT_MANIFEST
            ))),
        }
    }
}

impl fmt::Display for IndexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexFormat::Index => f.write_str(FORMAT_INDEX),
            IndexFormat::Manifest => f.write_str(FORMAT_MANIFEST),
        }
    }
}

/// Everything the index builder needs, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory (or `.zip` archive) holding one sub-directory per province
    pub corpus_root: PathBuf,
    pub output_path: PathBuf,
    /// Provinces to index; directories for other codes are skipped with a warning
    pub provinces: Vec<Province>,
    pub date_format: String,
    /// Prefix of the `file` path written for each location
    pub file_prefix: String,
    /// Optional CSV of `province,location_id,latitude,longitude[,name]`
    pub stations_file: Option<PathBuf>,
    pub format: IndexFormat,
    pub max_workers: usize,
    pub use_mmap: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            corpus_root: PathBuf::from(DEFAULT_CORPUS_ROOT),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            provinces: Province::ALL.to_vec(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            stations_file: None,
            format: IndexFormat::Index,
            max_workers: num_cpus::get(),
            use_mmap: false,
        }
    }
}

impl IndexConfig {
    /// Layer defaults, an optional config file and `CLIMATE_INDEX_*` variables.
    ///
    /// Without an explicit path, `climate-index.{toml,json,yaml}` in the working
    /// directory is used when present.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(CONFIG_FILE_STEM).required(false)),
        };

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("provinces"),
            )
            .build()?;

        let config: IndexConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.provinces.is_empty() {
            return Err(IndexError::Config(
                "At least one province must be configured".to_string(),
            ));
        }
        if self.max_workers == 0 {
            return Err(IndexError::Config("max_workers must be at least 1".to_string()));
        }
        if self.date_format.trim().is_empty() {
            return Err(IndexError::Config("date_format must not be empty".to_string()));
        }
        // A format that cannot round-trip a known date would reject every row
        let probe = NaiveDate::from_ymd_opt(2000, 12, 31).unwrap_or_default();
        let mut rendered = String::new();
        let renders = write!(rendered, "{}", probe.format(&self.date_format)).is_ok();
        if !renders || NaiveDate::parse_from_str(&rendered, &self.date_format).ok() != Some(probe) {
            return Err(IndexError::Config(format!(
                "date_format '{}' cannot represent calendar dates",
                self.date_format
            )));
        }
        Ok(())
    }

    pub fn with_corpus_root(mut self, corpus_root: impl Into<PathBuf>) -> Self {
        self.corpus_root = corpus_root.into();
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_provinces(mut self, provinces: Vec<Province>) -> Self {
        self.provinces = provinces;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_format(mut self, format: IndexFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_stations_file(mut self, stations_file: impl Into<PathBuf>) -> Self {
        self.stations_file = Some(stations_file.into());
        self
    }

    pub fn with_file_prefix(mut self, file_prefix: impl Into<String>) -> Self {
        self.file_prefix = file_prefix.into();
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }
}
