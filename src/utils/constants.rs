/// Default corpus and artifact locations, relative to the dashboard root
pub const DEFAULT_CORPUS_ROOT: &str = "climate_data";
pub const DEFAULT_OUTPUT_PATH: &str = "locations.json";

/// Prefix the dashboard uses when fetching a location's CSV
pub const DEFAULT_FILE_PREFIX: &str = "climate_data";

/// Optional configuration file stem (climate-index.toml, .json, .yaml)
pub const CONFIG_FILE_STEM: &str = "climate-index";
pub const ENV_PREFIX: &str = "CLIMATE_INDEX";

/// Observation date format written by the data fetcher
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

pub const CSV_EXTENSION: &str = "csv";

/// Suffix the data fetcher appends to location file names
pub const DAILY_DATA_SUFFIX: &str = "_daily_data";

/// Atlantic Canada geographic bounds, used for plausibility warnings only
pub const ATLANTIC_MIN_LAT: f64 = 43.0;
pub const ATLANTIC_MAX_LAT: f64 = 61.0;
pub const ATLANTIC_MIN_LON: f64 = -69.5;
pub const ATLANTIC_MAX_LON: f64 = -52.0;

/// Upper bound on buffers pre-allocated from sizes declared in archive headers
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Output formats
pub const FORMAT_INDEX: &str = "index";
pub const FORMAT_MANIFEST: &str = "manifest";
