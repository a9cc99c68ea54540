use crate::models::Province;
use crate::utils::constants::{CSV_EXTENSION, DAILY_DATA_SUFFIX};

/// Whether a corpus file name carries the CSV extension (case-insensitive)
pub fn is_csv_file_name(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(CSV_EXTENSION))
}

/// Location id is the file name without its extension (e.g. `Halifax.csv` -> `Halifax`)
pub fn location_id_from_file_name(file_name: &str) -> Option<String> {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => file_name,
    };
    let stem = stem.trim();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Human-readable label derived from a location id.
///
/// Strips the fetcher's `_daily_data` suffix and turns underscores into spaces,
/// so `Saint_John_daily_data` becomes `Saint John`.
pub fn display_label(location_id: &str) -> String {
    let base = location_id
        .strip_suffix(DAILY_DATA_SUFFIX)
        .filter(|base| !base.is_empty())
        .unwrap_or(location_id);
    let label = base.replace('_', " ");
    let label = label.trim();
    if label.is_empty() {
        location_id.to_string()
    } else {
        label.to_string()
    }
}

/// Path the dashboard uses to fetch a location's CSV, always with forward slashes
pub fn presentation_path(file_prefix: &str, province: Province, file_name: &str) -> String {
    let prefix = file_prefix.trim_end_matches('/');
    if prefix.is_empty() {
        format!("{}/{}", province.code(), file_name)
    } else {
        format!("{}/{}/{}", prefix, province.code(), file_name)
    }
}
