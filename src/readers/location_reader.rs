use crate::error::RejectionReason;
use crate::models::{
    is_date_column, ColumnRole, Coordinates, DateRange, LocationRecord, MetadataColumn, Province,
};
use crate::readers::{CorpusFile, CorpusSource, StationLookup};
use crate::utils::constants::{DEFAULT_DATE_FORMAT, DEFAULT_FILE_PREFIX};
use crate::utils::coordinates::{is_within_atlantic_canada, parse_coordinate};
use crate::utils::filename::{display_label, location_id_from_file_name, presentation_path};
use chrono::NaiveDate;
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Per-row warnings logged for a single file before the rest go to debug
const MAX_ROW_WARNINGS: usize = 5;

/// A data row left out of the date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

/// Successful extraction of one corpus file
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: LocationRecord,
    pub skipped_rows: Vec<SkippedRow>,
    pub duplicate_dates: usize,
    /// Field names outside the known climate vocabulary (still indexed)
    pub unrecognized_fields: Vec<String>,
}

/// `key: value` pairs from `#` comment lines above the header
#[derive(Debug, Default)]
struct HeaderComments {
    name: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
}

impl HeaderComments {
    fn absorb(&mut self, comment: &str) {
        let (key, value) = match comment.split_once(':').or_else(|| comment.split_once('=')) {
            Some((key, value)) => (key.trim().to_lowercase(), value.trim()),
            None => return,
        };
        if value.is_empty() {
            return;
        }

        match key.as_str() {
            "name" | "display_name" | "display name" | "station" | "station name" => {
                self.name = Some(value.to_string())
            }
            "latitude" | "lat" => self.latitude = Some(value.to_string()),
            "longitude" | "lon" | "lng" => self.longitude = Some(value.to_string()),
            _ => {}
        }
    }
}

/// Column positions resolved from the header row
struct HeaderLayout {
    date: usize,
    station_name: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    fields: Vec<String>,
    unrecognized: Vec<String>,
}

impl HeaderLayout {
    fn from_header(header: &csv::StringRecord) -> Self {
        let date = header.iter().position(is_date_column).unwrap_or(0);
        let mut layout = Self {
            date,
            station_name: None,
            latitude: None,
            longitude: None,
            fields: Vec::new(),
            unrecognized: Vec::new(),
        };

        for (index, column) in header.iter().enumerate() {
            let column = column.trim();
            if index == date || column.is_empty() {
                continue;
            }

            match ColumnRole::of(column) {
                ColumnRole::Metadata(MetadataColumn::StationName) => {
                    layout.station_name = Some(index)
                }
                ColumnRole::Metadata(MetadataColumn::Latitude) => layout.latitude = Some(index),
                ColumnRole::Metadata(MetadataColumn::Longitude) => layout.longitude = Some(index),
                ColumnRole::Metadata(_) | ColumnRole::Date => {}
                ColumnRole::Field(category) => {
                    if layout.fields.iter().any(|f| f == column) {
                        continue;
                    }
                    layout.fields.push(column.to_string());
                    if !category.is_recognized() {
                        layout.unrecognized.push(column.to_string());
                    }
                }
            }
        }

        layout
    }
}

/// Derives a [`LocationRecord`] from one corpus CSV.
///
/// Every data row is scanned because the corpus gives no ordering guarantee.
pub struct LocationReader {
    date_format: String,
    file_prefix: String,
    lookup: Option<StationLookup>,
}

impl LocationReader {
    pub fn new() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            lookup: None,
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    pub fn with_file_prefix(mut self, file_prefix: impl Into<String>) -> Self {
        self.file_prefix = file_prefix.into();
        self
    }

    pub fn with_lookup(mut self, lookup: StationLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Read a file from the corpus and extract its record
    pub fn read_location<S: CorpusSource + ?Sized>(
        &self,
        source: &S,
        province: Province,
        file: &CorpusFile,
    ) -> Result<Extraction, RejectionReason> {
        let bytes = source
            .read(file)
            .map_err(|e| RejectionReason::Unreadable(e.to_string()))?;
        self.extract(province, file, &bytes)
    }

    /// Extract a record from the raw contents of `file`
    pub fn extract(
        &self,
        province: Province,
        file: &CorpusFile,
        bytes: &[u8],
    ) -> Result<Extraction, RejectionReason> {
        if Province::from_code(&file.directory) != Some(province) {
            return Err(RejectionReason::ProvinceMismatch {
                directory: file.directory.clone(),
                expected: province.code().to_string(),
            });
        }

        let location_id =
            location_id_from_file_name(&file.name).ok_or(RejectionReason::InvalidName)?;

        if bytes.contains(&0) {
            return Err(RejectionReason::NotCsv);
        }

        let text = decode_text(bytes, file);
        let (comments, body, comment_lines) = split_header_comments(&text);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let header = reader
            .headers()
            .map_err(|_| RejectionReason::NotCsv)?
            .clone();
        if header.iter().all(|column| column.trim().is_empty()) {
            return Err(RejectionReason::MissingHeader);
        }

        let layout = HeaderLayout::from_header(&header);
        if layout.fields.is_empty() {
            return Err(RejectionReason::NoFields);
        }

        let mut date_range: Option<DateRange> = None;
        let mut seen_dates = HashSet::new();
        let mut duplicate_dates = 0;
        let mut data_rows = 0;
        let mut observations = 0;
        let mut skipped_rows = Vec::new();
        let mut station_name: Option<String> = None;
        let mut column_coordinates: Option<(String, String)> = None;

        for result in reader.records() {
            data_rows += 1;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    let line = e.position().map_or(0, |p| p.line()) + comment_lines;
                    self.skip_row(file, &mut skipped_rows, line, format!("malformed row: {}", e));
                    continue;
                }
            };
            let line = row.position().map_or(0, |p| p.line()) + comment_lines;

            let raw_date = row.get(layout.date).unwrap_or("");
            let date = match NaiveDate::parse_from_str(raw_date, &self.date_format) {
                Ok(date) => date,
                Err(_) => {
                    self.skip_row(
                        file,
                        &mut skipped_rows,
                        line,
                        format!("unparseable date '{}'", raw_date),
                    );
                    continue;
                }
            };

            observations += 1;
            if !seen_dates.insert(date) {
                duplicate_dates += 1;
            }
            match date_range.as_mut() {
                Some(range) => range.include(date),
                None => date_range = Some(DateRange::single(date)),
            }

            if let Some(name) = layout.station_name.and_then(|i| row.get(i)) {
                if !name.is_empty() {
                    station_name = Some(name.to_string());
                }
            }
            if let (Some(lat), Some(lon)) = (
                layout.latitude.and_then(|i| row.get(i)),
                layout.longitude.and_then(|i| row.get(i)),
            ) {
                if !lat.is_empty() && !lon.is_empty() {
                    column_coordinates = Some((lat.to_string(), lon.to_string()));
                }
            }
        }

        if data_rows == 0 {
            return Err(RejectionReason::NoDataRows);
        }
        let date_range = date_range.ok_or(RejectionReason::NoValidDates { rows: data_rows })?;

        if duplicate_dates > 0 {
            debug!("{}: {} duplicate date row(s) kept", file, duplicate_dates);
        }
        if skipped_rows.len() > MAX_ROW_WARNINGS {
            warn!(
                "{}: {} row(s) skipped in total",
                file,
                skipped_rows.len()
            );
        }

        let station = self
            .lookup
            .as_ref()
            .and_then(|lookup| lookup.get(province, &location_id));

        let display_name = comments
            .name
            .clone()
            .or(station_name)
            .or_else(|| station.and_then(|s| s.name.clone()))
            .unwrap_or_else(|| display_label(&location_id));

        let coordinates = self.resolve_coordinates(
            file,
            comments.latitude.as_deref().zip(comments.longitude.as_deref()),
            column_coordinates
                .as_ref()
                .map(|(lat, lon)| (lat.as_str(), lon.as_str())),
            station.map(|s| s.coordinates),
        );

        let record = LocationRecord {
            province,
            location_id,
            display_name,
            file: presentation_path(&self.file_prefix, province, &file.name),
            coordinates,
            date_range,
            available_fields: layout.fields,
            observations,
        };

        Ok(Extraction {
            record,
            skipped_rows,
            duplicate_dates,
            unrecognized_fields: layout.unrecognized,
        })
    }

    fn skip_row(&self, file: &CorpusFile, skipped: &mut Vec<SkippedRow>, line: u64, reason: String) {
        if skipped.len() < MAX_ROW_WARNINGS {
            warn!("{}: skipping line {}: {}", file, line, reason);
        } else {
            debug!("{}: skipping line {}: {}", file, line, reason);
        }
        skipped.push(SkippedRow { line, reason });
    }

    /// First valid coordinate pair from header comments, row columns, then the lookup
    fn resolve_coordinates(
        &self,
        file: &CorpusFile,
        from_comments: Option<(&str, &str)>,
        from_columns: Option<(&str, &str)>,
        from_lookup: Option<Coordinates>,
    ) -> Option<Coordinates> {
        let parsed = [from_comments, from_columns]
            .into_iter()
            .flatten()
            .find_map(|(lat, lon)| {
                let pair = parse_coordinate(lat)
                    .and_then(|lat| Ok((lat, parse_coordinate(lon)?)))
                    .and_then(|(lat, lon)| Coordinates::new(lat, lon));
                match pair {
                    Ok(coordinates) => Some(coordinates),
                    Err(e) => {
                        warn!("{}: ignoring coordinates ({}, {}): {}", file, lat, lon, e);
                        None
                    }
                }
            });

        let coordinates = parsed.or(from_lookup)?;
        if !is_within_atlantic_canada(coordinates.latitude, coordinates.longitude) {
            warn!(
                "{}: coordinates ({}, {}) lie outside Atlantic Canada",
                file, coordinates.latitude, coordinates.longitude
            );
        }
        Some(coordinates)
    }
}

impl Default for LocationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode as UTF-8 (BOM aware).
///
/// Windows-1252 is used only when the header itself is not UTF-8 (legacy
/// exports). Stray bytes in data rows of a UTF-8 file become U+FFFD so column
/// names are never re-interpreted.
fn decode_text<'a>(bytes: &'a [u8], file: &CorpusFile) -> Cow<'a, str> {
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if !had_errors {
        return text;
    }
    if header_is_utf8(bytes) {
        debug!("{}: invalid UTF-8 in data rows replaced", file);
        return text;
    }
    debug!("{}: header is not valid UTF-8, decoding as Windows-1252", file);
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text
}

/// Whether every line up to and including the header row is valid UTF-8
fn header_is_utf8(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    for line in bytes.split(|b| *b == b'\n') {
        if std::str::from_utf8(line).is_err() {
            return false;
        }
        match line.iter().copied().find(|b| !b.is_ascii_whitespace()) {
            None | Some(b'#') => continue,
            Some(_) => return true,
        }
    }
    true
}

/// Split leading `#` comment lines (and blank lines) from the CSV body.
///
/// Returns the parsed comments, the remaining text and the number of lines
/// consumed, so row positions can be reported against the original file.
fn split_header_comments(text: &str) -> (HeaderComments, &str, u64) {
    let mut comments = HeaderComments::default();
    let mut rest = text;
    let mut consumed = 0;

    while !rest.is_empty() {
        let (line, remainder) = rest.split_once('\n').unwrap_or((rest, ""));
        let trimmed = line.trim();

        if let Some(comment) = trimmed.strip_prefix('#') {
            comments.absorb(comment);
        } else if !trimmed.is_empty() {
            break;
        }

        rest = remainder;
        consumed += 1;
    }

    (comments, rest, consumed)
}
