use serde::{Deserialize, Serialize};
use std::fmt;

/// Climate variable families recognised in CSV headers.
///
/// Matching is by case-insensitive substring against the column name. The
/// vocabulary only drives warnings and display metadata; columns that do not
/// match are still indexed under their literal name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldCategory {
    Temperature,
    Rain,
    SnowOnGround,
    Snowfall,
    Precipitation,
    Wind,
    Other,
}

/// How a header column is used when building a location record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Date,
    Metadata(MetadataColumn),
    Field(FieldCategory),
}

/// Station metadata columns written by the data fetcher alongside observations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataColumn {
    StationName,
    StationId,
    ClimateId,
    Latitude,
    Longitude,
}

const DATE_COLUMNS: [&str; 3] = ["date", "date/time", "date_time"];

// Order matters: "snow on grnd" must win over "snow", "rain" over "precip".
const VOCABULARY: [(&str, FieldCategory); 9] = [
    ("temp", FieldCategory::Temperature),
    ("rain", FieldCategory::Rain),
    ("snow on grnd", FieldCategory::SnowOnGround),
    ("snow_on_grnd", FieldCategory::SnowOnGround),
    ("snow_on_ground", FieldCategory::SnowOnGround),
    ("snow", FieldCategory::Snowfall),
    ("precip", FieldCategory::Precipitation),
    ("gust", FieldCategory::Wind),
    ("wind", FieldCategory::Wind),
];

impl FieldCategory {
    /// Classify a climate column name
    pub fn classify(column: &str) -> Self {
        let lower = column.trim().to_lowercase();
        VOCABULARY
            .iter()
            .find(|(needle, _)| lower.contains(needle))
            .map(|(_, category)| *category)
            .unwrap_or(FieldCategory::Other)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, FieldCategory::Other)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FieldCategory::Temperature => "Temperature",
            FieldCategory::Rain => "Rain",
            FieldCategory::SnowOnGround => "Snow on Ground",
            FieldCategory::Snowfall => "Snowfall",
            FieldCategory::Precipitation => "Precipitation",
            FieldCategory::Wind => "Wind",
            FieldCategory::Other => "Other",
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl MetadataColumn {
    pub fn classify(column: &str) -> Option<Self> {
        let lower = column.trim().to_lowercase();
        match lower.as_str() {
            "station name" | "station_name" => Some(MetadataColumn::StationName),
            "station id" | "station_id" => Some(MetadataColumn::StationId),
            "climate id" | "climate_id" => Some(MetadataColumn::ClimateId),
            "latitude" | "lat" | "latitude (y)" => Some(MetadataColumn::Latitude),
            "longitude" | "lon" | "lng" | "longitude (x)" => Some(MetadataColumn::Longitude),
            _ => None,
        }
    }
}

impl ColumnRole {
    /// Role of a non-date header column
    pub fn of(column: &str) -> Self {
        match MetadataColumn::classify(column) {
            Some(meta) => ColumnRole::Metadata(meta),
            None => ColumnRole::Field(FieldCategory::classify(column)),
        }
    }
}

/// Whether a header column names the observation date
pub fn is_date_column(column: &str) -> bool {
    let lower = column.trim().to_lowercase();
    DATE_COLUMNS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_fetcher_columns() {
        assert_eq!(FieldCategory::classify("Max Temp (°C)"), FieldCategory::Temperature);
        assert_eq!(FieldCategory::classify("Total Rain (mm)"), FieldCategory::Rain);
        assert_eq!(FieldCategory::classify("Snow on Grnd (cm)"), FieldCategory::SnowOnGround);
        assert_eq!(FieldCategory::classify("Total Snow (cm)"), FieldCategory::Snowfall);
        assert_eq!(FieldCategory::classify("Total Precip (mm)"), FieldCategory::Precipitation);
        assert_eq!(FieldCategory::classify("Spd of Max Gust (km/h)"), FieldCategory::Wind);
    }

    #[test]
    fn test_classify_snake_case_columns() {
        assert_eq!(FieldCategory::classify("max_temp"), FieldCategory::Temperature);
        assert_eq!(FieldCategory::classify("precip"), FieldCategory::Precipitation);
        assert_eq!(FieldCategory::classify("snow_on_grnd"), FieldCategory::SnowOnGround);
        assert_eq!(FieldCategory::classify("humidity"), FieldCategory::Other);
        assert!(!FieldCategory::classify("humidity").is_recognized());
    }

    #[test]
    fn test_column_roles() {
        assert!(is_date_column("Date/Time"));
        assert!(is_date_column(" date "));
        assert!(!is_date_column("max_temp"));
        assert_eq!(
            ColumnRole::of("Station Name"),
            ColumnRole::Metadata(MetadataColumn::StationName)
        );
        assert_eq!(
            ColumnRole::of("Latitude (y)"),
            ColumnRole::Metadata(MetadataColumn::Latitude)
        );
        assert_eq!(
            ColumnRole::of("Min Temp (°C)"),
            ColumnRole::Field(FieldCategory::Temperature)
        );
    }
}
