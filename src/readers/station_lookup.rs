use crate::error::{IndexError, Result};
use crate::models::{Coordinates, Province};
use crate::utils::coordinates::parse_coordinate;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Side metadata for locations whose CSVs carry no coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct StationEntry {
    pub coordinates: Coordinates,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StationRow {
    province: String,
    location_id: String,
    latitude: String,
    longitude: String,
    #[serde(default)]
    name: Option<String>,
}

/// Lookup table keyed by `(province, location_id)`.
///
/// Expected format, header first:
/// `province,location_id,latitude,longitude[,name]`. Coordinates may be decimal
/// degrees or `DD:MM:SS`.
#[derive(Debug, Clone, Default)]
pub struct StationLookup {
    stations: HashMap<(Province, String), StationEntry>,
}

impl StationLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::read_from(file)
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut lookup = Self::new();
        for (row_index, row) in csv_reader.deserialize::<StationRow>().enumerate() {
            // Header is line 1
            let line = row_index + 2;
            let row = row?;

            let province = row.province.parse::<Province>().map_err(|_| {
                IndexError::InvalidFormat(format!(
                    "Station lookup line {}: unknown province '{}'",
                    line, row.province
                ))
            })?;

            if row.location_id.is_empty() {
                return Err(IndexError::InvalidFormat(format!(
                    "Station lookup line {}: empty location_id",
                    line
                )));
            }

            let coordinates = Coordinates::new(
                parse_coordinate(&row.latitude)?,
                parse_coordinate(&row.longitude)?,
            )
            .map_err(|e| {
                IndexError::InvalidCoordinate(format!("Station lookup line {}: {}", line, e))
            })?;

            let name = row.name.filter(|n| !n.is_empty());
            lookup.insert(province, &row.location_id, StationEntry { coordinates, name });
        }

        Ok(lookup)
    }

    pub fn insert(&mut self, province: Province, location_id: &str, entry: StationEntry) {
        self.stations
            .insert((province, location_id.to_string()), entry);
    }

    pub fn get(&self, province: Province, location_id: &str) -> Option<&StationEntry> {
        self.stations.get(&(province, location_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
