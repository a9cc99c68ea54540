use crate::error::{IndexError, Result};
use crate::models::Province;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair, rejecting values outside the valid globe range
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coordinates = Self {
            latitude,
            longitude,
        };
        coordinates.validate()?;
        Ok(coordinates)
    }
}

/// Inclusive span of observation dates; `earliest <= latest` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    earliest: NaiveDate,
    latest: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    earliest: NaiveDate,
    latest: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = IndexError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.earliest, raw.latest)
    }
}

impl DateRange {
    pub fn new(earliest: NaiveDate, latest: NaiveDate) -> Result<Self> {
        if earliest > latest {
            return Err(IndexError::InvalidFormat(format!(
                "Date range start {} is after end {}",
                earliest, latest
            )));
        }
        Ok(Self { earliest, latest })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            earliest: date,
            latest: date,
        }
    }

    /// Widen the range to cover `date`
    pub fn include(&mut self, date: NaiveDate) {
        if date < self.earliest {
            self.earliest = date;
        }
        if date > self.latest {
            self.latest = date;
        }
    }

    pub fn earliest(&self) -> NaiveDate {
        self.earliest
    }

    pub fn latest(&self) -> NaiveDate {
        self.latest
    }

    pub fn days(&self) -> i64 {
        (self.latest - self.earliest).num_days() + 1
    }
}

/// One monitoring location, derived from a single corpus CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub province: Province,
    pub location_id: String,
    pub display_name: String,
    /// Path of the CSV as the presentation layer fetches it
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub date_range: DateRange,
    pub available_fields: Vec<String>,
    pub observations: usize,
}

impl LocationRecord {
    /// Sort key of the index: canonical province order, then location id
    pub fn sort_key(&self) -> (Province, &str) {
        (self.province, self.location_id.as_str())
    }
}
