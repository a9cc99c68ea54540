use crate::error::Result;
use crate::models::{LocationRecord, Province};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The consolidated artifact read by the dashboard.
///
/// Records are grouped by province in canonical order and sorted by
/// `location_id` within a province, whatever order they were supplied in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationIndex {
    locations: Vec<LocationRecord>,
}

impl LocationIndex {
    pub fn from_records(mut records: Vec<LocationRecord>) -> Self {
        records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Self { locations: records }
    }

    /// Read a previously written index artifact
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let index: LocationIndex = serde_json::from_reader(BufReader::new(file))?;
        // Re-sort so hand-edited artifacts still satisfy the ordering contract
        Ok(Self::from_records(index.locations))
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocationRecord> {
        self.locations.iter()
    }

    pub fn locations(&self) -> &[LocationRecord] {
        &self.locations
    }

    pub fn by_province(&self, province: Province) -> impl Iterator<Item = &LocationRecord> {
        self.locations
            .iter()
            .filter(move |record| record.province == province)
    }

    pub fn get(&self, province: Province, location_id: &str) -> Option<&LocationRecord> {
        self.locations
            .binary_search_by(|record| record.sort_key().cmp(&(province, location_id)))
            .ok()
            .map(|i| &self.locations[i])
    }

    /// Number of locations per province; every province appears, possibly with zero
    pub fn counts_by_province(&self) -> BTreeMap<Province, usize> {
        let mut counts: BTreeMap<Province, usize> =
            Province::ALL.iter().map(|p| (*p, 0)).collect();
        for record in &self.locations {
            *counts.entry(record.province).or_default() += 1;
        }
        counts
    }

    pub fn to_manifest(&self) -> Manifest<'_> {
        Manifest { index: self }
    }
}

/// Legacy `locations.json` shape: province code → list of `{label, file}`.
pub struct Manifest<'a> {
    index: &'a LocationIndex,
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    label: &'a str,
    file: &'a str,
}

impl Serialize for Manifest<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let populated: Vec<Province> = Province::ALL
            .into_iter()
            .filter(|p| self.index.by_province(*p).next().is_some())
            .collect();

        let mut map = serializer.serialize_map(Some(populated.len()))?;
        for province in populated {
            let entries: Vec<ManifestEntry> = self
                .index
                .by_province(province)
                .map(|record| ManifestEntry {
                    label: &record.display_name,
                    file: &record.file,
                })
                .collect();
            map.serialize_entry(province.code(), &entries)?;
        }
        map.end()
    }
}
