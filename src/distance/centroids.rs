use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Representative latitude/longitude for a postal code.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Centroid {
    pub lat: f64,
    pub lng: f64,
}

impl Centroid {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Washington starter set. Unknown ZIPs fall back to the ZIP3 heuristic.
const WA_CENTROIDS: [(&str, Centroid); 7] = [
    ("98116", Centroid::new(47.5776, -122.3869)), // West Seattle
    ("98103", Centroid::new(47.6727, -122.3418)),
    ("98110", Centroid::new(47.6474, -122.5340)), // Bainbridge Island
    ("98101", Centroid::new(47.6105, -122.3343)),
    ("98402", Centroid::new(47.2536, -122.4443)), // Tacoma
    ("98310", Centroid::new(47.5854, -122.6237)), // Bremerton
    ("98520", Centroid::new(46.9754, -123.8157)), // Aberdeen
];

/// Postal code to centroid lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CentroidTable {
    entries: BTreeMap<String, Centroid>,
}

impl CentroidTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in reference data.
    pub fn builtin() -> Self {
        Self {
            entries: WA_CENTROIDS
                .iter()
                .map(|(zip, c)| (zip.to_string(), *c))
                .collect(),
        }
    }

    /// Built-in data with `extra` layered on top; entries in `extra` replace
    /// built-in ones for the same code.
    pub fn with_overrides(extra: &BTreeMap<String, Centroid>) -> Self {
        let mut table = Self::builtin();
        for (zip, centroid) in extra {
            table.insert(zip.trim().to_string(), *centroid);
        }
        table
    }

    pub fn insert(&mut self, zip: String, centroid: Centroid) {
        self.entries.insert(zip, centroid);
    }

    pub fn get(&self, zip: &str) -> Option<&Centroid> {
        self.entries.get(zip)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn zips(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
