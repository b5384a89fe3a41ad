use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::distance::{Centroid, CentroidTable};
use crate::estimate::{EngineConfig, Estimator};
use crate::rates::RateTable;

/// Rate file contents. Every section is optional and falls back to the
/// built-in defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub tuning: EngineConfig,
    pub rates: RateTable,
    /// Extra or replacement ZIP centroids, layered over the built-in set
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub centroids: BTreeMap<String, Centroid>,
}

impl Config {
    /// Build an engine from this configuration.
    pub fn estimator(&self) -> Estimator {
        Estimator::new(
            self.rates.clone(),
            self.tuning.clone(),
            CentroidTable::with_overrides(&self.centroids),
        )
    }
}
