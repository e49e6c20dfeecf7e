//! Feature records as delivered by the browser's data adapters

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One genomic feature
///
/// Only the attributes are of interest to the colorize core; coordinates and
/// subfeatures travel along untouched in the same map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "uniqueId", default)]
    pub unique_id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Feature {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Feature {
            unique_id: unique_id.into(),
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Read an attribute (None if absent)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}
