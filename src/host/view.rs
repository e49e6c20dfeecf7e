//! Linear view state as seen by a display
//!
//! The host publishes a fresh `ViewState` through a `tokio::sync::watch`
//! channel whenever the view is initialized, scrolled, zoomed or its track
//! list changes. The fetch controller re-runs on every published value.

use crate::colorize::error::{DisplayError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// A genomic interval currently visible in the view (one content block)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default)]
    pub assembly_name: String,
    pub ref_name: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(
        assembly_name: impl Into<String>,
        ref_name: impl Into<String>,
        start: u64,
        end: u64,
    ) -> Self {
        Region {
            assembly_name: assembly_name.into(),
            ref_name: ref_name.into(),
            start,
            end,
        }
    }
}

impl FromStr for Region {
    type Err = DisplayError;

    /// Parse a `refName:start-end` locstring (coordinates may contain commas)
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DisplayError::Config(format!("Invalid region '{}'", s));

        let (ref_name, range) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        let (start, end) = range.split_once('-').ok_or_else(invalid)?;
        let start: u64 = start.replace(',', "").parse().map_err(|_| invalid())?;
        let end: u64 = end.replace(',', "").parse().map_err(|_| invalid())?;

        if ref_name.is_empty() || end < start {
            return Err(invalid());
        }

        Ok(Region::new("", ref_name, start, end))
    }
}

/// Configuration of one track shown in the view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackConfig {
    pub track_id: String,
    /// Remaining configuration slots (`adapter`, `name`, `displays`, ...)
    #[serde(flatten)]
    pub slots: Map<String, Value>,
}

impl TrackConfig {
    pub fn new(track_id: impl Into<String>) -> Self {
        TrackConfig {
            track_id: track_id.into(),
            slots: Map::new(),
        }
    }

    /// Builder-style slot setter
    pub fn with_slot(mut self, key: impl Into<String>, value: Value) -> Self {
        self.slots.insert(key.into(), value);
        self
    }

    /// Read a configuration slot by key
    pub fn get_conf(&self, key: &str) -> Option<&Value> {
        self.slots.get(key)
    }

    /// Session id used to route remote calls for this track
    ///
    /// Calls for the same track share worker-side caches, so the id is
    /// derived from the track identity.
    pub fn rpc_session_id(&self) -> String {
        self.track_id.clone()
    }
}

/// Observable state of the containing view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// False until the view knows its assembly and displayed regions
    pub initialized: bool,
    /// Visible content blocks, in display order
    pub content_blocks: Vec<Region>,
    /// Tracks shown in the view, in display order
    pub tracks: Vec<TrackConfig>,
}

impl ViewState {
    /// A ready view showing `blocks` of a single track
    pub fn ready(blocks: Vec<Region>, track: TrackConfig) -> Self {
        ViewState {
            initialized: true,
            content_blocks: blocks,
            tracks: vec![track],
        }
    }

    /// Look up a shown track by id
    pub fn track(&self, track_id: &str) -> Option<&TrackConfig> {
        self.tracks.iter().find(|t| t.track_id == track_id)
    }
}
