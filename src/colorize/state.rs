//! Observable state of one colorize display

use super::error::DisplayError;
use crate::host::Feature;
use std::sync::Arc;

/// Latest feature snapshot and error of a display
///
/// Published through a `tokio::sync::watch` channel. `version` increases on
/// every write, including error writes that leave the snapshot alone.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    feats: Option<Arc<[Feature]>>,
    error: Option<DisplayError>,
    version: u64,
}

impl DisplayState {
    /// Feature snapshot of the last successful fetch (None before the first)
    pub fn feats(&self) -> Option<&Arc<[Feature]>> {
        self.feats.as_ref()
    }

    /// Error of the last failed fetch, if any
    pub fn error(&self) -> Option<&DisplayError> {
        self.error.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the snapshot and clear the error slot
    pub fn set_feats(&mut self, feats: Vec<Feature>) {
        self.feats = Some(feats.into());
        self.error = None;
        self.version += 1;
    }

    /// Record a failure; the previous snapshot stays in place
    pub fn set_error(&mut self, error: DisplayError) {
        self.error = Some(error);
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = DisplayState::default();
        assert!(state.feats().is_none());
        assert!(state.error().is_none());
        assert_eq!(state.version(), 0);
    }

    #[test]
    fn test_set_feats_overwrites_and_clears_error() {
        let mut state = DisplayState::default();
        state.set_error(DisplayError::MissingTrack("genes".into()));
        state.set_feats(vec![Feature::new("a")]);
        state.set_feats(vec![Feature::new("b"), Feature::new("c")]);

        assert_eq!(state.feats().map(|f| f.len()), Some(2));
        assert!(state.error().is_none());
        assert_eq!(state.version(), 3);
    }

    #[test]
    fn test_error_keeps_stale_snapshot() {
        let mut state = DisplayState::default();
        state.set_feats(vec![Feature::new("a")]);
        state.set_error(DisplayError::Rpc("worker crashed".into()));

        assert_eq!(state.feats().map(|f| f.len()), Some(1));
        assert_eq!(state.error(), Some(&DisplayError::Rpc("worker crashed".into())));
        assert_eq!(state.version(), 2);
    }
}
