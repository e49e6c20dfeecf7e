//! The colorize display
//!
//! Wraps a base display and layers feature coloring on top of it:
//! - owns the observable `DisplayState` (latest features + error)
//! - runs the fetch controller while attached to a view
//! - derives the color assignment and renderer configuration from the
//!   current snapshot, memoized until the snapshot changes
//! - composes the final render props from the base display's props

use super::error::DisplayError;
use super::fetch::FetchController;
use super::render::{color_renderer_config, compose_render_props, RenderProps};
use super::state::DisplayState;
use crate::config::DisplayConfig;
use crate::host::{BaseDisplay, Feature, RendererConfig, RpcChannel, ViewState};
use crate::pipeline::ColorAssignment;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info};

/// Derived values for one feature snapshot
struct ColorMemo {
    feats: Option<Arc<[Feature]>>,
    base_config: RendererConfig,
    assignment: Arc<ColorAssignment>,
    renderer_config: Arc<RendererConfig>,
}

impl ColorMemo {
    fn is_current(&self, feats: Option<&Arc<[Feature]>>, base_config: &RendererConfig) -> bool {
        let same_feats = match (&self.feats, feats) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_feats && self.base_config == *base_config
    }
}

/// Display coloring features by a categorical attribute
pub struct ColorizeDisplay<B: BaseDisplay> {
    /// Track this display belongs to; its adapter feeds the fetches
    track_id: String,
    base: B,
    config: DisplayConfig,
    state: Arc<watch::Sender<DisplayState>>,
    controller: Option<FetchController>,
    memo: Mutex<Option<ColorMemo>>,
}

impl<B: BaseDisplay> ColorizeDisplay<B> {
    pub fn new(track_id: impl Into<String>, base: B, config: DisplayConfig) -> Self {
        let (state, _) = watch::channel(DisplayState::default());
        ColorizeDisplay {
            track_id: track_id.into(),
            base,
            config,
            state: Arc::new(state),
            controller: None,
            memo: Mutex::new(None),
        }
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Start fetching features for `view` through `rpc`
    ///
    /// Replaces the controller of a previous attach. Must be called from
    /// within a tokio runtime.
    pub fn attach(&mut self, view: watch::Receiver<ViewState>, rpc: Arc<dyn RpcChannel>) {
        info!(
            track = %self.track_id,
            policy = ?self.config.stale_fetches,
            "attaching colorize display"
        );
        self.controller = Some(FetchController::spawn(
            view,
            self.track_id.clone(),
            rpc,
            self.state.clone(),
            self.config.stale_fetches,
        ));
    }

    /// Stop fetching; state keeps its last value
    pub fn detach(&mut self) {
        if let Some(controller) = self.controller.take() {
            debug!("detaching colorize display");
            controller.stop();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(|controller| !controller.is_finished())
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state.subscribe()
    }

    /// Current state snapshot
    pub fn state(&self) -> DisplayState {
        self.state.borrow().clone()
    }

    pub fn feats(&self) -> Option<Arc<[Feature]>> {
        self.state.borrow().feats().cloned()
    }

    pub fn error(&self) -> Option<DisplayError> {
        self.state.borrow().error().cloned()
    }

    /// Replace the feature snapshot directly
    pub fn set_feats(&self, feats: Vec<Feature>) {
        self.state.send_modify(|state| state.set_feats(feats));
    }

    /// Record an error directly
    pub fn set_error(&self, error: DisplayError) {
        self.state.send_modify(|state| state.set_error(error));
    }

    /// Colors for the current snapshot
    pub fn color_assignment(&self) -> Arc<ColorAssignment> {
        self.with_memo(|memo| memo.assignment.clone())
    }

    /// Base renderer configuration with the color slot replaced
    pub fn renderer_config(&self) -> Arc<RendererConfig> {
        self.with_memo(|memo| memo.renderer_config.clone())
    }

    /// Props for the rendering component
    pub fn render_props(&self) -> RenderProps {
        let feats_present = self.state.borrow().feats().is_some();
        compose_render_props(self.base.render_props(), self.renderer_config(), feats_present)
    }

    fn with_memo<T>(&self, f: impl FnOnce(&ColorMemo) -> T) -> T {
        let feats = self.feats();
        let base_config = self.base.renderer_config();

        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = memo
            .as_ref()
            .filter(|m| m.is_current(feats.as_ref(), &base_config))
        {
            return f(current);
        }

        let assignment = match &feats {
            Some(feats) => ColorAssignment::from_features(feats, &self.config),
            None => ColorAssignment::empty(&self.config),
        };
        let renderer_config = color_renderer_config(
            &base_config,
            &self.config.color_slot,
            &assignment.expression,
        );
        let fresh = ColorMemo {
            feats,
            base_config,
            assignment: Arc::new(assignment),
            renderer_config: Arc::new(renderer_config),
        };
        let out = f(&fresh);
        *memo = Some(fresh);
        out
    }
}

impl<B: BaseDisplay> Drop for ColorizeDisplay<B> {
    fn drop(&mut self) {
        self.detach();
    }
}
