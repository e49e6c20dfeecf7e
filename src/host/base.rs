//! Base display capability
//!
//! The colorize display does not re-implement feature layout or drawing. It
//! wraps a base display, delegates to it, and only replaces the color slot
//! of the renderer configuration and the readiness flag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Snapshot of a renderer configuration
///
/// Slots are kept in a sorted map so two equal configurations always
/// serialize to identical JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RendererConfig {
    slots: BTreeMap<String, Value>,
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style slot setter
    pub fn with_slot(mut self, slot: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_slot(slot, value);
        self
    }

    pub fn set_slot(&mut self, slot: impl Into<String>, value: impl Into<Value>) {
        self.slots.insert(slot.into(), value.into());
    }

    pub fn get(&self, slot: &str) -> Option<&Value> {
        self.slots.get(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Render properties produced by the base display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseRenderProps {
    /// Base display is not ready to draw (loading, region too large, ...)
    pub not_ready: bool,
    /// All other properties, passed through untouched
    pub props: Map<String, Value>,
}

/// Display whose rendering the colorize display extends
pub trait BaseDisplay: Send + Sync {
    /// Current render properties of the base display
    fn render_props(&self) -> BaseRenderProps;

    /// Current renderer configuration snapshot
    fn renderer_config(&self) -> RendererConfig;
}

/// Base display with fixed props and renderer configuration
///
/// Used when the colorize display runs outside a browser session (the dev
/// harness) and wherever a plain base is enough.
#[derive(Debug, Clone, Default)]
pub struct StaticBaseDisplay {
    pub not_ready: bool,
    pub props: Map<String, Value>,
    pub renderer_config: RendererConfig,
}

impl StaticBaseDisplay {
    pub fn new(renderer_config: RendererConfig) -> Self {
        StaticBaseDisplay {
            not_ready: false,
            props: Map::new(),
            renderer_config,
        }
    }

    /// Builder-style prop setter
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

impl BaseDisplay for StaticBaseDisplay {
    fn render_props(&self) -> BaseRenderProps {
        BaseRenderProps {
            not_ready: self.not_ready,
            props: self.props.clone(),
        }
    }

    fn renderer_config(&self) -> RendererConfig {
        self.renderer_config.clone()
    }
}
