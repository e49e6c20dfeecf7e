//! Render-state composition
//!
//! Final props = base props, with `notReady` and `config` replaced:
//! - `config` is the base renderer configuration with its color slot set
//!   to the compiled expression
//! - `notReady` is the base flag OR "no feature snapshot yet"

use crate::host::{BaseRenderProps, RendererConfig};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Props handed to the rendering component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderProps {
    /// Base display props, passed through
    #[serde(flatten)]
    pub props: Map<String, Value>,
    /// Rendering must not start while this is set
    #[serde(rename = "notReady")]
    pub not_ready: bool,
    /// Renderer configuration carrying the color expression
    pub config: Arc<RendererConfig>,
}

/// Copy of `base` with `slot` holding `expression`
pub fn color_renderer_config(base: &RendererConfig, slot: &str, expression: &str) -> RendererConfig {
    base.clone().with_slot(slot, expression)
}

/// Merge base props with the derived configuration and readiness
pub fn compose_render_props(
    base: BaseRenderProps,
    config: Arc<RendererConfig>,
    feats_present: bool,
) -> RenderProps {
    let BaseRenderProps {
        not_ready,
        mut props,
    } = base;
    // Overridden below; drop base copies so serialization has one of each
    props.remove("notReady");
    props.remove("config");

    RenderProps {
        props,
        not_ready: not_ready || !feats_present,
        config,
    }
}
