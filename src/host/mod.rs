//! Host browser collaborators
//!
//! The colorize core never looks anything up by name in a global registry.
//! Everything it needs from the browser is handed to it as one of the typed
//! values or traits in this module.
//!
//! Structure:
//! - `feature.rs`: Feature records produced by the data adapters
//! - `view.rs`: Linear view state (readiness, visible blocks, tracks)
//! - `rpc.rs`: Remote feature call channel
//! - `base.rs`: Base display whose rendering this display extends

pub mod base;
pub mod feature;
pub mod rpc;
pub mod view;

// Re-exports for convenience
pub use base::{BaseDisplay, BaseRenderProps, RendererConfig, StaticBaseDisplay};
pub use feature::Feature;
pub use rpc::{GetFeaturesArgs, RpcChannel, CORE_GET_FEATURES};
pub use view::{Region, TrackConfig, ViewState};
