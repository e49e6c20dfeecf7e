//! Colorize display core
//!
//! Structure:
//! - `palettes.rs`: Generated and named categorical palettes
//! - `categories.rs`: Distinct category values of a feature snapshot
//! - `expression.rs`: Category → color chain compiled to a renderer expression
//! - `state.rs`: Observable display state (features, error)
//! - `fetch.rs`: Reactive fetch controller keeping the state in step with the view
//! - `render.rs`: Final render props composition
//! - `display.rs`: The display tying it all together
//! - `registration.rs`: Metadata for the host plugin registry
//! - `error.rs`: Error types

pub mod categories;
pub mod display;
pub mod error;
pub mod expression;
pub mod fetch;
pub mod palettes;
pub mod registration;
pub mod render;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use categories::{extract_categories, Category, MissingAttributePolicy};
pub use display::ColorizeDisplay;
pub use error::{DisplayError, Result};
pub use expression::{compile_color_expression, ExpressionOptions};
pub use fetch::{FetchController, FetchRequest, StaleFetchPolicy};
pub use palettes::{generate_palette, PaletteChoice, Rgb};
pub use registration::{DisplayTypeDescriptor, PluginDescriptor};
pub use render::{compose_render_props, RenderProps};
pub use state::DisplayState;
