//! Registration metadata for the host plugin registry
//!
//! Pure data: the host reads it to list the display type and to compose the
//! configuration schema on top of the base display's schema.

use serde::Serialize;

/// Display type name
pub const DISPLAY_TYPE: &str = "ColorizeDisplay";

/// Base display whose schema and rendering are extended
pub const BASE_DISPLAY_TYPE: &str = "LinearBasicDisplay";

/// Plugin name
pub const PLUGIN_NAME: &str = "ColorizePlugin";

/// Configuration schema composed over a base schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSchemaDescriptor {
    pub name: String,
    pub base_configuration: String,
}

/// Display type entry for the host registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTypeDescriptor {
    pub name: String,
    pub track_type: String,
    pub view_type: String,
    pub config_schema: ConfigSchemaDescriptor,
    /// Display whose rendering component is reused as-is
    pub react_component_from: String,
}

impl DisplayTypeDescriptor {
    /// The colorize display for feature tracks in linear views
    pub fn colorize() -> Self {
        DisplayTypeDescriptor {
            name: DISPLAY_TYPE.to_string(),
            track_type: "FeatureTrack".to_string(),
            view_type: "LinearGenomeView".to_string(),
            config_schema: ConfigSchemaDescriptor {
                name: DISPLAY_TYPE.to_string(),
                base_configuration: BASE_DISPLAY_TYPE.to_string(),
            },
            react_component_from: BASE_DISPLAY_TYPE.to_string(),
        }
    }
}

/// Plugin entry for the host registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
    pub display_types: Vec<DisplayTypeDescriptor>,
}

impl PluginDescriptor {
    pub fn colorize() -> Self {
        PluginDescriptor {
            name: PLUGIN_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            display_types: vec![DisplayTypeDescriptor::colorize()],
        }
    }
}
