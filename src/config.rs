//! Display configuration from property values
//!
//! Property definitions and their defaults live in display.json, embedded at
//! compile time. User-set values come in as a flat name → string map (the
//! way the browser hands over a display's configuration slots); an empty
//! string means "not set". Invalid values fall back to the default with a
//! warning instead of failing the display.

use crate::colorize::categories::MissingAttributePolicy;
use crate::colorize::error::{DisplayError, Result};
use crate::colorize::expression::ExpressionOptions;
use crate::colorize::fetch::StaleFetchPolicy;
use crate::colorize::palettes::{PaletteChoice, MAX_DISTINCT_COLORS};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, error, warn};

/// display.json embedded at compile time
const DISPLAY_JSON: &str = include_str!("../display.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PropertyKind {
    #[serde(rename = "StringProperty")]
    String,
    #[serde(rename = "EnumeratedProperty")]
    Enumerated,
}

/// Property definition from display.json
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(rename = "defaultValue", default)]
    pub default_value: String,
    #[serde(default)]
    pub description: String,
    /// For EnumeratedProperty, the valid values
    #[serde(rename = "values", default)]
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct DisplayDefinition {
    properties: Vec<PropertyDef>,
}

/// Registry of all display properties with their defaults
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a display definition (display.json format)
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: DisplayDefinition = serde_json::from_str(json)
            .map_err(|e| DisplayError::Config(format!("Invalid display definition: {}", e)))?;

        let properties = definition
            .properties
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();

        Ok(Self { properties })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    /// Get the property definition
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

/// Global registry instance (initialized lazily)
pub fn registry() -> &'static PropertyRegistry {
    static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(DISPLAY_JSON).unwrap_or_else(|e| {
            error!(error = %e, "failed to load display.json");
            PropertyRegistry::default()
        })
    })
}

/// Typed property reader over user-set values, defaults from display.json
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    pub fn new(values: &HashMap<String, String>) -> Self {
        let user_values = values
            .iter()
            .filter(|(_, v)| !v.is_empty()) // Empty = not set
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { user_values }
    }

    fn default_of(&self, name: &str) -> &'static str {
        registry().get_default(name).unwrap_or_else(|| {
            warn!(property = name, "property not defined in display.json");
            ""
        })
    }

    /// String property, user value or default
    pub fn get_string(&self, name: &str) -> String {
        let value = self
            .user_values
            .get(name)
            .map(String::as_str)
            .unwrap_or_else(|| self.default_of(name));
        debug!(property = name, value, "read property");
        value.to_string()
    }

    /// Enumerated property; values outside the allowed set give the default
    pub fn get_enum(&self, name: &str) -> String {
        let default = self.default_of(name);
        match self.user_values.get(name) {
            Some(value) if registry().is_valid_enum_value(name, value) => value.to_lowercase(),
            Some(value) => {
                warn!(property = name, value = %value, default, "invalid value, using default");
                default.to_string()
            }
            None => default.to_string(),
        }
    }

    /// Non-negative integer property
    pub fn get_usize(&self, name: &str) -> usize {
        let default = self.default_of(name);
        let parse = |v: &str| v.trim().parse::<usize>().ok();
        match self.user_values.get(name) {
            Some(value) => parse(value).unwrap_or_else(|| {
                warn!(property = name, value = %value, default, "invalid integer, using default");
                parse(default).unwrap_or_default()
            }),
            None => parse(default).unwrap_or_default(),
        }
    }
}

/// Configuration of one colorize display
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Feature attribute the categories are read from
    pub category_attribute: String,

    /// Renderer slot replaced by the color expression
    pub color_slot: String,

    /// Color for features matching no category
    pub fallback_color: String,

    /// Marker prepended to the expression (e.g. "jexl:")
    pub expression_prefix: String,

    /// Where the colors come from
    pub palette: PaletteChoice,

    /// Handling of features without the category attribute
    pub missing_attribute: MissingAttributePolicy,

    /// Handling of fetches that resolve after a newer one
    pub stale_fetches: StaleFetchPolicy,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::from_properties(&HashMap::new())
    }
}

impl DisplayConfig {
    /// Build from user-set property values
    pub fn from_properties(values: &HashMap<String, String>) -> Self {
        let props = PropertyReader::new(values);

        let mut max_distinct = props.get_usize("palette.max_distinct");
        if max_distinct == 0 {
            warn!("palette.max_distinct must be positive, using {}", MAX_DISTINCT_COLORS);
            max_distinct = MAX_DISTINCT_COLORS;
        }

        let palette_name = props.get_string("palette");
        let palette = PaletteChoice::parse(&palette_name, max_distinct).unwrap_or_else(|e| {
            warn!(error = %e, "falling back to generated palette");
            PaletteChoice::Generated { max_distinct }
        });

        DisplayConfig {
            category_attribute: props.get_string("category.attribute"),
            color_slot: props.get_string("color.slot"),
            fallback_color: props.get_string("color.fallback"),
            expression_prefix: props.get_string("expression.prefix"),
            palette,
            missing_attribute: MissingAttributePolicy::parse(&props.get_enum("missing.attribute")),
            stale_fetches: StaleFetchPolicy::parse(&props.get_enum("fetch.stale")),
        }
    }

    /// Build from a JSON object of property values
    ///
    /// Non-string JSON values (numbers, booleans) are accepted and converted.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| DisplayError::Config(format!("Invalid configuration JSON: {}", e)))?;

        let values = object
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect();

        Ok(Self::from_properties(&values))
    }

    /// Options for the expression compiler
    pub fn expression_options(&self) -> ExpressionOptions {
        ExpressionOptions {
            attribute: self.category_attribute.clone(),
            fallback_color: self.fallback_color.clone(),
            prefix: self.expression_prefix.clone(),
        }
    }
}
