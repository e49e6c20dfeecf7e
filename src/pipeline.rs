//! Data-to-style pipeline
//!
//! Turns a feature snapshot into the color assignment handed to the
//! renderer:
//! 1. Extract the distinct categories (first-seen order)
//! 2. Take a palette with one color per category
//! 3. Compile the category → color chain into an expression
//!
//! The assignment is rebuilt wholesale from each snapshot, never patched.

use crate::colorize::categories::{extract_categories, Category};
use crate::colorize::expression::{color_for, compile_color_expression};
use crate::colorize::palettes::Rgb;
use crate::config::DisplayConfig;
use crate::host::Feature;
use tracing::debug;

/// Colors assigned to the categories of one feature snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorAssignment {
    pub categories: Vec<Category>,
    pub palette: Vec<Rgb>,
    pub expression: String,
}

impl ColorAssignment {
    /// Run the pipeline over `features`
    pub fn from_features(features: &[Feature], config: &DisplayConfig) -> Self {
        let categories = extract_categories(
            features,
            &config.category_attribute,
            config.missing_attribute,
        );
        let palette = config.palette.palette_for(categories.len());
        let expression =
            compile_color_expression(&categories, &palette, &config.expression_options());

        debug!(
            features = features.len(),
            categories = categories.len(),
            "derived color assignment"
        );

        ColorAssignment {
            categories,
            palette,
            expression,
        }
    }

    /// Assignment for a display without features yet: everything falls back
    pub fn empty(config: &DisplayConfig) -> Self {
        Self::from_features(&[], config)
    }

    /// Color of one category, None if it is not part of the assignment
    pub fn color_of(&self, category: &Category) -> Option<Rgb> {
        color_for(&self.categories, &self.palette, category)
    }

    /// Category → color pairs in predicate order (legend entries)
    pub fn entries(&self) -> impl Iterator<Item = (&Category, Rgb)> + '_ {
        self.categories
            .iter()
            .enumerate()
            .filter_map(|(i, category)| {
                let color = self.palette.get(i % self.palette.len().max(1))?;
                Some((category, *color))
            })
    }
}
