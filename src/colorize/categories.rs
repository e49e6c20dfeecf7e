//! Distinct category values of a feature collection

use crate::host::Feature;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// A categorical value read from a feature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// String attribute, or a number rendered to text (the renderer's loose
    /// equality matches `3` against `'3'`)
    Value(String),
    /// Boolean attribute, compared as a bare literal
    Flag(bool),
    /// Attribute absent or null
    Missing,
}

impl Category {
    /// Read the category of `feature` from `attribute`
    ///
    /// Arrays and objects never compare equal to a literal in the renderer,
    /// so they give no category and such features keep the fallback color.
    pub fn of(feature: &Feature, attribute: &str) -> Option<Self> {
        match feature.get(attribute) {
            None | Some(Value::Null) => Some(Category::Missing),
            Some(Value::String(s)) => Some(Category::Value(s.clone())),
            Some(Value::Number(n)) => Some(Category::Value(n.to_string())),
            Some(Value::Bool(b)) => Some(Category::Flag(*b)),
            Some(Value::Array(_) | Value::Object(_)) => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Value(v) => f.write_str(v),
            Category::Flag(b) => write!(f, "{}", b),
            Category::Missing => f.write_str("(missing)"),
        }
    }
}

/// What to do with features lacking the category attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingAttributePolicy {
    /// Leave them out of the category list; they get the fallback color
    #[default]
    Skip,
    /// Give them a category of their own
    Bucket,
}

impl MissingAttributePolicy {
    /// Parse from string value (validation happens in the property reader)
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "bucket" => Self::Bucket,
            _ => Self::Skip,
        }
    }
}

/// Distinct categories in first-seen order
pub fn extract_categories(
    features: &[Feature],
    attribute: &str,
    policy: MissingAttributePolicy,
) -> Vec<Category> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();

    for feature in features {
        let Some(category) = Category::of(feature, attribute) else {
            continue;
        };
        if category == Category::Missing && policy == MissingAttributePolicy::Skip {
            continue;
        }
        if seen.insert(category.clone()) {
            categories.push(category);
        }
    }

    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: &str, name: &str) -> Feature {
        Feature::new(id).with_attribute("name", name)
    }

    fn values(categories: &[Category]) -> Vec<String> {
        categories.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_first_seen_order_without_duplicates() {
        let features = vec![
            named("1", "A"),
            named("2", "B"),
            named("3", "A"),
            named("4", "C"),
        ];
        let categories = extract_categories(&features, "name", MissingAttributePolicy::Skip);
        assert_eq!(values(&categories), ["A", "B", "C"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_categories(&[], "name", MissingAttributePolicy::Bucket).is_empty());
    }

    #[test]
    fn test_missing_attribute_skipped() {
        let features = vec![
            Feature::new("0"),
            named("1", "A"),
            Feature::new("2").with_attribute("name", Value::Null),
        ];
        let categories = extract_categories(&features, "name", MissingAttributePolicy::Skip);
        assert_eq!(categories, vec![Category::Value("A".into())]);
    }

    #[test]
    fn test_missing_attribute_bucketed_once() {
        let features = vec![
            named("1", "A"),
            Feature::new("2"),
            Feature::new("3").with_attribute("name", Value::Null),
            named("4", "B"),
        ];
        let categories = extract_categories(&features, "name", MissingAttributePolicy::Bucket);
        assert_eq!(
            categories,
            vec![
                Category::Value("A".into()),
                Category::Missing,
                Category::Value("B".into()),
            ]
        );
    }

    #[test]
    fn test_non_string_values() {
        let features = vec![
            Feature::new("1").with_attribute("score", 3),
            Feature::new("2").with_attribute("score", true),
            Feature::new("3").with_attribute("score", serde_json::json!({"nested": 1})),
            Feature::new("4").with_attribute("score", serde_json::json!([1, 2])),
        ];
        let categories = extract_categories(&features, "score", MissingAttributePolicy::Bucket);
        assert_eq!(
            categories,
            vec![Category::Value("3".into()), Category::Flag(true)]
        );
        assert_eq!(values(&categories), ["3", "true"]);
    }

    #[test]
    fn test_missing_policy_parse() {
        assert_eq!(MissingAttributePolicy::parse("Bucket"), MissingAttributePolicy::Bucket);
        assert_eq!(MissingAttributePolicy::parse("skip"), MissingAttributePolicy::Skip);
        assert_eq!(MissingAttributePolicy::parse("other"), MissingAttributePolicy::Skip);
    }
}
