//! Compiles a category → color assignment into a renderer color expression
//!
//! The output is an if/else-if chain in the renderer's expression language:
//!
//! ```text
//! jexl:get(feature,'name')=='gene1'?'#b83d3d':get(feature,'name')=='gene2'?'#5cd6d6':'black'
//! ```
//!
//! The renderer evaluates predicates left to right and the first match
//! wins. The text is never evaluated here. Equal inputs always compile to
//! byte-identical text because the renderer caches by expression.
//!
//! The fallback is emitted as a quoted string literal (`'black'`), not as the
//! bare identifier `black` older versions of this display produced. A bare
//! identifier is a context lookup in the expression language and evaluates
//! to undefined. Booleans, `null` and the feature getter stay bare.

use super::categories::Category;
use super::palettes::{format_hex_color, Rgb};

/// Settings that shape the compiled expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionOptions {
    /// Feature attribute compared in every predicate
    pub attribute: String,
    /// Color used when no predicate matches
    pub fallback_color: String,
    /// Marker telling the renderer the slot holds an expression
    pub prefix: String,
}

impl Default for ExpressionOptions {
    fn default() -> Self {
        ExpressionOptions {
            attribute: "name".to_string(),
            fallback_color: "black".to_string(),
            prefix: "jexl:".to_string(),
        }
    }
}

/// Build the conditional color expression
///
/// Category `i` maps to `palette[i % palette.len()]`. An empty palette
/// sends every category to the fallback color.
pub fn compile_color_expression(
    categories: &[Category],
    palette: &[Rgb],
    options: &ExpressionOptions,
) -> String {
    let mut expr = options.prefix.clone();
    if palette.is_empty() {
        write_string_literal(&mut expr, &options.fallback_color);
        return expr;
    }

    let getter = format!("get(feature,{})", string_literal(&options.attribute));
    for (i, category) in categories.iter().enumerate() {
        expr.push_str(&getter);
        match category {
            Category::Value(value) => {
                expr.push_str("==");
                write_string_literal(&mut expr, value);
            }
            Category::Flag(b) => {
                expr.push_str("==");
                expr.push_str(if *b { "true" } else { "false" });
            }
            Category::Missing => expr.push_str("==null"),
        }
        expr.push('?');
        write_string_literal(&mut expr, &format_hex_color(palette[i % palette.len()]));
        expr.push(':');
    }
    write_string_literal(&mut expr, &options.fallback_color);

    expr
}

/// Quote `value` as a single-quoted literal, escaping `\` and `'`
fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    write_string_literal(&mut out, value);
    out
}

fn write_string_literal(out: &mut String, value: &str) {
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' | '\'' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('\'');
}

/// Color the compiled expression assigns to `category`, if any
///
/// Mirrors the positional assignment without parsing the expression text.
pub fn color_for(categories: &[Category], palette: &[Rgb], category: &Category) -> Option<Rgb> {
    if palette.is_empty() {
        return None;
    }
    categories
        .iter()
        .position(|c| c == category)
        .map(|i| palette[i % palette.len()])
}
