//! Colorize Display Library
//!
//! Colors the features of a genome browser track by a categorical attribute
//! (the feature name by default) without a hand-written color rule.
//!
//! Module organization:
//! - `host`: the browser-side collaborators (view, track, remote calls, base display)
//! - `colorize`: palette, category, expression, fetch and render-state logic
//! - `config`: display configuration
//! - `pipeline`: features → categories → palette → color expression

pub mod colorize;
pub mod config;
pub mod host;
pub mod pipeline;
