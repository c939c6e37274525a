//! Run configuration.
//!
//! The [`Recipe`] is the only configuration the pipeline knows about. It is
//! loaded once and passed explicitly to each stage.

mod recipe;

pub use recipe::{RECIPE_FILE, Recipe, TypeSettings};
