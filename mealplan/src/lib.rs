//! Core recipe handling shared by the server and the command line client.
//!
//! Everything in here is synchronous and side-effect free apart from the
//! service traits in [`services`], which are implemented by `mealplan-client`.
pub mod adjust;
pub mod basic_models;
pub mod diff;
pub mod form;
pub mod normalize;
pub mod reconcile;
pub mod services;

pub use adjust::{adjust_range, Side};
pub use basic_models::{ListKind, RangeField, Recipe, RecipeDraft, ValidationError};
pub use diff::{diff, diff_recipes, DiffSegment, RecipeDiff};
pub use form::{parse_recipe_draft, parse_recipe_form, FormFields, ORIGINAL_PREFIX};
pub use normalize::{normalize, NormalizationError};
