//! Server-side handling of incremental edits to the recipe form.
//!
//! Every operation re-reads the complete form state, applies one change and
//! recomputes the diff against the baseline carried in the same form. Nothing
//! is remembered between requests.

use tracing::warn;

use crate::adjust::{adjust_range, Side};
use crate::basic_models::{ListKind, RangeField, Recipe, RecipeDraft, ValidationError};
use crate::diff::{diff_recipes, RecipeDiff};
use crate::form::{parse_recipe_draft, parse_recipe_form, FormFields, ORIGINAL_PREFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEdit {
    /// Append one empty entry.
    Add,
    /// Remove the entry at this position.
    Delete(usize),
}

#[derive(Debug, Clone)]
pub struct ListUpdate {
    pub kind: ListKind,
    /// Current recipe state after the edit, blank entries included.
    pub current: RecipeDraft,
    pub original: Recipe,
    pub diff: RecipeDiff,
    /// False when a delete pointed past the end of the list.
    pub applied: bool,
}

impl ListUpdate {
    pub fn items(&self) -> &[String] {
        self.current.list(self.kind)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListEditError {
    #[error("cannot update {kind}: {source}")]
    Validation {
        kind: ListKind,
        /// The list as submitted, so it can still be shown.
        items: Vec<String>,
        #[source]
        source: ValidationError,
    },
}

pub fn apply_list_edit(
    form: &FormFields,
    kind: ListKind,
    edit: ListEdit,
) -> Result<ListUpdate, ListEditError> {
    let mut current = parse_recipe_draft(form, "");
    let submitted = current.list(kind).to_vec();

    let items = current.list_mut(kind);
    let applied = match edit {
        ListEdit::Add => {
            items.push(String::new());
            true
        }
        ListEdit::Delete(index) if index < items.len() => {
            items.remove(index);
            true
        }
        ListEdit::Delete(index) => {
            warn!(%kind, index, len = items.len(), "Delete index out of range");
            false
        }
    };

    let original = current
        .validate_for_edit()
        .and_then(|_| parse_recipe_form(form, ORIGINAL_PREFIX))
        .map_err(|source| ListEditError::Validation {
            kind,
            items: submitted,
            source,
        })?;
    let diff = diff_recipes(&original, &current.clone().without_blank_entries());
    Ok(ListUpdate {
        kind,
        current,
        original,
        diff,
        applied,
    })
}

/// Recompute the diff for the form as submitted.
pub fn update_diff(form: &FormFields) -> Result<RecipeDiff, ValidationError> {
    let current = parse_recipe_form(form, "")?;
    let original = parse_recipe_form(form, ORIGINAL_PREFIX)?;
    Ok(diff_recipes(&original, &current))
}

#[derive(Debug, Clone)]
pub struct RangeUpdate {
    pub field: RangeField,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub unit: Option<String>,
    /// The refreshed diff, or why the rest of the form could not be diffed.
    pub diff: Result<RecipeDiff, ValidationError>,
}

/// Repair one quantity range in the form and recompute the diff.
pub fn adjust_quantities(form: &FormFields, field: RangeField, changed: Option<Side>) -> RangeUpdate {
    let mut current = parse_recipe_draft(form, "");
    let original = parse_recipe_draft(form, ORIGINAL_PREFIX);

    let (min, max) = current.range(field);
    let (original_min, original_max) = original.range(field);
    let (min, max) = adjust_range(min, max, original_min, original_max, changed);
    current.set_range(field, min, max);

    let unit = match field {
        RangeField::Makes => current.makes_unit.clone(),
        RangeField::Servings => None,
    };
    let diff = Recipe::new(current.without_blank_entries()).and_then(|current| {
        let original = Recipe::new(original.without_blank_entries())?;
        Ok(diff_recipes(&original, &current))
    });
    RangeUpdate {
        field,
        min,
        max,
        unit,
        diff,
    }
}
