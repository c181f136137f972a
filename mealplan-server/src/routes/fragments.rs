//! HTMX fragment endpoints for editing the recipe form in place.
//!
//! Every request carries the complete form, current fields and `original_`
//! baseline alike, and every response is HTML to swap in.
use axum::{
    extract::{Path, Query},
    Form,
};
use mealplan::reconcile::{self, ListEdit, ListEditError, ListUpdate};
use mealplan::{parse_recipe_draft, FormFields, ListKind, RangeField, Side, ValidationError};
use minijinja::context;
use serde::Deserialize;

use crate::errors::FragmentOutcome;
use crate::render::{self, QuantityView};

const INVALID_FIELDS: &str = "Please check your recipe fields - there may be invalid values.";
const INVERTED_RANGE: &str = "Max quantity cannot be less than min quantity.";

pub async fn add_ingredient(Form(fields): Form<Vec<(String, String)>>) -> FragmentOutcome {
    list_edit(fields.into(), ListKind::Ingredients, ListEdit::Add)
}

pub async fn add_instruction(Form(fields): Form<Vec<(String, String)>>) -> FragmentOutcome {
    list_edit(fields.into(), ListKind::Instructions, ListEdit::Add)
}

pub async fn delete_ingredient(
    Path(index): Path<usize>,
    Form(fields): Form<Vec<(String, String)>>,
) -> FragmentOutcome {
    list_edit(fields.into(), ListKind::Ingredients, ListEdit::Delete(index))
}

pub async fn delete_instruction(
    Path(index): Path<usize>,
    Form(fields): Form<Vec<(String, String)>>,
) -> FragmentOutcome {
    list_edit(fields.into(), ListKind::Instructions, ListEdit::Delete(index))
}

fn list_edit(form: FormFields, kind: ListKind, edit: ListEdit) -> FragmentOutcome {
    let (validation_message, unexpected_message) = match edit {
        ListEdit::Add => ("Error updating list after add.", "Error processing add request."),
        ListEdit::Delete(_) => (
            "Error updating list after delete. Validation failed.",
            "Error processing delete request.",
        ),
    };
    let rendered = match reconcile::apply_list_edit(&form, kind, edit) {
        Ok(update) => render_list_update(&update).map(FragmentOutcome::Success),
        Err(ListEditError::Validation {
            kind,
            items,
            source,
        }) => {
            tracing::warn!(%kind, "List edit rejected: {}", source);
            render::render(
                "list-update.html.jinja",
                context! {
                    kind => kind,
                    singular => kind.singular(),
                    items => items,
                    error => validation_message,
                },
            )
            .map(FragmentOutcome::ValidationFailure)
        }
    };
    rendered.unwrap_or_else(|err| {
        tracing::error!(%kind, "Rendering list update failed: {:#}", err);
        FragmentOutcome::unexpected(kind.element_id(), unexpected_message)
    })
}

fn render_list_update(update: &ListUpdate) -> Result<String, minijinja::Error> {
    render::render(
        "list-update.html.jinja",
        context! {
            kind => update.kind,
            singular => update.kind.singular(),
            items => update.items(),
            diff => &update.diff,
        },
    )
}

/// Recompute the review diff after any edit that doesn't change list lengths.
pub async fn update_diff(Form(fields): Form<Vec<(String, String)>>) -> FragmentOutcome {
    let form = FormFields::from(fields);
    let rendered = match reconcile::update_diff(&form) {
        Ok(diff) => render::render("diff-update.html.jinja", context! { diff })
            .map(FragmentOutcome::Success),
        Err(err) => {
            tracing::warn!("Cannot diff submitted recipe: {}", err);
            let quantity = inverted_range_section(&form, &err);
            render::render(
                "diff-update.html.jinja",
                context! { error => INVALID_FIELDS, quantity },
            )
            .map(FragmentOutcome::ValidationFailure)
        }
    };
    rendered.unwrap_or_else(|err| {
        tracing::error!("Rendering diff update failed: {:#}", err);
        FragmentOutcome::unexpected("diff-error", "Error updating diff.")
    })
}

/// The quantity section to replace out of band when the error is an inverted range.
fn inverted_range_section(form: &FormFields, err: &ValidationError) -> Option<QuantityView> {
    let ValidationError::InvertedRange { field, .. } = err else {
        return None;
    };
    let current = parse_recipe_draft(form, "");
    Some(QuantityView::from_draft(&current, *field).with_error(INVERTED_RANGE))
}

#[derive(Debug, Deserialize)]
pub struct AdjustQuery {
    changed: Option<String>,
}

impl AdjustQuery {
    fn side(&self) -> Option<Side> {
        self.changed.as_deref().and_then(|side| side.parse().ok())
    }
}

pub async fn adjust_makes(
    Query(query): Query<AdjustQuery>,
    Form(fields): Form<Vec<(String, String)>>,
) -> FragmentOutcome {
    adjust(fields.into(), RangeField::Makes, query.side())
}

pub async fn adjust_servings(
    Query(query): Query<AdjustQuery>,
    Form(fields): Form<Vec<(String, String)>>,
) -> FragmentOutcome {
    adjust(fields.into(), RangeField::Servings, query.side())
}

fn adjust(form: FormFields, field: RangeField, changed: Option<Side>) -> FragmentOutcome {
    let update = reconcile::adjust_quantities(&form, field, changed);
    let quantity = QuantityView::new(field, update.min, update.max, update.unit.clone());
    let rendered = match &update.diff {
        Ok(diff) => render::render(
            "quantity-update.html.jinja",
            context! { quantity, diff },
        )
        .map(FragmentOutcome::Success),
        Err(err) => {
            tracing::warn!(%field, "Quantity adjusted but recipe is invalid: {}", err);
            render::render(
                "quantity-update.html.jinja",
                context! { quantity => quantity.with_error(INVALID_FIELDS) },
            )
            .map(FragmentOutcome::ValidationFailure)
        }
    };
    rendered.unwrap_or_else(|err| {
        tracing::error!(%field, "Rendering quantity update failed: {:#}", err);
        FragmentOutcome::unexpected(
            &format!("{field}-section"),
            "Error updating quantities.",
        )
    })
}
