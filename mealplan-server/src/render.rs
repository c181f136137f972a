//! Turning recipe state into HTML pages and HTMX fragments.
use mealplan::{RangeField, RecipeDiff, RecipeDraft};
use minijinja::{context, AutoEscape, Value};
use serde::Serialize;

lazy_static::lazy_static! {
    pub static ref TEMPLATES: minijinja::Environment<'static> = {
        let mut env = minijinja::Environment::new();
        for (name, template) in &[
            ("base.html.jinja", include_str!("../templates/base.html.jinja")),
            ("macros.html.jinja", include_str!("../templates/macros.html.jinja")),
            ("index.html.jinja", include_str!("../templates/index.html.jinja")),
            ("extract.html.jinja", include_str!("../templates/extract.html.jinja")),
            ("recipes.html.jinja", include_str!("../templates/recipes.html.jinja")),
            ("recipe-list.html.jinja", include_str!("../templates/recipe-list.html.jinja")),
            ("recipe.html.jinja", include_str!("../templates/recipe.html.jinja")),
            ("recipe-not-found.html.jinja", include_str!("../templates/recipe-not-found.html.jinja")),
            ("edit-form.html.jinja", include_str!("../templates/edit-form.html.jinja")),
            ("list-update.html.jinja", include_str!("../templates/list-update.html.jinja")),
            ("diff-update.html.jinja", include_str!("../templates/diff-update.html.jinja")),
            ("quantity-update.html.jinja", include_str!("../templates/quantity-update.html.jinja")),
            ("fetch-text.html.jinja", include_str!("../templates/fetch-text.html.jinja")),
            ("message.html.jinja", include_str!("../templates/message.html.jinja")),
        ] {
            env.add_template(name, template)
                .expect("Failed to register template");
        }
        // Recipe text is user and LLM supplied; escape everything.
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_filter("markdown", markdown_to_html);
        env
    };
}

/// Render markdown with the `markdown` crate, which does not pass raw HTML through.
fn markdown_to_html(text: String) -> Value {
    Value::from_safe_string(markdown::to_html(&text))
}

pub fn render(name: &str, ctx: Value) -> Result<String, minijinja::Error> {
    TEMPLATES.get_template(name)?.render(ctx)
}

/// One quantity range block of the edit form.
#[derive(Debug, Clone, Serialize)]
pub struct QuantityView {
    pub field: RangeField,
    pub label: &'static str,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub unit: Option<String>,
    pub has_unit: bool,
    pub error: Option<String>,
}

impl QuantityView {
    pub fn new(field: RangeField, min: Option<u32>, max: Option<u32>, unit: Option<String>) -> Self {
        Self {
            field,
            label: field.label(),
            min,
            max,
            unit,
            has_unit: field == RangeField::Makes,
            error: None,
        }
    }

    pub fn from_draft(draft: &RecipeDraft, field: RangeField) -> Self {
        let (min, max) = draft.range(field);
        let unit = match field {
            RangeField::Makes => draft.makes_unit.clone(),
            RangeField::Servings => None,
        };
        Self::new(field, min, max, unit)
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

/// The whole editing area: the form, the hidden baseline, and the review diff.
pub fn edit_form(
    current: &RecipeDraft,
    original: &RecipeDraft,
    diff: &RecipeDiff,
    modification_prompt: &str,
    error: Option<&str>,
) -> Result<String, minijinja::Error> {
    render(
        "edit-form.html.jinja",
        context! {
            current => current,
            original => original,
            diff => diff,
            makes => QuantityView::from_draft(current, RangeField::Makes),
            servings => QuantityView::from_draft(current, RangeField::Servings),
            modification_prompt => modification_prompt,
            error => error,
        },
    )
}

/// A status or error line.
pub fn message(id: &str, class: &str, text: &str) -> Result<String, minijinja::Error> {
    render(
        "message.html.jinja",
        context! { id => id, class => class, message => text },
    )
}
