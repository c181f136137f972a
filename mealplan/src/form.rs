//! Reading recipes out of submitted form fields.
//!
//! The edit form carries the recipe being edited under plain field names and
//! the baseline it is compared against under the same names prefixed with
//! [`ORIGINAL_PREFIX`].

use crate::basic_models::{Recipe, RecipeDraft, ValidationError};

pub const ORIGINAL_PREFIX: &str = "original_";

/// Submitted form fields, keeping repeated keys in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    /// The last value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value submitted under `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }
}

impl From<Vec<(String, String)>> for FormFields {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read whatever recipe state the form holds, without validating it.
///
/// List entries are kept verbatim, blank ones included, so a half-edited list
/// can be rendered back exactly as the user left it.
pub fn parse_recipe_draft(form: &FormFields, prefix: &str) -> RecipeDraft {
    let key = |name: &str| format!("{prefix}{name}");
    let list = |name: &str| form.get_all(&key(name)).map(str::to_string).collect();
    let quantity = |name: &str| parse_quantity(form.get(&key(name)));

    RecipeDraft {
        name: form.get(&key("name")).unwrap_or_default().to_string(),
        ingredients: list("ingredients"),
        instructions: list("instructions"),
        makes_min: quantity("makes_min"),
        makes_max: quantity("makes_max"),
        makes_unit: form
            .get(&key("makes_unit"))
            .map(str::trim)
            .filter(|unit| !unit.is_empty())
            .map(str::to_string),
        servings_min: quantity("servings_min"),
        servings_max: quantity("servings_max"),
    }
}

/// Read a complete recipe from the form. Blank list entries are discarded
/// before validation.
pub fn parse_recipe_form(form: &FormFields, prefix: &str) -> Result<Recipe, ValidationError> {
    Recipe::new(parse_recipe_draft(form, prefix).without_blank_entries())
}

/// Empty or non-numeric input means "not set".
fn parse_quantity(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.trim().parse().ok())
}
