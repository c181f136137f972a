use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Which of the two editable lists an operation targets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ListKind {
    Ingredients,
    Instructions,
}

impl ListKind {
    /// The form field name carrying one entry of this list.
    pub fn field_name(&self) -> &'static str {
        (*self).into()
    }

    /// The element id of the rendered sortable list.
    pub fn element_id(&self) -> &'static str {
        match self {
            ListKind::Ingredients => "ingredients-list",
            ListKind::Instructions => "instructions-list",
        }
    }

    /// Singular, lowercase name used in routes and messages.
    pub fn singular(&self) -> &'static str {
        match self {
            ListKind::Ingredients => "ingredient",
            ListKind::Instructions => "instruction",
        }
    }
}

/// The two optional quantity ranges a recipe carries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RangeField {
    Makes,
    Servings,
}

impl RangeField {
    pub fn min_key(&self) -> &'static str {
        match self {
            RangeField::Makes => "makes_min",
            RangeField::Servings => "servings_min",
        }
    }

    pub fn max_key(&self) -> &'static str {
        match self {
            RangeField::Makes => "makes_max",
            RangeField::Servings => "servings_max",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RangeField::Makes => "Makes",
            RangeField::Servings => "Serves",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Recipe name must not be empty")]
    EmptyName,
    #[error("Recipe must have at least one ingredient")]
    NoIngredients,
    #[error("Blank {kind} entry at position {index}")]
    BlankEntry { kind: ListKind, index: usize },
    #[error("{field} quantity must be at least 1")]
    ZeroQuantity { field: RangeField },
    #[error("Maximum {field} quantity ({max}) cannot be less than minimum quantity ({min})")]
    InvertedRange { field: RangeField, min: u32, max: u32 },
}

impl ValidationError {
    /// The quantity range this error is about, if any.
    pub fn range_field(&self) -> Option<RangeField> {
        match self {
            ValidationError::ZeroQuantity { field } => Some(*field),
            ValidationError::InvertedRange { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// A recipe as it is being edited: possibly incomplete, possibly invalid.
///
/// This is what forms and the LLM produce. Turn it into a [`Recipe`] to get
/// the validity guarantees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub makes_min: Option<u32>,
    #[serde(default)]
    pub makes_max: Option<u32>,
    #[serde(default)]
    pub makes_unit: Option<String>,
    #[serde(default)]
    pub servings_min: Option<u32>,
    #[serde(default)]
    pub servings_max: Option<u32>,
}

impl RecipeDraft {
    pub fn list(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::Ingredients => &self.ingredients,
            ListKind::Instructions => &self.instructions,
        }
    }

    pub fn list_mut(&mut self, kind: ListKind) -> &mut Vec<String> {
        match kind {
            ListKind::Ingredients => &mut self.ingredients,
            ListKind::Instructions => &mut self.instructions,
        }
    }

    pub fn range(&self, field: RangeField) -> (Option<u32>, Option<u32>) {
        match field {
            RangeField::Makes => (self.makes_min, self.makes_max),
            RangeField::Servings => (self.servings_min, self.servings_max),
        }
    }

    pub fn set_range(&mut self, field: RangeField, min: Option<u32>, max: Option<u32>) {
        match field {
            RangeField::Makes => {
                self.makes_min = min;
                self.makes_max = max;
            }
            RangeField::Servings => {
                self.servings_min = min;
                self.servings_max = max;
            }
        }
    }

    /// Drop entries that are empty or whitespace only, keeping the order of the rest.
    pub fn without_blank_entries(mut self) -> Self {
        self.ingredients.retain(|entry| !entry.trim().is_empty());
        self.instructions.retain(|entry| !entry.trim().is_empty());
        self
    }

    /// The checks that still make sense while lists are mid-edit:
    /// a name, and sane quantity ranges. Blank rows are allowed here.
    pub fn validate_for_edit(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        self.validate_ranges()
    }

    /// Every invariant a stored recipe must hold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_for_edit()?;
        if self.ingredients.is_empty() {
            return Err(ValidationError::NoIngredients);
        }
        for kind in [ListKind::Ingredients, ListKind::Instructions] {
            if let Some(index) = self.list(kind).iter().position(|e| e.trim().is_empty()) {
                return Err(ValidationError::BlankEntry { kind, index });
            }
        }
        Ok(())
    }

    fn validate_ranges(&self) -> Result<(), ValidationError> {
        for field in [RangeField::Makes, RangeField::Servings] {
            let (min, max) = self.range(field);
            if min == Some(0) || max == Some(0) {
                return Err(ValidationError::ZeroQuantity { field });
            }
            if let (Some(min), Some(max)) = (min, max) {
                if max < min {
                    return Err(ValidationError::InvertedRange { field, min, max });
                }
            }
        }
        Ok(())
    }

    /// The canonical markdown rendering. Diffs are computed over this text,
    /// so its layout is part of the contract with stored baselines.
    pub fn markdown(&self) -> String {
        let mut md = format!("# {}\n\n", self.name);
        if let Some(quantity) = quantity_phrase(self.makes_min, self.makes_max) {
            let unit = self
                .makes_unit
                .as_deref()
                .map(str::trim)
                .filter(|unit| !unit.is_empty())
                .unwrap_or("servings");
            md.push_str(&format!("**Makes:** {quantity} {unit}\n\n"));
        }
        if let Some(quantity) = quantity_phrase(self.servings_min, self.servings_max) {
            md.push_str(&format!("**Serves:** {quantity}\n\n"));
        }
        md.push_str("## Ingredients\n");
        for ingredient in &self.ingredients {
            md.push_str(&format!("- {ingredient}\n"));
        }
        if !self.instructions.is_empty() {
            md.push_str("\n## Instructions\n");
            for instruction in &self.instructions {
                md.push_str(&format!("- {instruction}\n"));
            }
        }
        md
    }
}

fn quantity_phrase(min: Option<u32>, max: Option<u32>) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) if min == max => Some(min.to_string()),
        (Some(min), Some(max)) => Some(format!("{min}-{max}")),
        (Some(min), None) => Some(format!("{min}+")),
        (None, Some(max)) => Some(format!("up to {max}")),
        (None, None) => None,
    }
}

/// A recipe that passed [`RecipeDraft::validate`].
///
/// There is no way to mutate it in place, so the invariants hold for as long
/// as the value lives. Deserializing runs the same validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecipeDraft", into = "RecipeDraft")]
pub struct Recipe(RecipeDraft);

impl Recipe {
    pub fn new(draft: RecipeDraft) -> Result<Self, ValidationError> {
        draft.validate()?;
        Ok(Self(draft))
    }

    pub fn as_draft(&self) -> &RecipeDraft {
        &self.0
    }

    pub fn into_draft(self) -> RecipeDraft {
        self.0
    }
}

impl TryFrom<RecipeDraft> for Recipe {
    type Error = ValidationError;

    fn try_from(draft: RecipeDraft) -> Result<Self, Self::Error> {
        Recipe::new(draft)
    }
}

impl From<Recipe> for RecipeDraft {
    fn from(recipe: Recipe) -> Self {
        recipe.0
    }
}

impl Deref for Recipe {
    type Target = RecipeDraft;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
