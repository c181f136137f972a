use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::basic_models::RecipeDraft;

lazy_static! {
    /// Leading "Step 3:", "2.", "Step4" and similar numbering on instructions.
    static ref STEP_MARKER: Regex =
        Regex::new(r"(?i)^\s*(?:Step\s*\d+|\d+)\s*[:.]?\s*").expect("step marker regex is valid");
}

const TERMINAL_PUNCTUATION: [char; 5] = ['.', '!', '?', ':', ';'];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("Recipe must have at least one valid ingredient after processing.")]
    NoValidIngredients,
}

/// Clean up a recipe as it came out of extraction or modification.
///
/// Entries that become empty are dropped. Normalizing an already normalized
/// recipe returns it unchanged.
pub fn normalize(recipe: &RecipeDraft) -> Result<RecipeDraft, NormalizationError> {
    let ingredients: Vec<String> = recipe
        .ingredients
        .iter()
        .map(|entry| normalize_ingredient(entry))
        .filter(|entry| !entry.is_empty())
        .collect();
    if ingredients.is_empty() {
        return Err(NormalizationError::NoValidIngredients);
    }
    let instructions = recipe
        .instructions
        .iter()
        .map(|entry| normalize_instruction(entry))
        .filter(|entry| !entry.is_empty())
        .collect();
    Ok(RecipeDraft {
        name: normalize_name(&recipe.name),
        ingredients,
        instructions,
        ..recipe.clone()
    })
}

pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_suffix("recipe").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("Recipe").unwrap_or(trimmed);
    close_parenthesis(title_case(trimmed).trim())
}

pub fn normalize_ingredient(entry: &str) -> String {
    let collapsed = entry.split_whitespace().join(" ").replace(" ,", ",");
    close_parenthesis(&collapsed)
}

pub fn normalize_instruction(entry: &str) -> String {
    let decoded = html_escape::decode_html_entities(entry);
    let without_marker = STEP_MARKER.replace(decoded.trim(), "");
    let cleaned = without_marker.replace(" ,", ",").replace(" ;", ";");
    ensure_terminal_punctuation(cleaned.trim())
}

/// Uppercase the first letter of every run of letters, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut previous_cased = false;
    for c in text.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if !cased {
            titled.push(c);
        } else if previous_cased {
            titled.extend(c.to_lowercase());
        } else {
            titled.extend(c.to_uppercase());
        }
        previous_cased = cased;
    }
    titled
}

/// Append ")" when the text opens a parenthesis and never closes one.
fn close_parenthesis(text: &str) -> String {
    if text.contains('(') && !text.contains(')') {
        format!("{text})")
    } else {
        text.to_string()
    }
}

fn ensure_terminal_punctuation(text: &str) -> String {
    let mut tail = text.chars().rev();
    match (tail.next(), tail.next()) {
        (None, _) => String::new(),
        (Some(last), _) if TERMINAL_PUNCTUATION.contains(&last) => text.to_string(),
        (Some(')'), Some(before)) if !TERMINAL_PUNCTUATION.contains(&before) => {
            format!("{}.)", &text[..text.len() - 1])
        }
        (Some(')'), _) => text.to_string(),
        _ => format!("{text}."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, ingredients: &[&str], instructions: &[&str]) -> RecipeDraft {
        RecipeDraft {
            name: name.into(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            instructions: instructions.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_cleanup() {
        assert_eq!(normalize_name("  my awesome cake  "), "My Awesome Cake");
        assert_eq!(normalize_name("Another Example recipe "), "Another Example");
        assert_eq!(normalize_name("Another Example Recipe "), "Another Example");
        assert_eq!(normalize_name("Recipe (unclosed"), "Recipe (Unclosed)");
        assert_eq!(normalize_name("grandma's pie"), "Grandma'S Pie");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_ingredient_cleanup() {
        assert_eq!(normalize_ingredient("  2   cups  flour , sifted "), "2 cups flour, sifted");
        assert_eq!(normalize_ingredient("1 egg (large"), "1 egg (large)");
        assert_eq!(
            normalize_ingredient("1 egg (large) (or 2 small"),
            "1 egg (large) (or 2 small"
        );
        assert_eq!(normalize_ingredient(" \t "), "");
    }

    #[test]
    fn test_instruction_cleanup() {
        let recipe = draft(
            "Test",
            &["flour"],
            &[
                " Step 1: Basic step. ",
                "2. Step with number.",
                "  Step 3 Another step",
                "No number.",
                "  ",
                " Ends with semicolon ;",
                " Has comma , in middle",
            ],
        );
        let normalized = normalize(&recipe).unwrap();
        assert_eq!(
            normalized.instructions,
            vec![
                "Basic step.",
                "Step with number.",
                "Another step.",
                "No number.",
                "Ends with semicolon;",
                "Has comma, in middle.",
            ]
        );
        assert_eq!(normalize_instruction("4. Numbered step"), "Numbered step.");
    }

    #[test]
    fn test_nested_parentheses_are_stable() {
        let recipe = draft("cake (a (b", &["flour (sifted (fine)"], &[]);
        let once = normalize(&recipe).unwrap();
        assert_eq!(once.name, "Cake (A (B)");
        assert_eq!(once.ingredients, vec!["flour (sifted (fine)"]);
        assert_eq!(normalize(&once).unwrap(), once);
    }

    #[test]
    fn test_instruction_entities_and_parentheses() {
        assert_eq!(normalize_instruction("Fold &amp; serve"), "Fold & serve.");
        assert_eq!(normalize_instruction("Bake (about 20 min)"), "Bake (about 20 min.)");
        assert_eq!(normalize_instruction("Bake (really!)"), "Bake (really!)");
        assert_eq!(normalize_instruction("Serve warm!"), "Serve warm!");
        assert_eq!(normalize_instruction("step 12 . Rest"), "Rest.");
    }

    #[test]
    fn test_missing_ingredients_is_an_error() {
        let recipe = draft("Water", &["   ", ""], &["Pour."]);
        assert_eq!(normalize(&recipe), Err(NormalizationError::NoValidIngredients));
    }

    #[test]
    fn test_other_fields_preserved() {
        let mut recipe = draft("bread", &["flour"], &[]);
        recipe.makes_min = Some(2);
        recipe.makes_unit = Some("loaves".into());
        recipe.servings_max = Some(8);
        let normalized = normalize(&recipe).unwrap();
        assert_eq!(normalized.makes_min, Some(2));
        assert_eq!(normalized.makes_unit.as_deref(), Some("loaves"));
        assert_eq!(normalized.servings_max, Some(8));
    }

    #[test]
    fn test_idempotent() {
        let recipe = draft(
            "  the best (chocolate cake recipe",
            &[" 1 cup  sugar ,", "2 eggs (room temp"],
            &["1: Mix &lt;well&gt;", "Bake (350F)", "Cool ;"],
        );
        let once = normalize(&recipe).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_birthday_cake() {
        let recipe = draft(
            "  birthday cake recipe ",
            &["  2 cups   flour ", "", "1 cup sugar ,"],
            &["Step 1: Preheat oven to 350F", "  ", "2. Mix everything (gently"],
        );
        let normalized = normalize(&recipe).unwrap();
        assert_eq!(normalized.name, "Birthday Cake");
        assert_eq!(normalized.ingredients, vec!["2 cups flour", "1 cup sugar,"]);
        assert_eq!(
            normalized.instructions,
            vec!["Preheat oven to 350F.", "Mix everything (gently."]
        );
    }
}
