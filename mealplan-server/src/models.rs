use crate::database::{Database, FromRow};
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use mealplan::{Recipe, RecipeDraft};
use rusqlite::{params, types::Type};
use serde::Serialize;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn sqlite_current_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A saved recipe and its bookkeeping columns.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRecipe {
    pub id: i64,
    #[serde(flatten)]
    pub recipe: Recipe,
    pub created_at: String,
    pub updated_at: String,
}

impl FromRow for StoredRecipe {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let draft = RecipeDraft {
            name: row.get("name")?,
            ingredients: json_list(row, "ingredients")?,
            instructions: json_list(row, "instructions")?,
            makes_min: row.get("makes_min")?,
            makes_max: row.get("makes_max")?,
            makes_unit: row.get("makes_unit")?,
            servings_min: row.get("servings_min")?,
            servings_max: row.get("servings_max")?,
        };
        let recipe = Recipe::new(draft).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err))
        })?;
        Ok(Self {
            id: row.get("recipe_id")?,
            recipe,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

fn json_list(row: &rusqlite::Row, column: &str) -> rusqlite::Result<Vec<String>> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))
}

impl StoredRecipe {
    /// Save a new recipe, returning it with its id and timestamps.
    pub fn insert(db: &Database, recipe: &Recipe) -> Result<Self> {
        let conn = db.pool.get()?;
        let now = sqlite_current_timestamp();
        conn.execute(
            "INSERT INTO recipe (name, ingredients, instructions, makes_min, makes_max, makes_unit,
                servings_min, servings_max, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                recipe.name,
                serde_json::to_string(&recipe.ingredients)?,
                serde_json::to_string(&recipe.instructions)?,
                recipe.makes_min,
                recipe.makes_max,
                recipe.makes_unit,
                recipe.servings_min,
                recipe.servings_max,
                now,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(recipe_id = id, "Saved recipe {}", recipe.name);
        Ok(Self {
            id,
            recipe: recipe.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// List all saved recipes, oldest first.
    pub fn list_all(db: &Database) -> Result<Vec<Self>> {
        db.collect_rows("SELECT * FROM recipe ORDER BY recipe_id", params![])
    }

    /// Get a recipe by ID
    pub fn get_by_id(db: &Database, recipe_id: i64) -> Result<Option<Self>> {
        Ok(db
            .collect_rows("SELECT * FROM recipe WHERE recipe_id = ?", params![recipe_id])?
            .pop())
    }

    /// Replace every field of an existing recipe. `None` when there is no such recipe.
    pub fn update(db: &Database, recipe_id: i64, recipe: &Recipe) -> Result<Option<Self>> {
        let changed = db.pool.get()?.execute(
            "UPDATE recipe SET name = ?, ingredients = ?, instructions = ?, makes_min = ?,
                makes_max = ?, makes_unit = ?, servings_min = ?, servings_max = ?, updated_at = ?
                WHERE recipe_id = ?",
            params![
                recipe.name,
                serde_json::to_string(&recipe.ingredients)?,
                serde_json::to_string(&recipe.instructions)?,
                recipe.makes_min,
                recipe.makes_max,
                recipe.makes_unit,
                recipe.servings_min,
                recipe.servings_max,
                sqlite_current_timestamp(),
                recipe_id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get_by_id(db, recipe_id)
    }

    /// Delete a recipe, returning whether it existed.
    pub fn delete(db: &Database, recipe_id: i64) -> Result<bool> {
        let deleted = db
            .pool
            .get()?
            .execute("DELETE FROM recipe WHERE recipe_id = ?", params![recipe_id])?;
        Ok(deleted > 0)
    }

    /// `updated_at` formatted for an HTTP `Last-Modified` header.
    pub fn last_modified(&self) -> Option<String> {
        let naive = NaiveDateTime::parse_from_str(&self.updated_at, TIMESTAMP_FORMAT).ok()?;
        let utc = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);
        Some(utc.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
    }
}
