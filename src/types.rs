//! Core data types

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A stored recipe.
///
/// `id` is assigned by the database on insert. Request bodies may leave it
/// out or send `null`, in which case it stays 0 until the record is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    #[serde(default, deserialize_with = "null_as_unset")]
    pub id: i64,
    pub title: String,
    pub ingredients: String,
    pub description: String,
}

impl Recipe {
    /// Build an unsaved recipe.
    pub fn new(
        title: impl Into<String>,
        ingredients: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            ingredients: ingredients.into(),
            description: description.into(),
        }
    }

    pub fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }
}

fn null_as_unset<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}
