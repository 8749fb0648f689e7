//! Storage abstraction layer
//!
//! Handlers only see [`RecipeStore`]; the relational backend lives in [`sql`].

use async_trait::async_trait;

use crate::types::Recipe;
use crate::Result;

pub mod sql;

pub use sql::SqlRecipeStore;

/// Recipe persistence
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Read one recipe, failing with `Error::NotFound` if no row has this id
    async fn fetch_by_id(&self, id: i64) -> Result<Recipe>;

    /// Read every recipe; an empty table yields an empty vector
    async fn list(&self) -> Result<Vec<Recipe>>;

    /// Insert a recipe and return it with the id the database assigned
    async fn create(&self, recipe: Recipe) -> Result<Recipe>;

    /// Overwrite the row matching `recipe.id`. Succeeds when nothing matched.
    async fn update(&self, recipe: &Recipe) -> Result<()>;

    /// Remove the row matching `id`. Succeeds when nothing matched.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Round-trip to the database
    async fn ping(&self) -> Result<()>;
}
