//! Relational storage backend

use async_trait::async_trait;
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::{AnyConnection, AnyPool, Connection};

use crate::config::{is_valid_identifier, DatabaseConfig, DatabaseDriver};
use crate::types::Recipe;
use crate::{Error, Result};

use super::RecipeStore;

const SELECT_ONE: &str = "SELECT id, title, ingredients, description FROM recipes WHERE id = ?";
const SELECT_ALL: &str = "SELECT id, title, ingredients, description FROM recipes ORDER BY id";
const INSERT: &str = "INSERT INTO recipes (title, ingredients, description) VALUES (?, ?, ?)";
const INSERT_RETURNING: &str =
    "INSERT INTO recipes (title, ingredients, description) VALUES (?, ?, ?) RETURNING id";
const UPDATE: &str =
    "UPDATE recipes SET title = ?, ingredients = ?, description = ? WHERE id = ?";
const DELETE: &str = "DELETE FROM recipes WHERE id = ?";

const CREATE_TABLE_MYSQL: &str = r"
CREATE TABLE IF NOT EXISTS recipes
(
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    title VARCHAR(50) NOT NULL,
    ingredients VARCHAR(255) NOT NULL,
    description VARCHAR(255) NOT NULL
)";

const CREATE_TABLE_SQLITE: &str = r"
CREATE TABLE IF NOT EXISTS recipes
(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR(50) NOT NULL,
    ingredients VARCHAR(255) NOT NULL,
    description VARCHAR(255) NOT NULL
)";

/// Recipe store backed by a MySQL or SQLite connection pool
pub struct SqlRecipeStore {
    pool: AnyPool,
    driver: DatabaseDriver,
}

impl SqlRecipeStore {
    /// Open the pool, creating the database (MySQL) and the `recipes` table if absent.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        install_default_drivers();

        if config.driver == DatabaseDriver::Mysql {
            create_database(config).await?;
        }

        let mut options = AnyPoolOptions::new().max_connections(config.max_connections);
        if config.is_in_memory() {
            // Each connection to `sqlite::memory:` opens its own empty database
            options = options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = options.connect(&config.database_url()).await?;

        sqlx::raw_sql(create_table_sql(config.driver))
            .execute(&pool)
            .await?;

        tracing::info!(
            driver = ?config.driver,
            max_connections = config.max_connections,
            "Recipe store ready"
        );

        Ok(Self {
            pool,
            driver: config.driver,
        })
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn create_database(config: &DatabaseConfig) -> Result<()> {
    if !is_valid_identifier(&config.name) {
        return Err(Error::config(format!(
            "invalid database name '{}'",
            config.name
        )));
    }

    let statement = create_database_sql(&config.name);
    let mut conn = AnyConnection::connect(&config.server_url()).await?;
    sqlx::raw_sql(&statement).execute(&mut conn).await?;
    conn.close().await?;

    tracing::debug!(database = %config.name, "Database ensured");
    Ok(())
}

fn create_database_sql(name: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS `{}`", name)
}

fn create_table_sql(driver: DatabaseDriver) -> &'static str {
    match driver {
        DatabaseDriver::Mysql => CREATE_TABLE_MYSQL,
        DatabaseDriver::Sqlite => CREATE_TABLE_SQLITE,
    }
}

#[async_trait]
impl RecipeStore for SqlRecipeStore {
    async fn fetch_by_id(&self, id: i64) -> Result<Recipe> {
        sqlx::query_as::<_, Recipe>(SELECT_ONE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NotFound { id })
    }

    async fn list(&self) -> Result<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;
        Ok(recipes)
    }

    async fn create(&self, recipe: Recipe) -> Result<Recipe> {
        let id = match self.driver {
            DatabaseDriver::Mysql => {
                let result = sqlx::query(INSERT)
                    .bind(&recipe.title)
                    .bind(&recipe.ingredients)
                    .bind(&recipe.description)
                    .execute(&self.pool)
                    .await?;

                // Taken from this statement's own result; a follow-up query could
                // land on another pooled connection.
                result.last_insert_id().ok_or_else(|| {
                    Error::Database(sqlx::Error::Protocol(
                        "driver did not report an inserted id".to_string(),
                    ))
                })?
            }
            // The `Any` SQLite driver never fills in `last_insert_id`
            DatabaseDriver::Sqlite => {
                sqlx::query_scalar::<_, i64>(INSERT_RETURNING)
                    .bind(&recipe.title)
                    .bind(&recipe.ingredients)
                    .bind(&recipe.description)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        tracing::debug!(id, "Recipe created");
        Ok(recipe.with_id(id))
    }

    async fn update(&self, recipe: &Recipe) -> Result<()> {
        let result = sqlx::query(UPDATE)
            .bind(&recipe.title)
            .bind(&recipe.ingredients)
            .bind(&recipe.description)
            .bind(recipe.id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(id = recipe.id, rows = result.rows_affected(), "Recipe updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query(DELETE).bind(id).execute(&self.pool).await?;

        tracing::debug!(id, rows = result.rows_affected(), "Recipe deleted");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
