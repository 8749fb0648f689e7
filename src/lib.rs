//! Recipebox - a small REST service for recipes
//!
//! Five routes map onto five SQL statements against a single `recipes`
//! table. MySQL is the production target; SQLite is supported for local
//! runs and tests.

pub mod api;
pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
