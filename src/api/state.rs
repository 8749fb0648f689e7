//! API server state

use std::sync::Arc;

use crate::storage::RecipeStore;

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Recipe persistence shared by every request
    pub store: Arc<dyn RecipeStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }
}
