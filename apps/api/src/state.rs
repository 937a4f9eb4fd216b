use std::sync::Arc;

use crate::artifacts::ModelArtifacts;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once before the server starts; never mutated afterwards.
    pub artifacts: Arc<ModelArtifacts>,
}

impl AppState {
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        Self { artifacts }
    }
}
