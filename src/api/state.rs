use std::sync::Arc;

use crate::db::TrackedStore;
use crate::services::MetadataProvider;

/// Shared application state: the two collaborators every handler needs
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TrackedStore>,
    pub provider: Arc<dyn MetadataProvider>,
}

impl AppState {
    pub fn new(store: Arc<dyn TrackedStore>, provider: Arc<dyn MetadataProvider>) -> Self {
        Self { store, provider }
    }
}
