use std::{path::PathBuf, sync::Arc};

/// Shared across requests. Holds no data: every render pass reloads the
/// tables through [`crate::storage::load`].
#[derive(Clone)]
pub struct AppState {
    pub db_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path: Arc::new(db_path),
        }
    }
}
