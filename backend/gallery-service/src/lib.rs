//! Gallery Service
//!
//! Accepts image uploads with a title, stores them as blobs, serves them back
//! by id, lists and exports posts, and keeps a page-view counter.

pub mod config;
pub mod counter;
pub mod db;
pub mod error;
pub mod handlers;
pub mod imaging;
pub mod middleware;
pub mod models;
pub mod upload;

use std::sync::Arc;

// Public re-exports
pub use config::Config;
pub use counter::ViewCounter;
pub use db::{PostStore, StoreError};
pub use error::{AppError, Result};
pub use upload::UploadIngestor;

/// Shared state handed to every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PostStore>,
    pub ingestor: Arc<UploadIngestor>,
    pub view_counter: ViewCounter,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn PostStore>, view_counter: ViewCounter, config: Config) -> Self {
        let ingestor = Arc::new(UploadIngestor::new(store.clone(), config.upload.clone()));
        Self {
            store,
            ingestor,
            view_counter,
            config: Arc::new(config),
        }
    }
}
