pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AppConfig;
use crate::model::work_item::{FieldChange, ItemId, WorkItem};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// The remote work-item API.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_items(&self) -> Result<Vec<WorkItem>, BackendError>;
    /// Set one field. Repeating the same call is harmless.
    async fn set_field(&self, item_id: ItemId, change: FieldChange) -> Result<(), BackendError>;
    async fn rename_item(&self, item_id: ItemId, title: &str) -> Result<(), BackendError>;
    async fn delete_item(&self, item_id: ItemId) -> Result<(), BackendError>;
}


/// Build the configured backend, if the API location is known.
pub fn create_backend(config: &AppConfig) -> Option<Arc<dyn Backend>> {
    let api = config.api.as_ref()?;
    match rest::RestBackend::new(api) {
        Ok(backend) => Some(Arc::new(backend)),
        Err(e) => {
            tracing::error!(error = %e, "could not build API client");
            None
        }
    }
}
