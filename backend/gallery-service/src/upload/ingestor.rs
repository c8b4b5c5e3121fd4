/// Upload ingestion - validates a candidate, then writes it once
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::validator::{self, UploadCandidate, UploadLimits, UploadRejection};
use crate::db::{NewPost, PostId, PostStore, StoreError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Rejected(#[from] UploadRejection),

    #[error("failed to store post: {0}")]
    Storage(#[from] StoreError),
}

pub struct UploadIngestor {
    store: Arc<dyn PostStore>,
    limits: UploadLimits,
}

impl UploadIngestor {
    pub fn new(store: Arc<dyn PostStore>, limits: UploadLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Validate `candidate` and persist it.
    ///
    /// Storage is only contacted once every gate has passed.
    pub async fn ingest(&self, candidate: UploadCandidate) -> Result<PostId, IngestError> {
        let validated = validator::validate(candidate, &self.limits)?;
        let dimensions = validated.dimensions;
        let UploadCandidate {
            title,
            file_name,
            raw_bytes,
            ..
        } = validated.candidate;
        let size = raw_bytes.len();

        let id = self
            .store
            .insert_post(NewPost {
                title,
                file_name,
                image: raw_bytes,
            })
            .await?;

        info!(
            post_id = %id,
            width = dimensions.width,
            height = dimensions.height,
            size,
            "Post created"
        );

        Ok(id)
    }
}
