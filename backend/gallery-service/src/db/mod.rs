//! Post and view-counter storage
//!
//! `PostStore` is the seam between the HTTP/ingestion code and the
//! relational store. `PgPostStore` backs it with PostgreSQL; `memory`
//! provides an in-process implementation with the same semantics.

pub mod memory;
pub mod post_repo;
pub mod stats_repo;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

pub use memory::InMemoryPostStore;
pub use post_repo::PgPostStore;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Storage-assigned post identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated post ready to be written
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub file_name: String,
    pub image: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostExport {
    pub title: String,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct StoredImage {
    pub image: Bytes,
    pub file_name: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a post atomically and return its new id
    async fn insert_post(&self, post: NewPost) -> Result<PostId, StoreError>;

    /// Add `delta` to the view counter, creating the counter row if needed
    async fn increment_view_counter(&self, delta: i64) -> Result<(), StoreError>;

    async fn count_posts(&self) -> Result<i64, StoreError>;

    /// Current view count, `None` before the first bump
    async fn read_view_counter(&self) -> Result<Option<i64>, StoreError>;

    /// All posts, newest first
    async fn list_posts(&self) -> Result<Vec<PostSummary>, StoreError>;

    /// Title and file name of every post
    async fn list_exports(&self) -> Result<Vec<PostExport>, StoreError>;

    async fn get_post_image(&self, id: PostId) -> Result<Option<StoredImage>, StoreError>;
}

/// Open a PostgreSQL pool
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.url)
        .await
}
