//! Shared fixtures for gallery-service integration tests
//!
//! Provides image encoders, a multipart body builder and `PostStore`
//! doubles whose view counter fails or never completes.

#![allow(dead_code)]

use async_trait::async_trait;
use gallery_service::config::Config;
use gallery_service::db::{
    InMemoryPostStore, NewPost, PostExport, PostId, PostSummary, StoredImage,
};
use gallery_service::{AppState, PostStore, StoreError, ViewCounter};
use image::{DynamicImage, GrayImage, ImageOutputFormat};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const BOUNDARY: &str = "----gallery-test-boundary";

pub fn encode_png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageOutputFormat::Png)
}

pub fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageOutputFormat::Jpeg(80))
}

fn encode(width: u32, height: u32, format: ImageOutputFormat) -> Vec<u8> {
    let img = DynamicImage::ImageLuma8(GrayImage::new(width, height));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode test image");
    buf
}

/// Build a `multipart/form-data` body with `title` and `image` fields.
///
/// Returns the content type header value and the body.
pub fn multipart_upload(title: &str, file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Multipart body carrying only a title
pub fn multipart_title_only(title: &str) -> (String, Vec<u8>) {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes();
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.app.index_path = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/index.html"));
    config
}

pub fn index_html() -> Vec<u8> {
    std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/index.html")).expect("read index.html")
}

/// App state over `store` with a running view-counter worker
pub fn app_state(store: Arc<dyn PostStore>) -> (AppState, JoinHandle<()>) {
    app_state_with(store, test_config())
}

pub fn app_state_with(store: Arc<dyn PostStore>, config: Config) -> (AppState, JoinHandle<()>) {
    let (counter, worker) = ViewCounter::spawn(store.clone(), config.view_counter.queue_capacity);
    (AppState::new(store, counter, config), worker)
}

/// How a `CounterFaultStore` misbehaves on increments
#[derive(Debug, Clone, Copy)]
pub enum CounterFault {
    Error,
    Hang,
}

/// In-memory store whose view counter is broken
pub struct CounterFaultStore {
    inner: InMemoryPostStore,
    fault: CounterFault,
}

impl CounterFaultStore {
    pub fn new(fault: CounterFault) -> Self {
        Self {
            inner: InMemoryPostStore::new(),
            fault,
        }
    }
}

#[async_trait]
impl PostStore for CounterFaultStore {
    async fn insert_post(&self, post: NewPost) -> Result<PostId, StoreError> {
        self.inner.insert_post(post).await
    }

    async fn increment_view_counter(&self, _delta: i64) -> Result<(), StoreError> {
        match self.fault {
            CounterFault::Error => Err(StoreError::Unavailable("stats table locked".to_string())),
            CounterFault::Hang => std::future::pending().await,
        }
    }

    async fn count_posts(&self) -> Result<i64, StoreError> {
        self.inner.count_posts().await
    }

    async fn read_view_counter(&self) -> Result<Option<i64>, StoreError> {
        self.inner.read_view_counter().await
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>, StoreError> {
        self.inner.list_posts().await
    }

    async fn list_exports(&self) -> Result<Vec<PostExport>, StoreError> {
        self.inner.list_exports().await
    }

    async fn get_post_image(&self, id: PostId) -> Result<Option<StoredImage>, StoreError> {
        self.inner.get_post_image(id).await
    }
}

/// Store whose every operation fails
pub struct UnavailableStore;

#[async_trait]
impl PostStore for UnavailableStore {
    async fn insert_post(&self, _post: NewPost) -> Result<PostId, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn increment_view_counter(&self, _delta: i64) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn count_posts(&self) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn read_view_counter(&self) -> Result<Option<i64>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn list_exports(&self) -> Result<Vec<PostExport>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get_post_image(&self, _id: PostId) -> Result<Option<StoredImage>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
