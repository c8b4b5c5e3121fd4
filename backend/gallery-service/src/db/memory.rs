//! In-process `PostStore`
//!
//! Keeps posts and the view counter behind a mutex. The counter is kept as a
//! list of rows so the single-row invariant can be observed directly.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use super::{NewPost, PostExport, PostId, PostStore, PostSummary, StoreError, StoredImage};

#[derive(Debug)]
struct StoredPost {
    id: PostId,
    title: String,
    file_name: String,
    image: bytes::Bytes,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    posts: Vec<StoredPost>,
    view_rows: Vec<i64>,
}

#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    inner: Mutex<Inner>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of counter rows ever created
    pub fn view_rows(&self) -> usize {
        self.lock().map(|inner| inner.view_rows.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert_post(&self, post: NewPost) -> Result<PostId, StoreError> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = PostId(inner.next_id);
        inner.posts.push(StoredPost {
            id,
            title: post.title,
            file_name: post.file_name,
            image: post.image,
        });
        Ok(id)
    }

    async fn increment_view_counter(&self, delta: i64) -> Result<(), StoreError> {
        // The guard plays the role of the transaction.
        let mut inner = self.lock()?;
        let mut updated = 0;
        for view in inner.view_rows.iter_mut() {
            *view += delta;
            updated += 1;
        }
        if updated == 0 {
            inner.view_rows.push(delta);
        }
        Ok(())
    }

    async fn count_posts(&self) -> Result<i64, StoreError> {
        Ok(self.lock()?.posts.len() as i64)
    }

    async fn read_view_counter(&self) -> Result<Option<i64>, StoreError> {
        Ok(self.lock()?.view_rows.first().copied())
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .posts
            .iter()
            .rev()
            .map(|p| PostSummary {
                id: p.id,
                title: p.title.clone(),
            })
            .collect())
    }

    async fn list_exports(&self) -> Result<Vec<PostExport>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .posts
            .iter()
            .map(|p| PostExport {
                title: p.title.clone(),
                file_name: p.file_name.clone(),
            })
            .collect())
    }

    async fn get_post_image(&self, id: PostId) -> Result<Option<StoredImage>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.posts.iter().find(|p| p.id == id).map(|p| StoredImage {
            image: p.image.clone(),
            file_name: p.file_name.clone(),
        }))
    }
}
