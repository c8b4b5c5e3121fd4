use async_trait::async_trait;
use bytes::Bytes;
use sqlx::{PgPool, Row};

use super::{stats_repo, NewPost, PostExport, PostId, PostStore, PostSummary, StoreError, StoredImage};

/// Insert a new post and return the generated id
pub async fn insert_post(
    pool: &PgPool,
    title: &str,
    image: &[u8],
    file_name: &str,
) -> Result<i64, sqlx::Error> {
    let (id,) = sqlx::query_as::<_, (i64,)>(
        r#"
        INSERT INTO posts (title, image, file_name)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(image)
    .bind(file_name)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Count all posts
pub async fn count_posts(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM posts")
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}

/// List post ids and titles, newest first
pub async fn list_posts(pool: &PgPool) -> Result<Vec<(i64, String)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT id, title
        FROM posts
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// List title and file name of every post
pub async fn list_exports(pool: &PgPool) -> Result<Vec<(String, String)>, sqlx::Error> {
    sqlx::query_as::<_, (String, String)>("SELECT title, file_name FROM posts ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Fetch the image blob and file name of a post
pub async fn find_image(pool: &PgPool, id: i64) -> Result<Option<(Vec<u8>, String)>, sqlx::Error> {
    sqlx::query_as::<_, (Vec<u8>, String)>("SELECT image, file_name FROM posts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// PostgreSQL-backed `PostStore`
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert_post(&self, post: NewPost) -> Result<PostId, StoreError> {
        let id = insert_post(&self.pool, &post.title, &post.image, &post.file_name).await?;
        Ok(PostId(id))
    }

    async fn increment_view_counter(&self, delta: i64) -> Result<(), StoreError> {
        stats_repo::increment_views(&self.pool, delta).await?;
        Ok(())
    }

    async fn count_posts(&self) -> Result<i64, StoreError> {
        Ok(count_posts(&self.pool).await?)
    }

    async fn read_view_counter(&self) -> Result<Option<i64>, StoreError> {
        Ok(stats_repo::read_views(&self.pool).await?)
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>, StoreError> {
        let rows = list_posts(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(id, title)| PostSummary {
                id: PostId(id),
                title,
            })
            .collect())
    }

    async fn list_exports(&self) -> Result<Vec<PostExport>, StoreError> {
        let rows = list_exports(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(title, file_name)| PostExport { title, file_name })
            .collect())
    }

    async fn get_post_image(&self, id: PostId) -> Result<Option<StoredImage>, StoreError> {
        let row = find_image(&self.pool, id.0).await?;
        Ok(row.map(|(image, file_name)| StoredImage {
            image: Bytes::from(image),
            file_name,
        }))
    }
}
