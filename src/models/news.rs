use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::format_ts;
use crate::models::innovation::make_preview;
use crate::storage::BlobStore;

#[derive(Debug, Clone)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub body_preview: String,
    pub image_url: Option<String>,
    pub image_key: Option<String>,
    pub published_at: String,
}

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    title: String,
    body: String,
    image_key: Option<String>,
    published_at: chrono::DateTime<chrono::Utc>,
}

fn item_from(r: Row, blob: &dyn BlobStore) -> NewsItem {
    NewsItem {
        id: r.id,
        title: r.title,
        body_preview: make_preview(&r.body, 200),
        body: r.body,
        image_url: r.image_key.as_ref().map(|k| blob.public_url(k)),
        image_key: r.image_key,
        published_at: format_ts(r.published_at),
    }
}

pub async fn find_all(pool: &PgPool, blob: &dyn BlobStore) -> Result<Vec<NewsItem>, AppError> {
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, title, body, image_key, published_at FROM news \
         ORDER BY published_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| item_from(r, blob)).collect())
}

pub async fn find_latest(
    pool: &PgPool,
    blob: &dyn BlobStore,
    limit: i64,
) -> Result<Vec<NewsItem>, AppError> {
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, title, body, image_key, published_at FROM news \
         ORDER BY published_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| item_from(r, blob)).collect())
}

pub async fn find_by_id(
    pool: &PgPool,
    blob: &dyn BlobStore,
    id: i64,
) -> Result<Option<NewsItem>, AppError> {
    let row = sqlx::query_as::<_, Row>(
        "SELECT id, title, body, image_key, published_at FROM news WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| item_from(r, blob)))
}

pub async fn create(
    pool: &PgPool,
    title: &str,
    body: &str,
    image_key: Option<&str>,
) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO news (title, body, image_key) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(title)
    .bind(body)
    .bind(image_key)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Update an article. `image_key = None` keeps the stored image.
pub async fn update(
    pool: &PgPool,
    id: i64,
    title: &str,
    body: &str,
    image_key: Option<&str>,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE news SET title = $1, body = $2, image_key = COALESCE($3, image_key) \
         WHERE id = $4",
    )
    .bind(title)
    .bind(body)
    .bind(image_key)
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn delete(pool: &PgPool, blob: &dyn BlobStore, id: i64) -> Result<(), AppError> {
    let image_key: Option<(Option<String>,)> =
        sqlx::query_as("SELECT image_key FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    let Some((image_key,)) = image_key else {
        return Err(AppError::NotFound);
    };

    sqlx::query("DELETE FROM news WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if let Some(key) = image_key {
        if let Err(e) = blob.delete(&[key]).await {
            log::error!("Failed to delete news image for article {id}: {e}");
        }
    }
    Ok(())
}

pub async fn count(pool: &PgPool) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM news")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
