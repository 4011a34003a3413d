use sqlx::PgPool;

use crate::errors::AppError;
use crate::storage::BlobStore;

#[derive(Debug, Clone)]
pub struct Banner {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    title: String,
    image_key: String,
    link_url: Option<String>,
    sort_order: i64,
    is_active: bool,
}

fn banner_from(r: Row, blob: &dyn BlobStore) -> Banner {
    Banner {
        id: r.id,
        title: r.title,
        image_url: blob.public_url(&r.image_key),
        link_url: r.link_url,
        sort_order: r.sort_order,
        is_active: r.is_active,
    }
}

const COLS: &str = "id, title, image_key, link_url, sort_order, is_active";

/// Active banners for the home carousel, in display order.
pub async fn find_active(pool: &PgPool, blob: &dyn BlobStore) -> Result<Vec<Banner>, AppError> {
    let rows = sqlx::query_as::<_, Row>(&format!(
        "SELECT {COLS} FROM banners WHERE is_active ORDER BY sort_order ASC, id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| banner_from(r, blob)).collect())
}

/// All banners for the admin list.
pub async fn find_all(pool: &PgPool, blob: &dyn BlobStore) -> Result<Vec<Banner>, AppError> {
    let rows = sqlx::query_as::<_, Row>(&format!(
        "SELECT {COLS} FROM banners ORDER BY sort_order ASC, id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| banner_from(r, blob)).collect())
}

pub async fn create(
    pool: &PgPool,
    title: &str,
    image_key: &str,
    link_url: Option<&str>,
    sort_order: i64,
) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO banners (title, image_key, link_url, sort_order) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(title)
    .bind(image_key)
    .bind(link_url)
    .bind(sort_order)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn set_active(pool: &PgPool, id: i64, active: bool) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE banners SET is_active = $1 WHERE id = $2")
        .bind(active)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn delete(pool: &PgPool, blob: &dyn BlobStore, id: i64) -> Result<(), AppError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT image_key FROM banners WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some((image_key,)) = row else {
        return Err(AppError::NotFound);
    };

    sqlx::query("DELETE FROM banners WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if let Err(e) = blob.delete(&[image_key]).await {
        log::error!("Failed to delete banner image for banner {id}: {e}");
    }
    Ok(())
}
