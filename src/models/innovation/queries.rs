use sqlx::PgPool;

use super::types::*;
use crate::errors::AppError;
use crate::models::{category::Category, format_ts};
use crate::storage::BlobStore;

/// Truncate a string to `max_len` chars, appending "..." if truncated.
pub(crate) fn make_preview(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let cut: String = s.chars().take(max_len).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}

#[derive(sqlx::FromRow)]
struct InnovationRow {
    id: i64,
    title: String,
    overview: String,
    features: String,
    potential_application: String,
    unique_value: String,
    origin: String,
    tiktok_url: Option<String>,
    instagram_url: Option<String>,
    youtube_url: Option<String>,
    facebook_url: Option<String>,
    web_url: Option<String>,
    profile_id: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<InnovationRow> for Innovation {
    fn from(r: InnovationRow) -> Self {
        Innovation {
            id: r.id,
            title: r.title,
            overview: r.overview,
            features: r.features,
            potential_application: r.potential_application,
            unique_value: r.unique_value,
            origin: r.origin,
            tiktok_url: r.tiktok_url,
            instagram_url: r.instagram_url,
            youtube_url: r.youtube_url,
            facebook_url: r.facebook_url,
            web_url: r.web_url,
            profile_id: r.profile_id,
            created_at: format_ts(r.created_at),
        }
    }
}

const INNOVATION_COLS: &str = "id, title, overview, features, potential_application, \
     unique_value, origin, tiktok_url, instagram_url, youtube_url, facebook_url, \
     web_url, profile_id, created_at";

pub async fn create(pool: &PgPool, new: &NewInnovation) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO innovations \
             (title, overview, features, potential_application, unique_value, origin, \
              tiktok_url, instagram_url, youtube_url, facebook_url, web_url, profile_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING id",
    )
    .bind(&new.title)
    .bind(&new.overview)
    .bind(&new.features)
    .bind(&new.potential_application)
    .bind(&new.unique_value)
    .bind(&new.origin)
    .bind(&new.tiktok_url)
    .bind(&new.instagram_url)
    .bind(&new.youtube_url)
    .bind(&new.facebook_url)
    .bind(&new.web_url)
    .bind(new.profile_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Full overwrite of the editable fields (direct admin edit).
pub async fn update(pool: &PgPool, id: i64, new: &NewInnovation) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE innovations SET \
             title = $1, overview = $2, features = $3, potential_application = $4, \
             unique_value = $5, origin = $6, tiktok_url = $7, instagram_url = $8, \
             youtube_url = $9, facebook_url = $10, web_url = $11, profile_id = $12 \
         WHERE id = $13",
    )
    .bind(&new.title)
    .bind(&new.overview)
    .bind(&new.features)
    .bind(&new.potential_application)
    .bind(&new.unique_value)
    .bind(&new.origin)
    .bind(&new.tiktok_url)
    .bind(&new.instagram_url)
    .bind(&new.youtube_url)
    .bind(&new.facebook_url)
    .bind(&new.web_url)
    .bind(new.profile_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Delete an innovation, its image rows and update requests (cascade),
/// and every blob those rows referenced.
pub async fn delete(pool: &PgPool, blob: &dyn BlobStore, id: i64) -> Result<(), AppError> {
    let mut keys = image_keys(pool, id).await?;

    // Images proposed by this innovation's update requests disappear with
    // the cascade, so their blobs go too.
    let request_keys: Vec<(String,)> = sqlx::query_as(
        "SELECT ri.storage_key FROM update_request_images ri \
         JOIN innovation_update_requests r ON r.id = ri.request_id \
         WHERE r.innovation_id = $1",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    for (key,) in request_keys {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let result = sqlx::query("DELETE FROM innovations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(e) = blob.delete(&keys).await {
        log::error!("Failed to delete blobs for innovation {id}: {e}");
    }
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Innovation>, AppError> {
    let row = sqlx::query_as::<_, InnovationRow>(&format!(
        "SELECT {INNOVATION_COLS} FROM innovations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Innovation::from))
}

/// Detail page: record + owner name + resolved images + categories.
pub async fn find_detail(
    pool: &PgPool,
    blob: &dyn BlobStore,
    id: i64,
) -> Result<Option<InnovationDetail>, AppError> {
    let Some(innovation) = find_by_id(pool, id).await? else {
        return Ok(None);
    };

    let (owner_name,): (String,) =
        sqlx::query_as("SELECT full_name FROM profiles WHERE id = $1")
            .bind(innovation.profile_id)
            .fetch_one(pool)
            .await?;

    let images = image_keys(pool, id)
        .await?
        .into_iter()
        .map(|key| ImageDisplay {
            url: blob.public_url(&key),
            storage_key: key,
        })
        .collect();

    let categories = categories_of(pool, id).await?;

    Ok(Some(InnovationDetail {
        innovation,
        owner_name,
        images,
        categories,
    }))
}

#[derive(sqlx::FromRow)]
struct CardRow {
    id: i64,
    title: String,
    overview: String,
    origin: String,
    owner_name: String,
    cover_key: Option<String>,
}

fn card_from(r: CardRow, blob: &dyn BlobStore) -> InnovationCard {
    InnovationCard {
        id: r.id,
        title: r.title,
        overview_preview: make_preview(&r.overview, 160),
        origin: r.origin,
        owner_name: r.owner_name,
        cover_url: r.cover_key.map(|k| blob.public_url(&k)),
    }
}

const CARD_SELECT: &str = "SELECT i.id, i.title, i.overview, i.origin, \
            p.full_name AS owner_name, \
            (SELECT img.storage_key FROM innovation_images img \
              WHERE img.innovation_id = i.id ORDER BY img.id ASC LIMIT 1) AS cover_key \
     FROM innovations i \
     JOIN profiles p ON p.id = i.profile_id";

/// Public catalog with optional text search and category filter.
pub async fn list(
    pool: &PgPool,
    blob: &dyn BlobStore,
    filter: &CatalogFilter,
) -> Result<Vec<InnovationCard>, AppError> {
    let q = filter
        .q
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    let rows = match (q, filter.category) {
        (Some(pattern), Some(cat)) => {
            sqlx::query_as::<_, CardRow>(&format!(
                "{CARD_SELECT} \
                 JOIN innovation_categories ic ON ic.innovation_id = i.id AND ic.category_id = $2 \
                 WHERE i.title ILIKE $1 OR i.overview ILIKE $1 \
                 ORDER BY i.created_at DESC"
            ))
            .bind(pattern)
            .bind(cat)
            .fetch_all(pool)
            .await?
        }
        (Some(pattern), None) => {
            sqlx::query_as::<_, CardRow>(&format!(
                "{CARD_SELECT} \
                 WHERE i.title ILIKE $1 OR i.overview ILIKE $1 \
                 ORDER BY i.created_at DESC"
            ))
            .bind(pattern)
            .fetch_all(pool)
            .await?
        }
        (None, Some(cat)) => {
            sqlx::query_as::<_, CardRow>(&format!(
                "{CARD_SELECT} \
                 JOIN innovation_categories ic ON ic.innovation_id = i.id AND ic.category_id = $1 \
                 ORDER BY i.created_at DESC"
            ))
            .bind(cat)
            .fetch_all(pool)
            .await?
        }
        (None, None) => {
            sqlx::query_as::<_, CardRow>(&format!(
                "{CARD_SELECT} ORDER BY i.created_at DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(|r| card_from(r, blob)).collect())
}

/// Newest innovations for the home page.
pub async fn list_latest(
    pool: &PgPool,
    blob: &dyn BlobStore,
    limit: i64,
) -> Result<Vec<InnovationCard>, AppError> {
    let rows = sqlx::query_as::<_, CardRow>(&format!(
        "{CARD_SELECT} ORDER BY i.created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| card_from(r, blob)).collect())
}

/// All innovations owned by one profile ("my innovations").
pub async fn list_by_owner(
    pool: &PgPool,
    blob: &dyn BlobStore,
    profile_id: i64,
) -> Result<Vec<InnovationCard>, AppError> {
    let rows = sqlx::query_as::<_, CardRow>(&format!(
        "{CARD_SELECT} WHERE i.profile_id = $1 ORDER BY i.created_at DESC"
    ))
    .bind(profile_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| card_from(r, blob)).collect())
}

/// Admin table of all innovations.
pub async fn list_all(pool: &PgPool) -> Result<Vec<AdminInnovationRow>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        title: String,
        owner_name: String,
        image_count: i64,
        created_at: chrono::DateTime<chrono::Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT i.id, i.title, p.full_name AS owner_name, \
                (SELECT COUNT(*) FROM innovation_images img \
                  WHERE img.innovation_id = i.id) AS image_count, \
                i.created_at \
         FROM innovations i \
         JOIN profiles p ON p.id = i.profile_id \
         ORDER BY i.created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| AdminInnovationRow {
            id: r.id,
            title: r.title,
            owner_name: r.owner_name,
            image_count: r.image_count,
            created_at: format_ts(r.created_at),
        })
        .collect())
}

pub async fn count(pool: &PgPool) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM innovations")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Storage keys of all images attached to an innovation, insertion order.
pub async fn image_keys(pool: &PgPool, id: i64) -> Result<Vec<String>, AppError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT storage_key FROM innovation_images WHERE innovation_id = $1 ORDER BY id ASC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(k,)| k).collect())
}

pub async fn add_images(pool: &PgPool, id: i64, keys: &[String]) -> Result<(), AppError> {
    for key in keys {
        sqlx::query("INSERT INTO innovation_images (innovation_id, storage_key) VALUES ($1, $2)")
            .bind(id)
            .bind(key)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Detach one image from an innovation and delete its blob.
pub async fn remove_image(
    pool: &PgPool,
    blob: &dyn BlobStore,
    innovation_id: i64,
    storage_key: &str,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "DELETE FROM innovation_images WHERE innovation_id = $1 AND storage_key = $2",
    )
    .bind(innovation_id)
    .bind(storage_key)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(e) = blob.delete(&[storage_key.to_string()]).await {
        log::error!("Failed to delete blob {storage_key}: {e}");
    }
    Ok(())
}

/// Replace the category join rows for an innovation.
pub async fn set_categories(pool: &PgPool, id: i64, category_ids: &[i64]) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM innovation_categories WHERE innovation_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    for cat_id in category_ids {
        sqlx::query(
            "INSERT INTO innovation_categories (innovation_id, category_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(cat_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn categories_of(pool: &PgPool, id: i64) -> Result<Vec<Category>, AppError> {
    let rows = sqlx::query_as::<_, Category>(
        "SELECT c.id, c.name, c.description \
         FROM categories c \
         JOIN innovation_categories ic ON ic.category_id = c.id \
         WHERE ic.innovation_id = $1 \
         ORDER BY c.name ASC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::make_preview;

    #[test]
    fn preview_truncates_long_text() {
        let text = "a".repeat(200);
        let preview = make_preview(&text, 160);
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(make_preview("short", 160), "short");
    }

    #[test]
    fn preview_counts_chars_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(make_preview(&text, 20), text);
    }
}
