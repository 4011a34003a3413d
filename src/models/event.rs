use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::format_ts;
use crate::models::innovation::make_preview;
use crate::storage::BlobStore;

#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub description_preview: String,
    pub location: String,
    pub image_url: Option<String>,
    pub starts_at: String,
    pub ends_at: Option<String>,
    /// datetime-local values for the edit form inputs.
    pub starts_at_input: String,
    pub ends_at_input: Option<String>,
    pub upcoming: bool,
}

/// Data for creating or editing an event.
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    title: String,
    description: String,
    location: String,
    image_key: Option<String>,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
}

fn event_from(r: Row, blob: &dyn BlobStore, now: DateTime<Utc>) -> Event {
    Event {
        id: r.id,
        title: r.title,
        description_preview: make_preview(&r.description, 200),
        description: r.description,
        location: r.location,
        image_url: r.image_key.as_ref().map(|k| blob.public_url(k)),
        upcoming: r.starts_at > now,
        starts_at: format_ts(r.starts_at),
        ends_at: r.ends_at.map(format_ts),
        starts_at_input: r.starts_at.format("%Y-%m-%dT%H:%M").to_string(),
        ends_at_input: r
            .ends_at
            .map(|ts| ts.format("%Y-%m-%dT%H:%M").to_string()),
    }
}

const COLS: &str = "id, title, description, location, image_key, starts_at, ends_at";

/// All events, soonest upcoming first, past events last.
pub async fn find_all(pool: &PgPool, blob: &dyn BlobStore) -> Result<Vec<Event>, AppError> {
    let rows = sqlx::query_as::<_, Row>(&format!(
        "SELECT {COLS} FROM events \
         ORDER BY (starts_at < now()) ASC, \
                  CASE WHEN starts_at >= now() THEN starts_at END ASC, \
                  CASE WHEN starts_at < now() THEN starts_at END DESC"
    ))
    .fetch_all(pool)
    .await?;
    let now = Utc::now();
    Ok(rows.into_iter().map(|r| event_from(r, blob, now)).collect())
}

pub async fn find_by_id(
    pool: &PgPool,
    blob: &dyn BlobStore,
    id: i64,
) -> Result<Option<Event>, AppError> {
    let row = sqlx::query_as::<_, Row>(&format!("SELECT {COLS} FROM events WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| event_from(r, blob, Utc::now())))
}

pub async fn create(pool: &PgPool, new: &NewEvent, image_key: Option<&str>) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO events (title, description, location, image_key, starts_at, ends_at) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.location)
    .bind(image_key)
    .bind(new.starts_at)
    .bind(new.ends_at)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Update an event. `image_key = None` keeps the stored image.
pub async fn update(
    pool: &PgPool,
    id: i64,
    new: &NewEvent,
    image_key: Option<&str>,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE events SET title = $1, description = $2, location = $3, \
             image_key = COALESCE($4, image_key), starts_at = $5, ends_at = $6 \
         WHERE id = $7",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.location)
    .bind(image_key)
    .bind(new.starts_at)
    .bind(new.ends_at)
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn delete(pool: &PgPool, blob: &dyn BlobStore, id: i64) -> Result<(), AppError> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT image_key FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    let Some((image_key,)) = row else {
        return Err(AppError::NotFound);
    };

    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if let Some(key) = image_key {
        if let Err(e) = blob.delete(&[key]).await {
            log::error!("Failed to delete event image for event {id}: {e}");
        }
    }
    Ok(())
}

pub async fn count(pool: &PgPool) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
