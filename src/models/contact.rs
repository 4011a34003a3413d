use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::format_ts;

#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Record a contact message, one row per email address: a repeat submission
/// from the same address replaces the stored message instead of inserting a
/// second row.
pub async fn upsert(pool: &PgPool, name: &str, email: &str, message: &str) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO contact_messages (name, email, message) VALUES ($1, $2, $3) \
         ON CONFLICT (email) DO UPDATE \
             SET name = excluded.name, message = excluded.message, updated_at = now() \
         RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(message)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// All messages for the admin inbox, most recently touched first.
pub async fn find_all(pool: &PgPool) -> Result<Vec<ContactMessage>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        name: String,
        email: String,
        message: String,
        created_at: chrono::DateTime<chrono::Utc>,
        updated_at: chrono::DateTime<chrono::Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, name, email, message, created_at, updated_at \
         FROM contact_messages ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ContactMessage {
            id: r.id,
            name: r.name,
            email: r.email,
            message: r.message,
            created_at: format_ts(r.created_at),
            updated_at: format_ts(r.updated_at),
        })
        .collect())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
