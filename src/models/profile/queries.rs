use sqlx::PgPool;

use super::types::*;
use crate::errors::AppError;
use crate::models::format_ts;

/// Insert an identity record plus its pending profile in one transaction.
/// Returns the new profile id.
pub async fn create_account(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    new: &NewProfile,
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let (user_id,): (i64,) =
        sqlx::query_as("INSERT INTO users (email, password) VALUES ($1, $2) RETURNING id")
            .bind(email)
            .bind(password_hash)
            .fetch_one(&mut *tx)
            .await?;

    let (profile_id,): (i64,) = sqlx::query_as(
        "INSERT INTO profiles (user_id, full_name, phone, institution, bio) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(user_id)
    .bind(&new.full_name)
    .bind(&new.phone)
    .bind(&new.institution)
    .bind(&new.bio)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(profile_id)
}

pub async fn find_auth_by_email(pool: &PgPool, email: &str) -> Result<Option<AuthProfile>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        user_id: i64,
        profile_id: i64,
        email: String,
        password: String,
        full_name: String,
        is_admin: bool,
        status: String,
    }

    let row = sqlx::query_as::<_, Row>(
        "SELECT u.id AS user_id, p.id AS profile_id, u.email, u.password, \
                p.full_name, p.is_admin, p.status \
         FROM users u \
         JOIN profiles p ON p.user_id = u.id \
         WHERE u.email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| AuthProfile {
        user_id: r.user_id,
        profile_id: r.profile_id,
        email: r.email,
        password: r.password,
        full_name: r.full_name,
        is_admin: r.is_admin,
        status: r.status,
    }))
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Profile>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        user_id: i64,
        full_name: String,
        phone: String,
        institution: String,
        bio: String,
        is_admin: bool,
        status: String,
        created_at: chrono::DateTime<chrono::Utc>,
    }

    let row = sqlx::query_as::<_, Row>(
        "SELECT id, user_id, full_name, phone, institution, bio, is_admin, status, created_at \
         FROM profiles WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| Profile {
        id: r.id,
        user_id: r.user_id,
        full_name: r.full_name,
        phone: r.phone,
        institution: r.institution,
        bio: r.bio,
        is_admin: r.is_admin,
        status: r.status,
        created_at: format_ts(r.created_at),
    }))
}

/// Approved innovators with their published innovation counts, for the
/// public directory. Admin accounts are not listed.
pub async fn directory(pool: &PgPool) -> Result<Vec<InnovatorCard>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        full_name: String,
        institution: String,
        bio: String,
        innovation_count: i64,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT p.id, p.full_name, p.institution, p.bio, \
                COUNT(i.id) AS innovation_count \
         FROM profiles p \
         LEFT JOIN innovations i ON i.profile_id = p.id \
         WHERE p.status = 'approved' AND NOT p.is_admin \
         GROUP BY p.id \
         ORDER BY p.full_name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| InnovatorCard {
            id: r.id,
            full_name: r.full_name,
            institution: r.institution,
            bio: r.bio,
            innovation_count: r.innovation_count,
        })
        .collect())
}

/// Registrations awaiting review, oldest first.
pub async fn list_pending(pool: &PgPool) -> Result<Vec<PendingInnovator>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        full_name: String,
        email: String,
        phone: String,
        institution: String,
        created_at: chrono::DateTime<chrono::Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT p.id, p.full_name, u.email, p.phone, p.institution, p.created_at \
         FROM profiles p \
         JOIN users u ON u.id = p.user_id \
         WHERE p.status = 'pending' \
         ORDER BY p.created_at ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| PendingInnovator {
            id: r.id,
            full_name: r.full_name,
            email: r.email,
            phone: r.phone,
            institution: r.institution,
            registered_at: format_ts(r.created_at),
        })
        .collect())
}

/// Approved profiles for the admin "owner" dropdown.
pub async fn approved_options(pool: &PgPool) -> Result<Vec<OwnerOption>, AppError> {
    let rows = sqlx::query_as::<_, OwnerOption>(
        "SELECT id, full_name FROM profiles \
         WHERE status = 'approved' AND NOT is_admin \
         ORDER BY full_name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_pending(pool: &PgPool) -> Result<i64, AppError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM profiles WHERE status = 'pending'")
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Flip a pending registration to approved. Conflict if already resolved.
pub async fn approve(pool: &PgPool, id: i64) -> Result<(), AppError> {
    resolve(pool, id, "approved").await
}

/// Flip a pending registration to rejected. Conflict if already resolved.
pub async fn reject(pool: &PgPool, id: i64) -> Result<(), AppError> {
    resolve(pool, id, "rejected").await
}

async fn resolve(pool: &PgPool, id: i64, status: &str) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE profiles SET status = $1 WHERE id = $2 AND status = 'pending'",
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        return match exists {
            Some(_) => Err(AppError::Conflict(format!(
                "Registration #{id} is already resolved"
            ))),
            None => Err(AppError::NotFound),
        };
    }
    Ok(())
}

/// Create the administrator account on first start if it does not exist.
pub async fn seed_admin(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    full_name: &str,
) -> Result<(), AppError> {
    if find_auth_by_email(pool, email).await?.is_some() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    let (user_id,): (i64,) =
        sqlx::query_as("INSERT INTO users (email, password) VALUES ($1, $2) RETURNING id")
            .bind(email)
            .bind(password_hash)
            .fetch_one(&mut *tx)
            .await?;

    sqlx::query(
        "INSERT INTO profiles (user_id, full_name, is_admin, status) \
         VALUES ($1, $2, TRUE, 'approved')",
    )
    .bind(user_id)
    .bind(full_name)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    log::info!("Seeded admin account {email}");
    Ok(())
}
