use std::collections::HashMap;

use sqlx::PgPool;

use super::types::*;
use crate::errors::AppError;
use crate::models::innovation::{self, make_preview, ImageDisplay};
use crate::models::format_ts;
use crate::storage::{self, BlobStore};

/// Submit a proposed edit for `innovation_id` on behalf of
/// `submitter_profile_id`.
///
/// Preconditions: the payload validates and the submitter owns the target
/// innovation. Every new file is uploaded to the blob store before anything
/// is written to the database; if any upload fails the submission aborts
/// with no request row and the already-written blobs are cleaned up
/// best-effort. On success exactly one pending request row exists and the
/// live innovation and its image set are untouched.
///
/// Two submissions racing on the same innovation both succeed; the review
/// queue holds multiple pending requests per innovation.
pub async fn submit(
    pool: &PgPool,
    blob: &dyn BlobStore,
    innovation_id: i64,
    submitter_profile_id: i64,
    payload: &UpdatePayload,
    new_files: &[NewImageUpload],
) -> Result<i64, AppError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let owner: Option<(i64,)> =
        sqlx::query_as("SELECT profile_id FROM innovations WHERE id = $1")
            .bind(innovation_id)
            .fetch_optional(pool)
            .await?;
    let Some((owner_id,)) = owner else {
        return Err(AppError::NotFound);
    };
    if owner_id != submitter_profile_id {
        return Err(AppError::PermissionDenied("updates.submit".to_string()));
    }

    // Retained keys must already belong to the target innovation.
    if let Some(retained) = &payload.images {
        let existing = innovation::image_keys(pool, innovation_id).await?;
        for key in retained {
            if !existing.contains(key) {
                return Err(AppError::Validation(vec![format!(
                    "Unknown image reference: {key}"
                )]));
            }
        }
    }

    // Upload all new files first; the request row is only written once
    // every blob is safely stored.
    let mut new_keys: Vec<String> = Vec::with_capacity(new_files.len());
    for file in new_files {
        let key = storage::new_key("innovations", &file.file_name);
        if let Err(e) = blob.put(&key, &file.bytes, &file.content_type).await {
            if let Err(cleanup) = blob.delete(&new_keys).await {
                log::warn!("Cleanup after failed upload also failed: {cleanup}");
            }
            return Err(e.into());
        }
        new_keys.push(key);
    }

    // Uploading new files implies an image change even when no existing
    // key was retained.
    let images: Option<Vec<String>> = match (&payload.images, new_keys.is_empty()) {
        (None, true) => None,
        (retained, _) => {
            let mut keys = retained.clone().unwrap_or_default();
            keys.extend(new_keys.iter().cloned());
            Some(keys)
        }
    };

    let mut tx = pool.begin().await?;
    let inserted = async {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO innovation_update_requests \
                 (innovation_id, profile_id, overview, features, potential_application, \
                  unique_value, tiktok_url, instagram_url, youtube_url, facebook_url, \
                  web_url, replace_images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING id",
        )
        .bind(innovation_id)
        .bind(submitter_profile_id)
        .bind(&payload.overview)
        .bind(&payload.features)
        .bind(&payload.potential_application)
        .bind(&payload.unique_value)
        .bind(&payload.tiktok_url)
        .bind(&payload.instagram_url)
        .bind(&payload.youtube_url)
        .bind(&payload.facebook_url)
        .bind(&payload.web_url)
        .bind(images.is_some())
        .fetch_one(&mut *tx)
        .await?;

        if let Some(keys) = &images {
            for key in keys {
                sqlx::query(
                    "INSERT INTO update_request_images (request_id, storage_key) \
                     VALUES ($1, $2)",
                )
                .bind(id)
                .bind(key)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok::<i64, AppError>(id)
    }
    .await;

    match inserted {
        Ok(id) => Ok(id),
        Err(e) => {
            if let Err(cleanup) = blob.delete(&new_keys).await {
                log::warn!("Cleanup after failed submission also failed: {cleanup}");
            }
            Err(e)
        }
    }
}

/// The moderation queue: pending requests joined with the innovation title
/// and submitter name, oldest submission first. Image keys are resolved to
/// public URLs on every call, never persisted.
pub async fn list_pending(
    pool: &PgPool,
    blob: &dyn BlobStore,
) -> Result<Vec<PendingRequest>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        innovation_id: i64,
        innovation_title: String,
        submitter_name: String,
        overview: String,
        replace_images: bool,
        submitted_at: chrono::DateTime<chrono::Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT r.id, r.innovation_id, i.title AS innovation_title, \
                p.full_name AS submitter_name, r.overview, r.replace_images, \
                r.submitted_at \
         FROM innovation_update_requests r \
         JOIN innovations i ON i.id = r.innovation_id \
         JOIN profiles p ON p.id = r.profile_id \
         WHERE r.status = 'pending' \
         ORDER BY r.submitted_at ASC, r.id ASC",
    )
    .fetch_all(pool)
    .await?;

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut images = images_for_requests(pool, blob, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|r| PendingRequest {
            images: images.remove(&r.id).unwrap_or_default(),
            id: r.id,
            innovation_id: r.innovation_id,
            innovation_title: r.innovation_title,
            submitter_name: r.submitter_name,
            overview_preview: make_preview(&r.overview, 120),
            replace_images: r.replace_images,
            submitted_at: format_ts(r.submitted_at),
        })
        .collect())
}

async fn images_for_requests(
    pool: &PgPool,
    blob: &dyn BlobStore,
    request_ids: &[i64],
) -> Result<HashMap<i64, Vec<ImageDisplay>>, AppError> {
    if request_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, String)> = sqlx::query_as(
        "SELECT request_id, storage_key FROM update_request_images \
         WHERE request_id = ANY($1) ORDER BY id ASC",
    )
    .bind(request_ids.to_vec())
    .fetch_all(pool)
    .await?;

    let mut map: HashMap<i64, Vec<ImageDisplay>> = HashMap::new();
    for (request_id, key) in rows {
        map.entry(request_id).or_default().push(ImageDisplay {
            url: blob.public_url(&key),
            storage_key: key,
        });
    }
    Ok(map)
}

pub async fn find_detail(
    pool: &PgPool,
    blob: &dyn BlobStore,
    id: i64,
) -> Result<Option<UpdateRequestDetail>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        innovation_id: i64,
        innovation_title: String,
        submitter_name: String,
        overview: String,
        features: String,
        potential_application: String,
        unique_value: String,
        tiktok_url: Option<String>,
        instagram_url: Option<String>,
        youtube_url: Option<String>,
        facebook_url: Option<String>,
        web_url: Option<String>,
        replace_images: bool,
        status: String,
        submitted_at: chrono::DateTime<chrono::Utc>,
        resolved_at: Option<chrono::DateTime<chrono::Utc>>,
    }

    let row = sqlx::query_as::<_, Row>(
        "SELECT r.id, r.innovation_id, i.title AS innovation_title, \
                p.full_name AS submitter_name, r.overview, r.features, \
                r.potential_application, r.unique_value, r.tiktok_url, \
                r.instagram_url, r.youtube_url, r.facebook_url, r.web_url, \
                r.replace_images, r.status, r.submitted_at, r.resolved_at \
         FROM innovation_update_requests r \
         JOIN innovations i ON i.id = r.innovation_id \
         JOIN profiles p ON p.id = r.profile_id \
         WHERE r.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(r) = row else {
        return Ok(None);
    };

    let mut images = images_for_requests(pool, blob, &[r.id]).await?;
    let images = images.remove(&r.id).unwrap_or_default();

    Ok(Some(UpdateRequestDetail {
        id: r.id,
        innovation_id: r.innovation_id,
        innovation_title: r.innovation_title,
        submitter_name: r.submitter_name,
        payload: UpdatePayload {
            overview: r.overview,
            features: r.features,
            potential_application: r.potential_application,
            unique_value: r.unique_value,
            tiktok_url: r.tiktok_url,
            instagram_url: r.instagram_url,
            youtube_url: r.youtube_url,
            facebook_url: r.facebook_url,
            web_url: r.web_url,
            images: r
                .replace_images
                .then(|| images.iter().map(|i| i.storage_key.clone()).collect()),
        },
        images,
        status: UpdateRequestStatus::parse(&r.status).unwrap_or(UpdateRequestStatus::Pending),
        submitted_at: format_ts(r.submitted_at),
        resolved_at: r.resolved_at.map(format_ts),
    }))
}

/// Approve a pending request: one transaction covering the status flip, the
/// field merge onto the live innovation, and (when requested) the image-set
/// replacement. A request that is not currently pending yields a Conflict
/// and nothing is written.
///
/// Blob deletion of displaced keys cannot join the transaction, so it runs
/// after commit; a failure there leaves an orphan blob, never a dangling
/// database reference.
pub async fn approve(
    pool: &PgPool,
    blob: &dyn BlobStore,
    id: i64,
) -> Result<ApprovalOutcome, AppError> {
    #[derive(sqlx::FromRow)]
    struct Claimed {
        innovation_id: i64,
        overview: String,
        features: String,
        potential_application: String,
        unique_value: String,
        tiktok_url: Option<String>,
        instagram_url: Option<String>,
        youtube_url: Option<String>,
        facebook_url: Option<String>,
        web_url: Option<String>,
        replace_images: bool,
    }

    let mut tx = pool.begin().await?;

    // Claim the request. The status guard closes the race between two
    // concurrent approve calls: only one UPDATE can match 'pending'.
    let claimed = sqlx::query_as::<_, Claimed>(
        "UPDATE innovation_update_requests \
         SET status = 'approved', resolved_at = now() \
         WHERE id = $1 AND status = 'pending' \
         RETURNING innovation_id, overview, features, potential_application, \
                   unique_value, tiktok_url, instagram_url, youtube_url, \
                   facebook_url, web_url, replace_images",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(req) = claimed else {
        let status: Option<(String,)> =
            sqlx::query_as("SELECT status FROM innovation_update_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        return match status {
            Some((s,)) => Err(AppError::Conflict(format!("Request #{id} is already {s}"))),
            None => Err(AppError::NotFound),
        };
    };

    // Full overwrite of the editable fields.
    sqlx::query(
        "UPDATE innovations SET \
             overview = $1, features = $2, potential_application = $3, \
             unique_value = $4, tiktok_url = $5, instagram_url = $6, \
             youtube_url = $7, facebook_url = $8, web_url = $9 \
         WHERE id = $10",
    )
    .bind(&req.overview)
    .bind(&req.features)
    .bind(&req.potential_application)
    .bind(&req.unique_value)
    .bind(&req.tiktok_url)
    .bind(&req.instagram_url)
    .bind(&req.youtube_url)
    .bind(&req.facebook_url)
    .bind(&req.web_url)
    .bind(req.innovation_id)
    .execute(&mut *tx)
    .await?;

    // Image reconciliation: a full replace, only when the payload asked
    // for one. Keys retained by the new set are not displaced.
    let mut displaced: Vec<String> = vec![];
    if req.replace_images {
        let new_keys: Vec<(String,)> = sqlx::query_as(
            "SELECT storage_key FROM update_request_images \
             WHERE request_id = $1 ORDER BY id ASC",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        let new_keys: Vec<String> = new_keys.into_iter().map(|(k,)| k).collect();

        let old_keys: Vec<(String,)> = sqlx::query_as(
            "SELECT storage_key FROM innovation_images WHERE innovation_id = $1",
        )
        .bind(req.innovation_id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM innovation_images WHERE innovation_id = $1")
            .bind(req.innovation_id)
            .execute(&mut *tx)
            .await?;

        for key in &new_keys {
            sqlx::query(
                "INSERT INTO innovation_images (innovation_id, storage_key) \
                 VALUES ($1, $2)",
            )
            .bind(req.innovation_id)
            .bind(key)
            .execute(&mut *tx)
            .await?;
        }

        displaced = old_keys
            .into_iter()
            .map(|(k,)| k)
            .filter(|k| !new_keys.contains(k))
            .collect();
    }

    tx.commit().await?;

    if !displaced.is_empty() {
        if let Err(e) = blob.delete(&displaced).await {
            log::error!("Failed to delete displaced blobs for request {id}: {e}");
        }
    }

    Ok(ApprovalOutcome {
        innovation_id: req.innovation_id,
        displaced_keys: displaced,
    })
}

/// Reject a pending request: flips the status and stamps the resolution
/// time, touching nothing else. Conflict if the request is already
/// resolved.
pub async fn reject(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE innovation_update_requests \
         SET status = 'rejected', resolved_at = now() \
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        let status: Option<(String,)> =
            sqlx::query_as("SELECT status FROM innovation_update_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        return match status {
            Some((s,)) => Err(AppError::Conflict(format!("Request #{id} is already {s}"))),
            None => Err(AppError::NotFound),
        };
    }
    Ok(())
}

/// A submitter's own request history, newest first.
pub async fn list_by_submitter(pool: &PgPool, profile_id: i64) -> Result<Vec<OwnRequest>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        innovation_id: i64,
        innovation_title: String,
        status: String,
        submitted_at: chrono::DateTime<chrono::Utc>,
        resolved_at: Option<chrono::DateTime<chrono::Utc>>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT r.id, r.innovation_id, i.title AS innovation_title, r.status, \
                r.submitted_at, r.resolved_at \
         FROM innovation_update_requests r \
         JOIN innovations i ON i.id = r.innovation_id \
         WHERE r.profile_id = $1 \
         ORDER BY r.submitted_at DESC",
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| OwnRequest {
            id: r.id,
            innovation_id: r.innovation_id,
            innovation_title: r.innovation_title,
            status: UpdateRequestStatus::parse(&r.status).unwrap_or(UpdateRequestStatus::Pending),
            submitted_at: format_ts(r.submitted_at),
            resolved_at: r.resolved_at.map(format_ts),
        })
        .collect())
}

pub async fn count_pending(pool: &PgPool) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM innovation_update_requests WHERE status = 'pending'",
    )
    .fetch_one(pool)
    .await?;
    Ok(count)
}
