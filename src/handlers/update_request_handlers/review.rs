use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::session::require_permission;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::{innovation, update_request};
use crate::storage::FsBlobStore;
use crate::templates_structs::{PageContext, ReviewDetailTemplate, ReviewQueueTemplate};

/// GET /admin/update-requests — the FIFO moderation queue.
pub async fn queue(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "updates.review")?;

    let requests = update_request::list_pending(&pool, blob.get_ref()).await?;

    let tmpl = ReviewQueueTemplate {
        ctx: PageContext::build(&session)?,
        requests,
    };
    render(tmpl)
}

/// GET /admin/update-requests/{id} — proposed edit next to the live record.
pub async fn detail(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "updates.review")?;

    let id = path.into_inner();
    let request = update_request::find_detail(&pool, blob.get_ref(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    let current = innovation::find_detail(&pool, blob.get_ref(), request.innovation_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let tmpl = ReviewDetailTemplate {
        ctx: PageContext::build(&session)?,
        request,
        current,
    };
    render(tmpl)
}

/// POST /admin/update-requests/{id}/approve
pub async fn approve(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "updates.review")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();
    match update_request::approve(&pool, blob.get_ref(), id).await {
        Ok(outcome) => {
            log::info!(
                "Request #{id} approved; innovation {} updated, {} blob(s) displaced",
                outcome.innovation_id,
                outcome.displaced_keys.len()
            );
            let _ = session.insert("flash", format!("Request #{id} approved"));
        }
        Err(AppError::Conflict(msg)) => {
            let _ = session.insert("flash", msg);
        }
        Err(other) => return Err(other),
    }

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/update-requests"))
        .finish())
}

/// POST /admin/update-requests/{id}/reject
pub async fn reject(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "updates.review")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();
    match update_request::reject(&pool, id).await {
        Ok(()) => {
            let _ = session.insert("flash", format!("Request #{id} rejected"));
        }
        Err(AppError::Conflict(msg)) => {
            let _ = session.insert("flash", msg);
        }
        Err(other) => return Err(other),
    }

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/update-requests"))
        .finish())
}
