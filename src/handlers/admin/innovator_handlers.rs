use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::session::require_permission;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::profile;
use crate::templates_structs::{AdminInnovatorsTemplate, PageContext};

/// GET /admin/innovators — registrations awaiting approval.
pub async fn pending(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "innovators.review")?;

    let pending = profile::list_pending(&pool).await?;

    let tmpl = AdminInnovatorsTemplate {
        ctx: PageContext::build(&session)?,
        pending,
    };
    render(tmpl)
}

pub async fn approve(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "innovators.review")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();
    match profile::approve(&pool, id).await {
        Ok(()) => {
            let _ = session.insert("flash", format!("Registration #{id} approved"));
        }
        Err(AppError::Conflict(msg)) => {
            let _ = session.insert("flash", msg);
        }
        Err(other) => return Err(other),
    }

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/innovators"))
        .finish())
}

pub async fn reject(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "innovators.review")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();
    match profile::reject(&pool, id).await {
        Ok(()) => {
            let _ = session.insert("flash", format!("Registration #{id} rejected"));
        }
        Err(AppError::Conflict(msg)) => {
            let _ = session.insert("flash", msg);
        }
        Err(other) => return Err(other),
    }

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/innovators"))
        .finish())
}
