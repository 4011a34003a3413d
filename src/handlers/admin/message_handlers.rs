use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::session::require_permission;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::contact;
use crate::templates_structs::{AdminMessagesTemplate, PageContext};

/// GET /admin/messages — the contact inbox.
pub async fn list(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "admin.access")?;

    let messages = contact::find_all(&pool).await?;

    let tmpl = AdminMessagesTemplate {
        ctx: PageContext::build(&session)?,
        messages,
    };
    render(tmpl)
}

pub async fn delete(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "admin.access")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    contact::delete(&pool, path.into_inner()).await?;

    let _ = session.insert("flash", "Message deleted");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/messages"))
        .finish())
}
