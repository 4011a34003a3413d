use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::session::require_permission;
use crate::auth::validate;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::handlers::{collect_uploads, store_uploads};
use crate::models::news;
use crate::storage::{BlobStore, FsBlobStore};
use crate::templates_structs::{AdminNewsFormTemplate, AdminNewsListTemplate, PageContext};

#[derive(MultipartForm)]
pub struct NewsUpload {
    pub csrf_token: Text<String>,
    pub title: Text<String>,
    pub body: Text<String>,
    #[multipart(limit = "10MB")]
    pub image: Option<TempFile>,
}

fn validate_form(form: &NewsUpload) -> Vec<String> {
    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_required(&form.title, "Title", 200));
    errors.extend(validate::validate_required(&form.body, "Body", 20000));
    errors
}

/// Store the optional cover image, returning its key.
async fn store_cover(
    blob: &FsBlobStore,
    image: &Option<TempFile>,
) -> Result<Option<String>, AppError> {
    let Some(file) = image else {
        return Ok(None);
    };
    let uploads = collect_uploads(std::slice::from_ref(file))?;
    if uploads.is_empty() {
        return Ok(None);
    }
    let keys = store_uploads(blob, &uploads, "news").await?;
    Ok(keys.into_iter().next())
}

pub async fn list(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "news.manage")?;

    let items = news::find_all(&pool, blob.get_ref()).await?;

    let tmpl = AdminNewsListTemplate {
        ctx: PageContext::build(&session)?,
        items,
    };
    render(tmpl)
}

pub async fn new_form(session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "news.manage")?;

    let tmpl = AdminNewsFormTemplate {
        ctx: PageContext::build(&session)?,
        form_action: "/admin/news".to_string(),
        form_title: "Create Article".to_string(),
        item: None,
        errors: vec![],
    };
    render(tmpl)
}

pub async fn create(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    form: MultipartForm<NewsUpload>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "news.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let errors = validate_form(&form);
    if !errors.is_empty() {
        let tmpl = AdminNewsFormTemplate {
            ctx: PageContext::build(&session)?,
            form_action: "/admin/news".to_string(),
            form_title: "Create Article".to_string(),
            item: None,
            errors,
        };
        return render(tmpl);
    }

    let image_key = store_cover(blob.get_ref(), &form.image).await?;
    news::create(&pool, form.title.trim(), form.body.trim(), image_key.as_deref()).await?;

    let _ = session.insert("flash", "Article published");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/news"))
        .finish())
}

pub async fn edit_form(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "news.manage")?;

    let id = path.into_inner();
    let item = news::find_by_id(&pool, blob.get_ref(), id)
        .await?
        .ok_or(AppError::NotFound)?;

    let tmpl = AdminNewsFormTemplate {
        ctx: PageContext::build(&session)?,
        form_action: format!("/admin/news/{id}"),
        form_title: "Edit Article".to_string(),
        item: Some(item),
        errors: vec![],
    };
    render(tmpl)
}

pub async fn update(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
    form: MultipartForm<NewsUpload>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "news.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();

    let errors = validate_form(&form);
    if !errors.is_empty() {
        let item = news::find_by_id(&pool, blob.get_ref(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        let tmpl = AdminNewsFormTemplate {
            ctx: PageContext::build(&session)?,
            form_action: format!("/admin/news/{id}"),
            form_title: "Edit Article".to_string(),
            item: Some(item),
            errors,
        };
        return render(tmpl);
    }

    // The previous cover is displaced only when a new file was uploaded
    let old = news::find_by_id(&pool, blob.get_ref(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    let image_key = store_cover(blob.get_ref(), &form.image).await?;

    news::update(&pool, id, form.title.trim(), form.body.trim(), image_key.as_deref()).await?;

    if let (Some(new_key), Some(old_key)) = (&image_key, &old.image_key) {
        if new_key != old_key {
            if let Err(e) = blob.get_ref().delete(std::slice::from_ref(old_key)).await {
                log::error!("Failed to delete replaced news image: {e}");
            }
        }
    }

    let _ = session.insert("flash", "Article updated");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/news"))
        .finish())
}

pub async fn delete(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "news.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    news::delete(&pool, blob.get_ref(), path.into_inner()).await?;

    let _ = session.insert("flash", "Article deleted");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/news"))
        .finish())
}
