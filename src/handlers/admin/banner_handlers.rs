use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::session::require_permission;
use crate::auth::validate;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::handlers::{collect_uploads, optional_text, store_uploads};
use crate::models::banner;
use crate::storage::FsBlobStore;
use crate::templates_structs::{AdminBannersTemplate, PageContext};

#[derive(MultipartForm)]
pub struct BannerUpload {
    pub csrf_token: Text<String>,
    pub title: Text<String>,
    pub link_url: Option<Text<String>>,
    pub sort_order: Option<Text<i64>>,
    #[multipart(limit = "10MB")]
    pub image: Option<TempFile>,
}

#[derive(serde::Deserialize)]
pub struct ToggleForm {
    pub active: bool,
    pub csrf_token: String,
}

async fn list_page(
    pool: &PgPool,
    blob: &FsBlobStore,
    session: &Session,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let tmpl = AdminBannersTemplate {
        ctx: PageContext::build(session)?,
        banners: banner::find_all(pool, blob).await?,
        errors,
    };
    render(tmpl)
}

pub async fn list(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "banners.manage")?;
    list_page(&pool, blob.get_ref(), &session, vec![]).await
}

pub async fn create(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    form: MultipartForm<BannerUpload>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "banners.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_required(&form.title, "Title", 200));
    if let Some(url) = &form.link_url {
        errors.extend(validate::validate_optional_url(url, "Link URL"));
    }

    let uploads = match &form.image {
        Some(file) => collect_uploads(std::slice::from_ref(file))?,
        None => vec![],
    };
    if uploads.is_empty() {
        errors.push("A banner image is required".to_string());
    }

    if !errors.is_empty() {
        return list_page(&pool, blob.get_ref(), &session, errors).await;
    }

    let keys = store_uploads(blob.get_ref(), &uploads, "banners").await?;
    let image_key = keys.into_iter().next().ok_or_else(|| {
        AppError::Storage(crate::storage::StorageError::NotFound("banner upload".into()))
    })?;

    banner::create(
        &pool,
        form.title.trim(),
        &image_key,
        optional_text(form.link_url.as_deref()).as_deref(),
        form.sort_order.as_ref().map(|t| t.0).unwrap_or(0),
    )
    .await?;

    let _ = session.insert("flash", "Banner added");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/banners"))
        .finish())
}

pub async fn toggle(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<ToggleForm>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "banners.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    banner::set_active(&pool, path.into_inner(), form.active).await?;

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/banners"))
        .finish())
}

pub async fn delete(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "banners.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    banner::delete(&pool, blob.get_ref(), path.into_inner()).await?;

    let _ = session.insert("flash", "Banner deleted");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/banners"))
        .finish())
}
