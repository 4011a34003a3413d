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
use crate::models::{category, innovation, profile};
use crate::models::innovation::NewInnovation;
use crate::storage::FsBlobStore;
use crate::templates_structs::{
    AdminInnovationFormTemplate, AdminInnovationListTemplate, CategoryOption, OwnerSelect,
    PageContext,
};

#[derive(MultipartForm)]
pub struct InnovationUpload {
    pub csrf_token: Text<String>,
    pub title: Text<String>,
    pub overview: Text<String>,
    pub features: Text<String>,
    pub potential_application: Text<String>,
    pub unique_value: Text<String>,
    pub origin: Option<Text<String>>,
    pub tiktok_url: Option<Text<String>>,
    pub instagram_url: Option<Text<String>>,
    pub youtube_url: Option<Text<String>>,
    pub facebook_url: Option<Text<String>>,
    pub web_url: Option<Text<String>>,
    pub profile_id: Text<i64>,
    pub category_ids: Vec<Text<i64>>,
    #[multipart(limit = "10MB")]
    pub images: Vec<TempFile>,
}

#[derive(serde::Deserialize)]
pub struct RemoveImageForm {
    pub storage_key: String,
    pub csrf_token: String,
}

fn validate_form(form: &InnovationUpload) -> Vec<String> {
    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_required(&form.title, "Title", 200));
    errors.extend(validate::validate_required(&form.overview, "Overview", 5000));
    errors.extend(validate::validate_required(&form.features, "Features", 5000));
    errors.extend(validate::validate_required(
        &form.potential_application,
        "Potential application",
        5000,
    ));
    errors.extend(validate::validate_required(&form.unique_value, "Unique value", 5000));
    for (value, label) in [
        (&form.tiktok_url, "TikTok URL"),
        (&form.instagram_url, "Instagram URL"),
        (&form.youtube_url, "YouTube URL"),
        (&form.facebook_url, "Facebook URL"),
        (&form.web_url, "Website URL"),
    ] {
        if let Some(url) = value {
            errors.extend(validate::validate_optional_url(url, label));
        }
    }
    errors
}

fn new_innovation_from(form: &InnovationUpload) -> NewInnovation {
    NewInnovation {
        title: form.title.trim().to_string(),
        overview: form.overview.trim().to_string(),
        features: form.features.trim().to_string(),
        potential_application: form.potential_application.trim().to_string(),
        unique_value: form.unique_value.trim().to_string(),
        origin: form
            .origin
            .as_ref()
            .map(|t| t.trim().to_string())
            .unwrap_or_default(),
        tiktok_url: optional_text(form.tiktok_url.as_deref()),
        instagram_url: optional_text(form.instagram_url.as_deref()),
        youtube_url: optional_text(form.youtube_url.as_deref()),
        facebook_url: optional_text(form.facebook_url.as_deref()),
        web_url: optional_text(form.web_url.as_deref()),
        profile_id: form.profile_id.0,
    }
}

/// Checkbox and dropdown state for the innovation form.
async fn form_options(
    pool: &PgPool,
    selected_categories: &[i64],
    selected_owner: Option<i64>,
) -> Result<(Vec<CategoryOption>, Vec<OwnerSelect>), AppError> {
    let categories = category::find_all(pool)
        .await?
        .into_iter()
        .map(|c| CategoryOption {
            selected: selected_categories.contains(&c.id),
            id: c.id,
            name: c.name,
        })
        .collect();
    let owners = profile::approved_options(pool)
        .await?
        .into_iter()
        .map(|o| OwnerSelect {
            selected: selected_owner == Some(o.id),
            id: o.id,
            full_name: o.full_name,
        })
        .collect();
    Ok((categories, owners))
}

pub async fn list(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "innovations.manage")?;

    let innovations = innovation::list_all(&pool).await?;

    let tmpl = AdminInnovationListTemplate {
        ctx: PageContext::build(&session)?,
        innovations,
    };
    render(tmpl)
}

pub async fn new_form(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "innovations.manage")?;

    let (categories, owners) = form_options(&pool, &[], None).await?;
    let tmpl = AdminInnovationFormTemplate {
        ctx: PageContext::build(&session)?,
        form_action: "/admin/innovations".to_string(),
        form_title: "Create Innovation".to_string(),
        innovation: None,
        images: vec![],
        categories,
        owners,
        errors: vec![],
    };
    render(tmpl)
}

pub async fn create(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    form: MultipartForm<InnovationUpload>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "innovations.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let errors = validate_form(&form);
    if !errors.is_empty() {
        let selected: Vec<i64> = form.category_ids.iter().map(|t| t.0).collect();
        let (categories, owners) =
            form_options(&pool, &selected, Some(form.profile_id.0)).await?;
        let tmpl = AdminInnovationFormTemplate {
            ctx: PageContext::build(&session)?,
            form_action: "/admin/innovations".to_string(),
            form_title: "Create Innovation".to_string(),
            innovation: None,
            images: vec![],
            categories,
            owners,
            errors,
        };
        return render(tmpl);
    }

    let new = new_innovation_from(&form);
    let id = innovation::create(&pool, &new).await?;

    let uploads = collect_uploads(&form.images)?;
    if !uploads.is_empty() {
        let keys = store_uploads(blob.get_ref(), &uploads, "innovations").await?;
        innovation::add_images(&pool, id, &keys).await?;
    }

    let selected: Vec<i64> = form.category_ids.iter().map(|t| t.0).collect();
    innovation::set_categories(&pool, id, &selected).await?;

    let _ = session.insert("flash", format!("Innovation '{}' was created", new.title));
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/innovations"))
        .finish())
}

pub async fn edit_form(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "innovations.manage")?;

    let id = path.into_inner();
    let detail = innovation::find_detail(&pool, blob.get_ref(), id)
        .await?
        .ok_or(AppError::NotFound)?;

    let selected: Vec<i64> = detail.categories.iter().map(|c| c.id).collect();
    let (categories, owners) =
        form_options(&pool, &selected, Some(detail.innovation.profile_id)).await?;
    let tmpl = AdminInnovationFormTemplate {
        ctx: PageContext::build(&session)?,
        form_action: format!("/admin/innovations/{id}"),
        form_title: "Edit Innovation".to_string(),
        innovation: Some(detail.innovation),
        images: detail.images,
        categories,
        owners,
        errors: vec![],
    };
    render(tmpl)
}

pub async fn update(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
    form: MultipartForm<InnovationUpload>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "innovations.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();

    let errors = validate_form(&form);
    if !errors.is_empty() {
        let detail = innovation::find_detail(&pool, blob.get_ref(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        let selected: Vec<i64> = form.category_ids.iter().map(|t| t.0).collect();
        let (categories, owners) =
            form_options(&pool, &selected, Some(form.profile_id.0)).await?;
        let tmpl = AdminInnovationFormTemplate {
            ctx: PageContext::build(&session)?,
            form_action: format!("/admin/innovations/{id}"),
            form_title: "Edit Innovation".to_string(),
            innovation: Some(detail.innovation),
            images: detail.images,
            categories,
            owners,
            errors,
        };
        return render(tmpl);
    }

    let new = new_innovation_from(&form);
    innovation::update(&pool, id, &new).await?;

    // New uploads extend the image set; removal is a separate action
    let uploads = collect_uploads(&form.images)?;
    if !uploads.is_empty() {
        let keys = store_uploads(blob.get_ref(), &uploads, "innovations").await?;
        innovation::add_images(&pool, id, &keys).await?;
    }

    let selected: Vec<i64> = form.category_ids.iter().map(|t| t.0).collect();
    innovation::set_categories(&pool, id, &selected).await?;

    let _ = session.insert("flash", "Innovation updated");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/innovations"))
        .finish())
}

pub async fn remove_image(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<RemoveImageForm>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "innovations.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();
    innovation::remove_image(&pool, blob.get_ref(), id, &form.storage_key).await?;

    let _ = session.insert("flash", "Image removed");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", format!("/admin/innovations/{id}/edit")))
        .finish())
}

pub async fn delete(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "innovations.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();
    innovation::delete(&pool, blob.get_ref(), id).await?;

    let _ = session.insert("flash", "Innovation deleted");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/innovations"))
        .finish())
}
