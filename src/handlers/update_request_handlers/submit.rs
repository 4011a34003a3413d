use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::session::{require_permission, require_profile_id};
use crate::errors::{render, AppError};
use crate::handlers::{collect_uploads, optional_text};
use crate::models::{innovation, update_request};
use crate::models::update_request::UpdatePayload;
use crate::storage::FsBlobStore;
use crate::templates_structs::{PageContext, UpdateRequestFormTemplate};

#[derive(MultipartForm)]
pub struct UpdateRequestUpload {
    pub csrf_token: Text<String>,
    pub overview: Text<String>,
    pub features: Text<String>,
    pub potential_application: Text<String>,
    pub unique_value: Text<String>,
    pub tiktok_url: Option<Text<String>>,
    pub instagram_url: Option<Text<String>>,
    pub youtube_url: Option<Text<String>>,
    pub facebook_url: Option<Text<String>>,
    pub web_url: Option<Text<String>>,
    /// Checkbox: when set, the image set is replaced by the retained keys
    /// plus any uploaded files.
    pub replace_images: Option<Text<String>>,
    /// Existing storage keys the submitter wants to keep.
    pub retain_images: Vec<Text<String>>,
    #[multipart(limit = "10MB")]
    pub images: Vec<TempFile>,
}

/// GET /account/innovations/{id}/update-request
pub async fn form(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "updates.submit")?;
    let profile_id = require_profile_id(&session)?;

    let innovation_id = path.into_inner();
    let detail = innovation::find_detail(&pool, blob.get_ref(), innovation_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // Owners only; the model re-checks on submit
    if detail.innovation.profile_id != profile_id {
        return Err(AppError::PermissionDenied("updates.submit".to_string()));
    }

    let tmpl = UpdateRequestFormTemplate {
        ctx: PageContext::build(&session)?,
        innovation: detail.innovation,
        images: detail.images,
        errors: vec![],
    };
    render(tmpl)
}

/// POST /account/innovations/{id}/update-request
pub async fn submit(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
    form: MultipartForm<UpdateRequestUpload>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "updates.submit")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let profile_id = require_profile_id(&session)?;

    let innovation_id = path.into_inner();

    let retained: Vec<String> = form
        .retain_images
        .iter()
        .map(|t| t.0.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let payload = UpdatePayload {
        overview: form.overview.trim().to_string(),
        features: form.features.trim().to_string(),
        potential_application: form.potential_application.trim().to_string(),
        unique_value: form.unique_value.trim().to_string(),
        tiktok_url: optional_text(form.tiktok_url.as_deref()),
        instagram_url: optional_text(form.instagram_url.as_deref()),
        youtube_url: optional_text(form.youtube_url.as_deref()),
        facebook_url: optional_text(form.facebook_url.as_deref()),
        web_url: optional_text(form.web_url.as_deref()),
        images: form.replace_images.is_some().then_some(retained),
    };

    let new_files = collect_uploads(&form.images)?;

    match update_request::submit(
        &pool,
        blob.get_ref(),
        innovation_id,
        profile_id,
        &payload,
        &new_files,
    )
    .await
    {
        Ok(request_id) => {
            log::info!(
                "Update request #{request_id} submitted for innovation {innovation_id}"
            );
            let _ = session.insert(
                "flash",
                "Update request submitted — an administrator will review it",
            );
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/account/innovations"))
                .finish())
        }
        Err(AppError::Validation(errors)) => {
            let detail = innovation::find_detail(&pool, blob.get_ref(), innovation_id)
                .await?
                .ok_or(AppError::NotFound)?;
            let tmpl = UpdateRequestFormTemplate {
                ctx: PageContext::build(&session)?,
                innovation: detail.innovation,
                images: detail.images,
                errors,
            };
            render(tmpl)
        }
        Err(other) => Err(other),
    }
}
