use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::{NaiveDateTime, Utc};
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::session::require_permission;
use crate::auth::validate;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::handlers::{collect_uploads, store_uploads};
use crate::models::event;
use crate::models::event::NewEvent;
use crate::storage::FsBlobStore;
use crate::templates_structs::{AdminEventFormTemplate, AdminEventListTemplate, PageContext};

#[derive(MultipartForm)]
pub struct EventUpload {
    pub csrf_token: Text<String>,
    pub title: Text<String>,
    pub description: Text<String>,
    pub location: Option<Text<String>>,
    /// datetime-local inputs, e.g. "2026-09-01T09:00"
    pub starts_at: Text<String>,
    pub ends_at: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    pub image: Option<TempFile>,
}

/// Parse a browser datetime-local value as a UTC timestamp.
fn parse_local(value: &str) -> Option<chrono::DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_form(form: &EventUpload) -> Result<NewEvent, Vec<String>> {
    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_required(&form.title, "Title", 200));
    errors.extend(validate::validate_required(&form.description, "Description", 10000));

    let starts_at = parse_local(&form.starts_at);
    if starts_at.is_none() {
        errors.push("Start time must be a valid date and time".to_string());
    }

    let ends_at = match form.ends_at.as_ref().map(|t| t.trim()).filter(|s| !s.is_empty()) {
        Some(raw) => match parse_local(raw) {
            Some(ts) => Some(ts),
            None => {
                errors.push("End time must be a valid date and time".to_string());
                None
            }
        },
        None => None,
    };

    if let (Some(start), Some(end)) = (starts_at, ends_at) {
        if end < start {
            errors.push("End time must not be before the start time".to_string());
        }
    }

    let Some(starts_at) = starts_at else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewEvent {
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        location: form
            .location
            .as_ref()
            .map(|t| t.trim().to_string())
            .unwrap_or_default(),
        starts_at,
        ends_at,
    })
}

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
    let keys = store_uploads(blob, &uploads, "events").await?;
    Ok(keys.into_iter().next())
}

pub async fn list(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;

    let events = event::find_all(&pool, blob.get_ref()).await?;

    let tmpl = AdminEventListTemplate {
        ctx: PageContext::build(&session)?,
        events,
    };
    render(tmpl)
}

pub async fn new_form(session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;

    let tmpl = AdminEventFormTemplate {
        ctx: PageContext::build(&session)?,
        form_action: "/admin/events".to_string(),
        form_title: "Create Event".to_string(),
        event: None,
        errors: vec![],
    };
    render(tmpl)
}

pub async fn create(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    form: MultipartForm<EventUpload>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let new = match parse_form(&form) {
        Ok(new) => new,
        Err(errors) => {
            let tmpl = AdminEventFormTemplate {
                ctx: PageContext::build(&session)?,
                form_action: "/admin/events".to_string(),
                form_title: "Create Event".to_string(),
                event: None,
                errors,
            };
            return render(tmpl);
        }
    };

    let image_key = store_cover(blob.get_ref(), &form.image).await?;
    event::create(&pool, &new, image_key.as_deref()).await?;

    let _ = session.insert("flash", format!("Event '{}' created", new.title));
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/events"))
        .finish())
}

pub async fn edit_form(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;

    let id = path.into_inner();
    let event = event::find_by_id(&pool, blob.get_ref(), id)
        .await?
        .ok_or(AppError::NotFound)?;

    let tmpl = AdminEventFormTemplate {
        ctx: PageContext::build(&session)?,
        form_action: format!("/admin/events/{id}"),
        form_title: "Edit Event".to_string(),
        event: Some(event),
        errors: vec![],
    };
    render(tmpl)
}

pub async fn update(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
    form: MultipartForm<EventUpload>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();

    let new = match parse_form(&form) {
        Ok(new) => new,
        Err(errors) => {
            let event = event::find_by_id(&pool, blob.get_ref(), id)
                .await?
                .ok_or(AppError::NotFound)?;
            let tmpl = AdminEventFormTemplate {
                ctx: PageContext::build(&session)?,
                form_action: format!("/admin/events/{id}"),
                form_title: "Edit Event".to_string(),
                event: Some(event),
                errors,
            };
            return render(tmpl);
        }
    };

    let image_key = store_cover(blob.get_ref(), &form.image).await?;
    event::update(&pool, id, &new, image_key.as_deref()).await?;

    let _ = session.insert("flash", "Event updated");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/events"))
        .finish())
}

pub async fn delete(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    event::delete(&pool, blob.get_ref(), path.into_inner()).await?;

    let _ = session.insert("flash", "Event deleted");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/events"))
        .finish())
}
