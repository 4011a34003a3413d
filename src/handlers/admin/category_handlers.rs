use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::session::require_permission;
use crate::auth::validate;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::category;
use crate::templates_structs::{AdminCategoriesTemplate, PageContext};

#[derive(Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    pub csrf_token: String,
}

async fn list_page(
    pool: &PgPool,
    session: &Session,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let tmpl = AdminCategoriesTemplate {
        ctx: PageContext::build(session)?,
        categories: category::find_all_with_counts(pool).await?,
        errors,
    };
    render(tmpl)
}

pub async fn list(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "categories.manage")?;
    list_page(&pool, &session, vec![]).await
}

pub async fn create(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<CategoryForm>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "categories.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_required(&form.name, "Name", 100));
    errors.extend(validate::validate_optional(&form.description, "Description", 500));

    if !errors.is_empty() {
        return list_page(&pool, &session, errors).await;
    }

    match category::create(&pool, form.name.trim(), form.description.trim()).await {
        Ok(_) => {
            let _ = session.insert("flash", format!("Category '{}' created", form.name.trim()));
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/admin/categories"))
                .finish())
        }
        Err(e) => {
            let msg = if e.to_string().contains("duplicate key") {
                "A category with this name already exists".to_string()
            } else {
                format!("Error creating category: {e}")
            };
            list_page(&pool, &session, vec![msg]).await
        }
    }
}

pub async fn update(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CategoryForm>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "categories.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();

    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_required(&form.name, "Name", 100));
    errors.extend(validate::validate_optional(&form.description, "Description", 500));

    if !errors.is_empty() {
        return list_page(&pool, &session, errors).await;
    }

    match category::update(&pool, id, form.name.trim(), form.description.trim()).await {
        Ok(()) => {
            let _ = session.insert("flash", "Category updated");
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/admin/categories"))
                .finish())
        }
        Err(AppError::NotFound) => Err(AppError::NotFound),
        Err(e) => {
            let msg = if e.to_string().contains("duplicate key") {
                "A category with this name already exists".to_string()
            } else {
                format!("Error updating category: {e}")
            };
            list_page(&pool, &session, vec![msg]).await
        }
    }
}

pub async fn delete(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "categories.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    category::delete(&pool, path.into_inner()).await?;

    let _ = session.insert("flash", "Category deleted");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/admin/categories"))
        .finish())
}
