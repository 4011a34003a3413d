use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::errors::{render, AppError};
use crate::models::{banner, category, event, innovation, news, profile};
use crate::models::innovation::CatalogFilter;
use crate::storage::{BlobStore, FsBlobStore};
use crate::templates_structs::{
    CatalogTemplate, EventDetailTemplate, EventsTemplate, HomeTemplate,
    InnovationPageTemplate, InnovatorDirectoryTemplate, NewsDetailTemplate,
    NewsListTemplate, PublicContext,
};

pub async fn home(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let blob: &dyn BlobStore = blob.get_ref();
    let banners = banner::find_active(&pool, blob).await?;
    let latest = innovation::list_latest(&pool, blob, 6).await?;
    let news = news::find_latest(&pool, blob, 3).await?;

    let tmpl = HomeTemplate {
        pc: PublicContext::build(&session),
        banners,
        latest,
        news,
    };
    render(tmpl)
}

pub async fn catalog(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    query: web::Query<CatalogFilter>,
) -> Result<HttpResponse, AppError> {
    let blob: &dyn BlobStore = blob.get_ref();
    let innovations = innovation::list(&pool, blob, &query).await?;
    let categories = category::find_all(&pool).await?;

    let tmpl = CatalogTemplate {
        pc: PublicContext::build(&session),
        innovations,
        categories,
        q: query.q.clone().unwrap_or_default(),
        selected_category: query.category,
    };
    render(tmpl)
}

pub async fn innovation_detail(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let detail = innovation::find_detail(&pool, blob.get_ref(), id)
        .await?
        .ok_or(AppError::NotFound)?;

    let tmpl = InnovationPageTemplate {
        pc: PublicContext::build(&session),
        detail,
    };
    render(tmpl)
}

pub async fn innovator_directory(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let innovators = profile::directory(&pool).await?;

    let tmpl = InnovatorDirectoryTemplate {
        pc: PublicContext::build(&session),
        innovators,
    };
    render(tmpl)
}

pub async fn news_list(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let items = news::find_all(&pool, blob.get_ref()).await?;

    let tmpl = NewsListTemplate {
        pc: PublicContext::build(&session),
        items,
    };
    render(tmpl)
}

pub async fn news_detail(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let item = news::find_by_id(&pool, blob.get_ref(), id)
        .await?
        .ok_or(AppError::NotFound)?;

    let tmpl = NewsDetailTemplate {
        pc: PublicContext::build(&session),
        item,
    };
    render(tmpl)
}

pub async fn events_list(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let events = event::find_all(&pool, blob.get_ref()).await?;

    let tmpl = EventsTemplate {
        pc: PublicContext::build(&session),
        events,
    };
    render(tmpl)
}

pub async fn event_detail(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let event = event::find_by_id(&pool, blob.get_ref(), id)
        .await?
        .ok_or(AppError::NotFound)?;

    let tmpl = EventDetailTemplate {
        pc: PublicContext::build(&session),
        event,
    };
    render(tmpl)
}
