use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::auth::session::require_permission;
use crate::errors::{render, AppError};
use crate::models::{event, innovation, news, profile, update_request};
use crate::templates_structs::{DashboardStats, DashboardTemplate, PageContext};

pub async fn index(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "admin.access")?;

    let stats = DashboardStats {
        innovations: innovation::count(&pool).await?,
        news: news::count(&pool).await?,
        events: event::count(&pool).await?,
        pending_innovators: profile::count_pending(&pool).await?,
        pending_requests: update_request::count_pending(&pool).await?,
    };

    let tmpl = DashboardTemplate {
        ctx: PageContext::build(&session)?,
        stats,
    };
    render(tmpl)
}
