use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::auth::session::require_profile_id;
use crate::errors::{render, AppError};
use crate::models::{innovation, update_request};
use crate::storage::FsBlobStore;
use crate::templates_structs::{MyInnovationsTemplate, PageContext};

/// The innovator's own catalog entries and update-request history.
pub async fn my_innovations(
    pool: web::Data<PgPool>,
    blob: web::Data<FsBlobStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let profile_id = require_profile_id(&session)?;

    let innovations = innovation::list_by_owner(&pool, blob.get_ref(), profile_id).await?;
    let requests = update_request::list_by_submitter(&pool, profile_id).await?;

    let tmpl = MyInnovationsTemplate {
        ctx: PageContext::build(&session)?,
        innovations,
        requests,
    };
    render(tmpl)
}
