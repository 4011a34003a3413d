use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{csrf, validate};
use crate::errors::{render, AppError};
use crate::models::contact;
use crate::templates_structs::{ContactTemplate, PublicContext};

#[derive(Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    pub csrf_token: String,
}

pub async fn form(session: Session) -> Result<HttpResponse, AppError> {
    let tmpl = ContactTemplate {
        pc: PublicContext::build(&session),
        errors: vec![],
        name: String::new(),
        email: String::new(),
        message: String::new(),
    };
    render(tmpl)
}

pub async fn submit(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<ContactForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_name(&form.name));
    errors.extend(validate::validate_email(&form.email));
    errors.extend(validate::validate_required(&form.message, "Message", 5000));

    if !errors.is_empty() {
        let tmpl = ContactTemplate {
            pc: PublicContext::build(&session),
            errors,
            name: form.name.clone(),
            email: form.email.clone(),
            message: form.message.clone(),
        };
        return render(tmpl);
    }

    contact::upsert(&pool, form.name.trim(), form.email.trim(), form.message.trim()).await?;

    let _ = session.insert("flash", "Thank you — your message has been received");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/contact"))
        .finish())
}
