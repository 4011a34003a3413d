use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{csrf, password, validate, rate_limit::RateLimiter};
use crate::auth::session::permissions_csv;
use crate::errors::{render, AppError};
use crate::models::profile::{self, NewProfile, RegisterForm};
use crate::templates_structs::{LoginTemplate, PublicContext, RegisterTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    // If already logged in, go straight to the account page
    if session.get::<i64>("user_id").unwrap_or(None).is_some() {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/account/innovations"))
            .finish());
    }

    let tmpl = LoginTemplate {
        pc: PublicContext::build(&session),
        error: None,
    };
    render(tmpl)
}

pub async fn login_submit(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Rate-limit check BEFORE any database access
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        return login_error(&session, "Too many failed login attempts. Please try again later.");
    }

    let found = profile::find_auth_by_email(&pool, form.email.trim()).await?;

    let Some(account) = found else {
        limiter.record_failure(ip);
        return login_error(&session, "Invalid email or password");
    };

    if !password::verify_password(&form.password, &account.password).unwrap_or(false) {
        limiter.record_failure(ip);
        return login_error(&session, "Invalid email or password");
    }

    // Innovator registrations must be approved before first login
    if account.status != "approved" {
        return login_error(
            &session,
            "Your registration is awaiting administrator approval",
        );
    }

    limiter.clear(ip);

    let _ = session.insert("user_id", account.user_id);
    let _ = session.insert("profile_id", account.profile_id);
    let _ = session.insert("display_name", &account.full_name);
    let _ = session.insert("permissions", permissions_csv(account.is_admin));

    let destination = if account.is_admin {
        "/admin/dashboard"
    } else {
        "/account/innovations"
    };
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", destination))
        .finish())
}

fn login_error(session: &Session, message: &str) -> Result<HttpResponse, AppError> {
    let tmpl = LoginTemplate {
        pc: PublicContext::build(session),
        error: Some(message.to_string()),
    };
    render(tmpl)
}

pub async fn register_page(session: Session) -> Result<HttpResponse, AppError> {
    render(empty_register_form(&session))
}

pub async fn register_submit(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_name(&form.full_name));
    errors.extend(validate::validate_email(&form.email));
    errors.extend(validate::validate_password(&form.password));
    errors.extend(validate::validate_optional(&form.phone, "Phone", 30));
    errors.extend(validate::validate_optional(&form.institution, "Institution", 150));
    errors.extend(validate::validate_optional(&form.bio, "Bio", 2000));

    if !errors.is_empty() {
        return render(filled_register_form(&session, &form, errors));
    }

    let hashed = match password::hash_password(&form.password) {
        Ok(h) => h,
        Err(_) => return Err(AppError::Hash("Password hash error".to_string())),
    };

    let new = NewProfile {
        full_name: form.full_name.trim().to_string(),
        phone: form.phone.trim().to_string(),
        institution: form.institution.trim().to_string(),
        bio: form.bio.trim().to_string(),
    };

    match profile::create_account(&pool, form.email.trim(), &hashed, &new).await {
        Ok(profile_id) => {
            log::info!("New innovator registration #{profile_id}");
            let _ = session.insert(
                "flash",
                "Registration received. You can log in once an administrator approves it.",
            );
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/login"))
                .finish())
        }
        Err(e) => {
            let msg = if e.to_string().contains("duplicate key") {
                "An account with this email already exists".to_string()
            } else {
                format!("Error creating account: {e}")
            };
            render(filled_register_form(&session, &form, vec![msg]))
        }
    }
}

fn empty_register_form(session: &Session) -> RegisterTemplate {
    RegisterTemplate {
        pc: PublicContext::build(session),
        errors: vec![],
        full_name: String::new(),
        email: String::new(),
        phone: String::new(),
        institution: String::new(),
        bio: String::new(),
    }
}

fn filled_register_form(
    session: &Session,
    form: &RegisterForm,
    errors: Vec<String>,
) -> RegisterTemplate {
    RegisterTemplate {
        pc: PublicContext::build(session),
        errors,
        full_name: form.full_name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        institution: form.institution.clone(),
        bio: form.bio.clone(),
    }
}

pub async fn logout(session: Session, form: web::Form<CsrfOnly>) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .finish())
}
