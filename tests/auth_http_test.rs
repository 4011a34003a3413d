//! HTTP-level tests for the login and registration handlers: CSRF round
//! trip, credential checks, the pending-profile gate, and rate limiting.

mod common;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Cookie, Key};
use actix_web::{test, web, App};
use regex::Regex;

use orbit::auth::password;
use orbit::auth::rate_limit::RateLimiter;
use orbit::handlers::auth_handlers;
use orbit::models::profile::{self, NewProfile};

use common::{setup_test_db, TEST_PASSWORD};

macro_rules! init_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                )
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(RateLimiter::new()))
                .route("/login", web::get().to(auth_handlers::login_page))
                .route("/login", web::post().to(auth_handlers::login_submit))
                .route("/register", web::get().to(auth_handlers::register_page))
                .route("/register", web::post().to(auth_handlers::register_submit)),
        )
        .await
    };
}

/// GET a form page, returning the session cookies and the CSRF token
/// embedded in the rendered HTML.
macro_rules! fetch_csrf {
    ($app:expr, $uri:expr) => {{
        let resp = test::call_service(&$app, test::TestRequest::get().uri($uri).to_request()).await;
        assert!(resp.status().is_success());
        let cookies: Vec<Cookie<'static>> = resp
            .response()
            .cookies()
            .map(|c| c.into_owned())
            .collect();
        let body = test::read_body(resp).await;
        let html = String::from_utf8_lossy(&body).to_string();
        let re = Regex::new(r#"name="csrf_token" value="([0-9a-f]{64})""#).unwrap();
        let token = re
            .captures(&html)
            .expect("CSRF token in form")
            .get(1)
            .unwrap()
            .as_str()
            .to_string();
        (cookies, token)
    }};
}

fn with_cookies(
    mut req: test::TestRequest,
    cookies: &[Cookie<'static>],
) -> test::TestRequest {
    for cookie in cookies {
        req = req.cookie(cookie.clone());
    }
    req
}

#[actix_rt::test]
async fn login_rejects_bad_credentials_and_accepts_good_ones() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let app = init_app!(pool);

    let hash = password::hash_password(TEST_PASSWORD).unwrap();
    profile::seed_admin(pool, "admin@test.com", &hash, "Administrator")
        .await
        .unwrap();

    let (cookies, token) = fetch_csrf!(app, "/login");

    // Wrong password re-renders the login page with a generic error
    let body = serde_urlencoded::to_string([
        ("email", "admin@test.com"),
        ("password", "wrong-password"),
        ("csrf_token", &token),
    ])
    .unwrap();
    let req = with_cookies(test::TestRequest::post().uri("/login"), &cookies)
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let html = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
    assert!(html.contains("Invalid email or password"));

    // Correct credentials redirect into the back office
    let body = serde_urlencoded::to_string([
        ("email", "admin@test.com"),
        ("password", TEST_PASSWORD),
        ("csrf_token", &token),
    ])
    .unwrap();
    let req = with_cookies(test::TestRequest::post().uri("/login"), &cookies)
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 303);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(location, "/admin/dashboard");

    db.close().await;
}

#[actix_rt::test]
async fn login_without_csrf_token_is_forbidden() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let app = init_app!(pool);

    let req = test::TestRequest::post()
        .uri("/login")
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload("email=a%40b.com&password=whatever&csrf_token=deadbeef")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 403);

    db.close().await;
}

#[actix_rt::test]
async fn pending_innovator_cannot_log_in() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let app = init_app!(pool);

    let hash = password::hash_password(TEST_PASSWORD).unwrap();
    profile::create_account(
        pool,
        "pending@test.com",
        &hash,
        &NewProfile {
            full_name: "Pending Person".to_string(),
            phone: String::new(),
            institution: String::new(),
            bio: String::new(),
        },
    )
    .await
    .unwrap();

    let (cookies, token) = fetch_csrf!(app, "/login");
    let body = serde_urlencoded::to_string([
        ("email", "pending@test.com"),
        ("password", TEST_PASSWORD),
        ("csrf_token", &token),
    ])
    .unwrap();
    let req = with_cookies(test::TestRequest::post().uri("/login"), &cookies)
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let html = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
    assert!(html.contains("awaiting administrator approval"));

    db.close().await;
}

#[actix_rt::test]
async fn registration_creates_a_pending_profile() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let app = init_app!(pool);

    let (cookies, token) = fetch_csrf!(app, "/register");
    let body = serde_urlencoded::to_string([
        ("full_name", "Sari Wijaya"),
        ("email", "sari@test.com"),
        ("password", TEST_PASSWORD),
        ("phone", "0811111"),
        ("institution", "Politeknik Test"),
        ("bio", ""),
        ("csrf_token", &token),
    ])
    .unwrap();
    let req = with_cookies(test::TestRequest::post().uri("/register"), &cookies)
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 303);

    let auth = profile::find_auth_by_email(pool, "sari@test.com")
        .await
        .unwrap()
        .expect("account created");
    assert_eq!(auth.status, "pending");
    assert!(!auth.is_admin);

    db.close().await;
}

#[actix_rt::test]
async fn repeated_failures_hit_the_rate_limit() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let app = init_app!(pool);

    let (cookies, token) = fetch_csrf!(app, "/login");

    for _ in 0..5 {
        let body = serde_urlencoded::to_string([
            ("email", "nobody@test.com"),
            ("password", "wrong"),
            ("csrf_token", &token),
        ])
        .unwrap();
        let req = with_cookies(test::TestRequest::post().uri("/login"), &cookies)
            .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
            .set_payload(body)
            .to_request();
        test::call_service(&app, req).await;
    }

    let body = serde_urlencoded::to_string([
        ("email", "nobody@test.com"),
        ("password", "wrong"),
        ("csrf_token", &token),
    ])
    .unwrap();
    let req = with_cookies(test::TestRequest::post().uri("/login"), &cookies)
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let html = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
    assert!(html.contains("Too many failed login attempts"));

    db.close().await;
}
