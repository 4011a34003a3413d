use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, middleware, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use orbit::auth::{middleware::require_auth, password, rate_limit::RateLimiter};
use orbit::handlers;
use orbit::models::profile;
use orbit::storage::FsBlobStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set (e.g. in .env)");

    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");

    // Seed the administrator account on first start
    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@orbit.local".to_string());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        log::warn!("No ADMIN_PASSWORD set — using the default development password");
        "admin123".to_string()
    });
    let admin_hash =
        password::hash_password(&admin_password).expect("Failed to hash admin password");
    profile::seed_admin(&pool, &admin_email, &admin_hash, "Administrator")
        .await
        .expect("Failed to seed admin account");

    // Uploaded images live on disk and are served under /uploads
    let upload_dir =
        std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "data/uploads".to_string());
    std::fs::create_dir_all(&upload_dir).expect("Failed to create upload directory");
    let blob_store = FsBlobStore::new(upload_dir.clone(), "/uploads");

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                val.len()
            );
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let limiter = RateLimiter::new();
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let session_mw =
            SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                .cookie_secure(false)
                .cookie_http_only(true)
                .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(blob_store.clone()))
            .app_data(web::Data::new(limiter.clone()))
            // Static assets and uploaded images
            .service(actix_files::Files::new("/static", "./static"))
            .service(actix_files::Files::new("/uploads", &upload_dir))
            // Public routes
            .route("/", web::get().to(handlers::public_handlers::home))
            .route("/innovations", web::get().to(handlers::public_handlers::catalog))
            .route(
                "/innovations/{id}",
                web::get().to(handlers::public_handlers::innovation_detail),
            )
            .route(
                "/innovators",
                web::get().to(handlers::public_handlers::innovator_directory),
            )
            .route("/news", web::get().to(handlers::public_handlers::news_list))
            .route("/news/{id}", web::get().to(handlers::public_handlers::news_detail))
            .route("/events", web::get().to(handlers::public_handlers::events_list))
            .route("/events/{id}", web::get().to(handlers::public_handlers::event_detail))
            .route("/contact", web::get().to(handlers::contact_handlers::form))
            .route("/contact", web::post().to(handlers::contact_handlers::submit))
            .route("/login", web::get().to(handlers::auth_handlers::login_page))
            .route("/login", web::post().to(handlers::auth_handlers::login_submit))
            .route("/register", web::get().to(handlers::auth_handlers::register_page))
            .route("/register", web::post().to(handlers::auth_handlers::register_submit))
            // Protected routes
            .service(
                web::scope("")
                    .wrap(actix_web::middleware::from_fn(require_auth))
                    .route("/logout", web::post().to(handlers::auth_handlers::logout))
                    // Innovator account
                    .route(
                        "/account/innovations",
                        web::get().to(handlers::account_handlers::my_innovations),
                    )
                    .route(
                        "/account/innovations/{id}/update-request",
                        web::get().to(handlers::update_request_handlers::form),
                    )
                    .route(
                        "/account/innovations/{id}/update-request",
                        web::post().to(handlers::update_request_handlers::submit),
                    )
                    // Admin back-office
                    .route("/admin/dashboard", web::get().to(handlers::admin::dashboard::index))
                    // Innovation CRUD — /new BEFORE /{id} to avoid routing conflict
                    .route(
                        "/admin/innovations",
                        web::get().to(handlers::admin::innovation_handlers::list),
                    )
                    .route(
                        "/admin/innovations/new",
                        web::get().to(handlers::admin::innovation_handlers::new_form),
                    )
                    .route(
                        "/admin/innovations",
                        web::post().to(handlers::admin::innovation_handlers::create),
                    )
                    .route(
                        "/admin/innovations/{id}/edit",
                        web::get().to(handlers::admin::innovation_handlers::edit_form),
                    )
                    .route(
                        "/admin/innovations/{id}",
                        web::post().to(handlers::admin::innovation_handlers::update),
                    )
                    .route(
                        "/admin/innovations/{id}/images/delete",
                        web::post().to(handlers::admin::innovation_handlers::remove_image),
                    )
                    .route(
                        "/admin/innovations/{id}/delete",
                        web::post().to(handlers::admin::innovation_handlers::delete),
                    )
                    // Categories
                    .route(
                        "/admin/categories",
                        web::get().to(handlers::admin::category_handlers::list),
                    )
                    .route(
                        "/admin/categories",
                        web::post().to(handlers::admin::category_handlers::create),
                    )
                    .route(
                        "/admin/categories/{id}",
                        web::post().to(handlers::admin::category_handlers::update),
                    )
                    .route(
                        "/admin/categories/{id}/delete",
                        web::post().to(handlers::admin::category_handlers::delete),
                    )
                    // News
                    .route("/admin/news", web::get().to(handlers::admin::news_handlers::list))
                    .route(
                        "/admin/news/new",
                        web::get().to(handlers::admin::news_handlers::new_form),
                    )
                    .route("/admin/news", web::post().to(handlers::admin::news_handlers::create))
                    .route(
                        "/admin/news/{id}/edit",
                        web::get().to(handlers::admin::news_handlers::edit_form),
                    )
                    .route(
                        "/admin/news/{id}",
                        web::post().to(handlers::admin::news_handlers::update),
                    )
                    .route(
                        "/admin/news/{id}/delete",
                        web::post().to(handlers::admin::news_handlers::delete),
                    )
                    // Events
                    .route("/admin/events", web::get().to(handlers::admin::event_handlers::list))
                    .route(
                        "/admin/events/new",
                        web::get().to(handlers::admin::event_handlers::new_form),
                    )
                    .route(
                        "/admin/events",
                        web::post().to(handlers::admin::event_handlers::create),
                    )
                    .route(
                        "/admin/events/{id}/edit",
                        web::get().to(handlers::admin::event_handlers::edit_form),
                    )
                    .route(
                        "/admin/events/{id}",
                        web::post().to(handlers::admin::event_handlers::update),
                    )
                    .route(
                        "/admin/events/{id}/delete",
                        web::post().to(handlers::admin::event_handlers::delete),
                    )
                    // Carousel banners
                    .route(
                        "/admin/banners",
                        web::get().to(handlers::admin::banner_handlers::list),
                    )
                    .route(
                        "/admin/banners",
                        web::post().to(handlers::admin::banner_handlers::create),
                    )
                    .route(
                        "/admin/banners/{id}/toggle",
                        web::post().to(handlers::admin::banner_handlers::toggle),
                    )
                    .route(
                        "/admin/banners/{id}/delete",
                        web::post().to(handlers::admin::banner_handlers::delete),
                    )
                    // Innovator approval
                    .route(
                        "/admin/innovators",
                        web::get().to(handlers::admin::innovator_handlers::pending),
                    )
                    .route(
                        "/admin/innovators/{id}/approve",
                        web::post().to(handlers::admin::innovator_handlers::approve),
                    )
                    .route(
                        "/admin/innovators/{id}/reject",
                        web::post().to(handlers::admin::innovator_handlers::reject),
                    )
                    // Update-request moderation
                    .route(
                        "/admin/update-requests",
                        web::get().to(handlers::update_request_handlers::queue),
                    )
                    .route(
                        "/admin/update-requests/{id}",
                        web::get().to(handlers::update_request_handlers::detail),
                    )
                    .route(
                        "/admin/update-requests/{id}/approve",
                        web::post().to(handlers::update_request_handlers::approve),
                    )
                    .route(
                        "/admin/update-requests/{id}/reject",
                        web::post().to(handlers::update_request_handlers::reject),
                    )
                    // Contact inbox
                    .route(
                        "/admin/messages",
                        web::get().to(handlers::admin::message_handlers::list),
                    )
                    .route(
                        "/admin/messages/{id}/delete",
                        web::post().to(handlers::admin::message_handlers::delete),
                    ),
            )
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
