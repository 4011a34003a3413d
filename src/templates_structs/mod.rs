// Template context structures for Askama templates, organized by domain.
// All types are re-exported: `use orbit::templates_structs::*`

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{get_display_name, get_permissions, take_flash, Permissions};
use crate::errors::AppError;

pub const APP_NAME: &str = "ORBIT Jatim";

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.display_name`, `ctx.permissions`, etc.
pub struct PageContext {
    pub display_name: String,
    pub avatar_initial: String,
    pub permissions: Permissions,
    pub flash: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session) -> Result<Self, AppError> {
        let display_name = get_display_name(session)
            .map_err(|e| AppError::Session(format!("Failed to get display name: {}", e)))?;
        let permissions = get_permissions(session)
            .map_err(|e| AppError::Session(format!("Failed to get permissions: {}", e)))?;
        let flash = take_flash(session);
        let csrf_token = csrf::get_or_create_token(session);
        let avatar_initial = display_name
            .chars()
            .next()
            .unwrap_or('?')
            .to_uppercase()
            .to_string();
        Ok(Self {
            display_name,
            avatar_initial,
            permissions,
            flash,
            app_name: APP_NAME.to_string(),
            csrf_token,
        })
    }
}

/// Context for public pages, where nobody may be logged in.
pub struct PublicContext {
    pub display_name: Option<String>,
    pub is_admin: bool,
    pub flash: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
}

impl PublicContext {
    pub fn build(session: &Session) -> Self {
        let display_name = get_display_name(session).ok();
        let is_admin = get_permissions(session)
            .map(|p| p.has("admin.access"))
            .unwrap_or(false);
        let flash = take_flash(session);
        let csrf_token = csrf::get_or_create_token(session);
        Self {
            display_name,
            is_admin,
            flash,
            app_name: APP_NAME.to_string(),
            csrf_token,
        }
    }
}

mod account;
mod admin;
mod common;
mod public;

// Re-export all types for seamless imports
pub use self::account::{MyInnovationsTemplate, UpdateRequestFormTemplate};
pub use self::admin::{
    AdminBannersTemplate, AdminCategoriesTemplate, AdminEventFormTemplate,
    AdminEventListTemplate, AdminInnovationFormTemplate, AdminInnovationListTemplate,
    AdminInnovatorsTemplate, AdminMessagesTemplate, AdminNewsFormTemplate,
    AdminNewsListTemplate, CategoryOption, DashboardStats, DashboardTemplate,
    OwnerSelect, ReviewDetailTemplate, ReviewQueueTemplate,
};
pub use self::common::{ContactTemplate, LoginTemplate, RegisterTemplate};
pub use self::public::{
    CatalogTemplate, EventDetailTemplate, EventsTemplate, HomeTemplate,
    InnovationPageTemplate, InnovatorDirectoryTemplate, NewsDetailTemplate, NewsListTemplate,
};
