use actix_session::Session;

use crate::errors::AppError;

/// Permission codes granted to administrators at login.
pub const ADMIN_PERMISSIONS: &[&str] = &[
    "admin.access",
    "innovations.manage",
    "categories.manage",
    "news.manage",
    "events.manage",
    "banners.manage",
    "innovators.review",
    "updates.review",
];

/// Permission codes granted to approved innovators at login.
pub const INNOVATOR_PERMISSIONS: &[&str] = &["updates.submit"];

/// Wrapper around permission codes with a `has()` method for use in Askama templates.
#[derive(Debug, Clone, Default)]
pub struct Permissions(pub Vec<String>);

impl Permissions {
    pub fn has(&self, code: &str) -> bool {
        self.0.iter().any(|p| p == code)
    }

    pub fn from_csv(csv: &str) -> Self {
        let codes = csv
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Permissions(codes)
    }
}

/// Codes for a freshly authenticated profile, as a CSV for session storage.
pub fn permissions_csv(is_admin: bool) -> String {
    let codes = if is_admin {
        ADMIN_PERMISSIONS
    } else {
        INNOVATOR_PERMISSIONS
    };
    codes.join(",")
}

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

pub fn get_profile_id(session: &Session) -> Option<i64> {
    session.get::<i64>("profile_id").unwrap_or(None)
}

pub fn get_display_name(session: &Session) -> Result<String, String> {
    match session.get::<String>("display_name") {
        Ok(Some(name)) => Ok(name),
        Ok(None) => Err("No display name in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

pub fn get_permissions(session: &Session) -> Result<Permissions, String> {
    match session.get::<String>("permissions") {
        Ok(Some(csv)) => Ok(Permissions::from_csv(&csv)),
        Ok(None) => Err("No permissions in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}

/// Check permission; returns Err(AppError) if denied.
pub fn require_permission(session: &Session, code: &str) -> Result<(), AppError> {
    let permissions = get_permissions(session)
        .map_err(|e| AppError::Session(format!("Failed to get permissions: {}", e)))?;

    if permissions.has(code) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(code.to_string()))
    }
}

/// Profile id of the logged-in caller, or a session error.
pub fn require_profile_id(session: &Session) -> Result<i64, AppError> {
    get_profile_id(session).ok_or_else(|| AppError::Session("Not logged in".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_from_csv_ignores_blanks() {
        let perms = Permissions::from_csv("updates.submit, ,admin.access,");
        assert!(perms.has("updates.submit"));
        assert!(perms.has("admin.access"));
        assert!(!perms.has("news.manage"));
        assert_eq!(perms.0.len(), 2);
    }

    #[test]
    fn admin_csv_includes_review_codes() {
        let perms = Permissions::from_csv(&permissions_csv(true));
        assert!(perms.has("updates.review"));
        assert!(perms.has("innovators.review"));
    }

    #[test]
    fn innovator_csv_is_submission_only() {
        let perms = Permissions::from_csv(&permissions_csv(false));
        assert!(perms.has("updates.submit"));
        assert!(!perms.has("updates.review"));
        assert!(!perms.has("admin.access"));
    }
}
