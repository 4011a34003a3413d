use serde::Deserialize;

/// Profile joined with its identity record — used by the login flow.
/// Includes the password hash; never handed to templates.
#[derive(Debug, Clone)]
pub struct AuthProfile {
    pub user_id: i64,
    pub profile_id: i64,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub is_admin: bool,
    pub status: String,
}

/// Full profile record.
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub phone: String,
    pub institution: String,
    pub bio: String,
    pub is_admin: bool,
    pub status: String,
    pub created_at: String,
}

/// New innovator registration.
pub struct NewProfile {
    pub full_name: String,
    pub phone: String,
    pub institution: String,
    pub bio: String,
}

/// Card for the public innovator directory (approved profiles only).
#[derive(Debug, Clone)]
pub struct InnovatorCard {
    pub id: i64,
    pub full_name: String,
    pub institution: String,
    pub bio: String,
    pub innovation_count: i64,
}

/// Row in the admin approval queue.
#[derive(Debug, Clone)]
pub struct PendingInnovator {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub institution: String,
    pub registered_at: String,
}

/// Option for the admin "owner" dropdown.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnerOption {
    pub id: i64,
    pub full_name: String,
}

/// Form data from the registration page.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub institution: String,
    pub bio: String,
    pub csrf_token: String,
}
