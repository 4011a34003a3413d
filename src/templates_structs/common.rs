use askama::Template;

use super::PublicContext;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub pc: PublicContext,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub pc: PublicContext,
    pub errors: Vec<String>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub institution: String,
    pub bio: String,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub pc: PublicContext,
    pub errors: Vec<String>,
    pub name: String,
    pub email: String,
    pub message: String,
}
