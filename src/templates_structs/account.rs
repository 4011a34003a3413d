use askama::Template;

use super::PageContext;
use crate::models::innovation::{ImageDisplay, Innovation, InnovationCard};
use crate::models::update_request::OwnRequest;

#[derive(Template)]
#[template(path = "account/innovations.html")]
pub struct MyInnovationsTemplate {
    pub ctx: PageContext,
    pub innovations: Vec<InnovationCard>,
    pub requests: Vec<OwnRequest>,
}

#[derive(Template)]
#[template(path = "account/update_request_form.html")]
pub struct UpdateRequestFormTemplate {
    pub ctx: PageContext,
    pub innovation: Innovation,
    pub images: Vec<ImageDisplay>,
    pub errors: Vec<String>,
}
