use askama::Template;

use super::PageContext;
use crate::models::banner::Banner;
use crate::models::category::CategoryRow;
use crate::models::contact::ContactMessage;
use crate::models::event::Event;
use crate::models::innovation::{
    AdminInnovationRow, ImageDisplay, Innovation, InnovationDetail,
};
use crate::models::news::NewsItem;
use crate::models::profile::PendingInnovator;
use crate::models::update_request::{PendingRequest, UpdateRequestDetail};

pub struct DashboardStats {
    pub innovations: i64,
    pub news: i64,
    pub events: i64,
    pub pending_innovators: i64,
    pub pending_requests: i64,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub stats: DashboardStats,
}

#[derive(Template)]
#[template(path = "admin/innovations/list.html")]
pub struct AdminInnovationListTemplate {
    pub ctx: PageContext,
    pub innovations: Vec<AdminInnovationRow>,
}

/// Category checkbox state for the innovation form.
pub struct CategoryOption {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

/// Owner dropdown state for the innovation form.
pub struct OwnerSelect {
    pub id: i64,
    pub full_name: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "admin/innovations/form.html")]
pub struct AdminInnovationFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub innovation: Option<Innovation>,
    pub images: Vec<ImageDisplay>,
    pub categories: Vec<CategoryOption>,
    pub owners: Vec<OwnerSelect>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "admin/categories.html")]
pub struct AdminCategoriesTemplate {
    pub ctx: PageContext,
    pub categories: Vec<CategoryRow>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "admin/news/list.html")]
pub struct AdminNewsListTemplate {
    pub ctx: PageContext,
    pub items: Vec<NewsItem>,
}

#[derive(Template)]
#[template(path = "admin/news/form.html")]
pub struct AdminNewsFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub item: Option<NewsItem>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "admin/events/list.html")]
pub struct AdminEventListTemplate {
    pub ctx: PageContext,
    pub events: Vec<Event>,
}

#[derive(Template)]
#[template(path = "admin/events/form.html")]
pub struct AdminEventFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub event: Option<Event>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "admin/banners.html")]
pub struct AdminBannersTemplate {
    pub ctx: PageContext,
    pub banners: Vec<Banner>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "admin/innovators.html")]
pub struct AdminInnovatorsTemplate {
    pub ctx: PageContext,
    pub pending: Vec<PendingInnovator>,
}

#[derive(Template)]
#[template(path = "admin/update_requests/list.html")]
pub struct ReviewQueueTemplate {
    pub ctx: PageContext,
    pub requests: Vec<PendingRequest>,
}

#[derive(Template)]
#[template(path = "admin/update_requests/detail.html")]
pub struct ReviewDetailTemplate {
    pub ctx: PageContext,
    pub request: UpdateRequestDetail,
    pub current: InnovationDetail,
}

#[derive(Template)]
#[template(path = "admin/messages.html")]
pub struct AdminMessagesTemplate {
    pub ctx: PageContext,
    pub messages: Vec<ContactMessage>,
}
