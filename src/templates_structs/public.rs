use askama::Template;

use super::PublicContext;
use crate::models::banner::Banner;
use crate::models::category::Category;
use crate::models::event::Event;
use crate::models::innovation::{InnovationCard, InnovationDetail};
use crate::models::news::NewsItem;
use crate::models::profile::InnovatorCard;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub pc: PublicContext,
    pub banners: Vec<Banner>,
    pub latest: Vec<InnovationCard>,
    pub news: Vec<NewsItem>,
}

#[derive(Template)]
#[template(path = "innovations/list.html")]
pub struct CatalogTemplate {
    pub pc: PublicContext,
    pub innovations: Vec<InnovationCard>,
    pub categories: Vec<Category>,
    pub q: String,
    pub selected_category: Option<i64>,
}

#[derive(Template)]
#[template(path = "innovations/detail.html")]
pub struct InnovationPageTemplate {
    pub pc: PublicContext,
    pub detail: InnovationDetail,
}

#[derive(Template)]
#[template(path = "innovators/list.html")]
pub struct InnovatorDirectoryTemplate {
    pub pc: PublicContext,
    pub innovators: Vec<InnovatorCard>,
}

#[derive(Template)]
#[template(path = "news/list.html")]
pub struct NewsListTemplate {
    pub pc: PublicContext,
    pub items: Vec<NewsItem>,
}

#[derive(Template)]
#[template(path = "news/detail.html")]
pub struct NewsDetailTemplate {
    pub pc: PublicContext,
    pub item: NewsItem,
}

#[derive(Template)]
#[template(path = "events/list.html")]
pub struct EventsTemplate {
    pub pc: PublicContext,
    pub events: Vec<Event>,
}

#[derive(Template)]
#[template(path = "events/detail.html")]
pub struct EventDetailTemplate {
    pub pc: PublicContext,
    pub event: Event,
}
