use chrono::{DateTime, Utc};

pub mod banner;
pub mod category;
pub mod contact;
pub mod event;
pub mod innovation;
pub mod news;
pub mod profile;
pub mod update_request;

/// Render a timestamp the way list/detail pages display it.
pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}
