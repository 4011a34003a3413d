//! Handlers for the update-request workflow: innovator-facing submission
//! and admin-facing review.

mod review;
mod submit;

pub use review::*;
pub use submit::*;
