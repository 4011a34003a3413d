use std::fmt;

use crate::auth::validate;
use crate::models::innovation::ImageDisplay;

/// Lifecycle of an update request.
///
/// ```text
///         approve()
///  pending ---------> approved   (terminal)
///     |
///     | reject()
///     v
///  rejected   (terminal)
/// ```
///
/// No transition leaves `approved` or `rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl UpdateRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateRequestStatus::Pending => "pending",
            UpdateRequestStatus::Approved => "approved",
            UpdateRequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(UpdateRequestStatus::Pending),
            "approved" => Some(UpdateRequestStatus::Approved),
            "rejected" => Some(UpdateRequestStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_resolved(self) -> bool {
        self != UpdateRequestStatus::Pending
    }
}

impl fmt::Display for UpdateRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The proposed edit. Narrative fields are complete overwrites; link fields
/// replace the stored links (empty form inputs arrive as `None`).
///
/// `images` distinguishes the two image intents explicitly:
/// - `None`: no image change requested; the live set is left untouched.
/// - `Some(keys)`: replace the live set with exactly `keys` (an empty
///   vector removes every image).
#[derive(Debug, Clone, Default)]
pub struct UpdatePayload {
    pub overview: String,
    pub features: String,
    pub potential_application: String,
    pub unique_value: String,
    pub tiktok_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    pub facebook_url: Option<String>,
    pub web_url: Option<String>,
    pub images: Option<Vec<String>>,
}

impl UpdatePayload {
    /// Field-level validation errors, empty when the payload is acceptable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        errors.extend(validate::validate_required(&self.overview, "Overview", 5000));
        errors.extend(validate::validate_required(&self.features, "Features", 5000));
        errors.extend(validate::validate_required(
            &self.potential_application,
            "Potential application",
            5000,
        ));
        errors.extend(validate::validate_required(
            &self.unique_value,
            "Unique value",
            5000,
        ));
        for (value, label) in [
            (&self.tiktok_url, "TikTok URL"),
            (&self.instagram_url, "Instagram URL"),
            (&self.youtube_url, "YouTube URL"),
            (&self.facebook_url, "Facebook URL"),
            (&self.web_url, "Website URL"),
        ] {
            if let Some(url) = value {
                errors.extend(validate::validate_optional_url(url, label));
            }
        }
        errors
    }
}

/// A new image file attached to a submission; stored to the blob store
/// before the request row is written.
pub struct NewImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Row in the admin moderation queue (oldest submission first).
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: i64,
    pub innovation_id: i64,
    pub innovation_title: String,
    pub submitter_name: String,
    pub overview_preview: String,
    pub images: Vec<ImageDisplay>,
    pub replace_images: bool,
    pub submitted_at: String,
}

/// Full request as shown on the review detail page.
#[derive(Debug, Clone)]
pub struct UpdateRequestDetail {
    pub id: i64,
    pub innovation_id: i64,
    pub innovation_title: String,
    pub submitter_name: String,
    pub payload: UpdatePayload,
    pub images: Vec<ImageDisplay>,
    pub status: UpdateRequestStatus,
    pub submitted_at: String,
    pub resolved_at: Option<String>,
}

/// Row in the submitter's own request history.
#[derive(Debug, Clone)]
pub struct OwnRequest {
    pub id: i64,
    pub innovation_id: i64,
    pub innovation_title: String,
    pub status: UpdateRequestStatus,
    pub submitted_at: String,
    pub resolved_at: Option<String>,
}

/// Result of an approval: the storage keys displaced from the live image
/// set, already removed from the database and deleted from the blob store.
#[derive(Debug)]
pub struct ApprovalOutcome {
    pub innovation_id: i64,
    pub displaced_keys: Vec<String>,
}
