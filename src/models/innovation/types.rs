use serde::Deserialize;

/// Full innovation record as stored.
#[derive(Debug, Clone)]
pub struct Innovation {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub features: String,
    pub potential_application: String,
    pub unique_value: String,
    pub origin: String,
    pub tiktok_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    pub facebook_url: Option<String>,
    pub web_url: Option<String>,
    pub profile_id: i64,
    pub created_at: String,
}

/// Data for creating or fully editing an innovation (admin authoring flow).
pub struct NewInnovation {
    pub title: String,
    pub overview: String,
    pub features: String,
    pub potential_application: String,
    pub unique_value: String,
    pub origin: String,
    pub tiktok_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    pub facebook_url: Option<String>,
    pub web_url: Option<String>,
    pub profile_id: i64,
}

/// A stored image resolved for display.
#[derive(Debug, Clone)]
pub struct ImageDisplay {
    pub storage_key: String,
    pub url: String,
}

/// Card in the public catalog and on the home page.
#[derive(Debug, Clone)]
pub struct InnovationCard {
    pub id: i64,
    pub title: String,
    pub overview_preview: String,
    pub origin: String,
    pub owner_name: String,
    pub cover_url: Option<String>,
}

/// Detail page payload: record plus resolved images and categories.
#[derive(Debug, Clone)]
pub struct InnovationDetail {
    pub innovation: Innovation,
    pub owner_name: String,
    pub images: Vec<ImageDisplay>,
    pub categories: Vec<crate::models::category::Category>,
}

/// Row in the admin innovation table.
#[derive(Debug, Clone)]
pub struct AdminInnovationRow {
    pub id: i64,
    pub title: String,
    pub owner_name: String,
    pub image_count: i64,
    pub created_at: String,
}

/// Catalog filtering options (search text and category).
#[derive(Debug, Default, serde::Deserialize)]
pub struct CatalogFilter {
    pub q: Option<String>,
    // The "All categories" select option submits an empty string
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<i64>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
