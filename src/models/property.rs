use serde::de;
use serde::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_this_or_that::{as_bool, as_string, as_u64};

/// Listing types accepted by the backend (wire field `type`).
pub const LISTING_TYPES: [&str; 3] = ["sale", "rent", "launch"];

/// Lifecycle states of a listing.
pub const STATUSES: [&str; 3] = ["active", "inactive", "sold"];

/// Fixed property-type vocabulary.
pub const PROPERTY_TYPES: [&str; 6] = [
    "apartment",
    "house",
    "penthouse",
    "commercial",
    "land",
    "warehouse",
];

/// Furnished states.
pub const FURNISHED_STATES: [&str; 3] = ["no", "yes", "partial"];

/// Amenity vocabulary offered by the admin form.
pub const AMENITIES: [&str; 8] = [
    "pool",
    "gym",
    "playground",
    "barbecue",
    "security",
    "spa",
    "garden",
    "elevator",
];

/// A temporarily stored image reference returned by the staging endpoint.
/// Owned by the draft until the association call hands it to the backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StagedImage {
    #[serde(default, deserialize_with = "as_string")]
    pub id: String,
    pub url: String,
}

/// A video attachment, a URL plus an optional human title.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct VideoLink {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// An unpersisted property held client-side. Field values stay loosely typed
/// strings until the validation gate checks them, which keeps bulk JSON
/// imports tolerant of the number-or-string shapes the admin form produces.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DraftProperty {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub code: String,
    #[serde(rename = "type", default)]
    pub listing_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub property_type: String,
    #[serde(default, deserialize_with = "price_number_or_string")]
    pub price: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default, deserialize_with = "as_u64")]
    pub area: u64,
    #[serde(default, deserialize_with = "as_u64")]
    pub bedrooms: u64,
    #[serde(default, deserialize_with = "as_u64")]
    pub bathrooms: u64,
    #[serde(default, deserialize_with = "as_u64")]
    pub parking_spaces: u64,
    #[serde(default, deserialize_with = "as_u64")]
    pub suites: u64,
    #[serde(default)]
    pub furnished: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "as_bool")]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<StagedImage>,
    #[serde(default, deserialize_with = "videos_url_or_pair")]
    pub videos: Vec<VideoLink>,
    // Local file paths backing the row's image selection. Client-only,
    // never sent to the backend.
    #[serde(default, rename = "image_files", skip_serializing)]
    pub image_files: Vec<String>,
}

impl DraftProperty {
    /// Parsed price, when the field holds a number.
    pub fn price_value(&self) -> Option<f64> {
        self.price.trim().parse::<f64>().ok()
    }
}

// Custom deserialization for price as it can be int or String
fn price_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(num) => num.to_string(),
        Value::Null => String::new(),
        _ => return Err(de::Error::custom("wrong type for price")),
    })
}

// Videos arrive either as bare URL strings or as {url, title} objects
fn videos_url_or_pair<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<VideoLink>, D::Error> {
    let raw: Vec<Value> = Vec::deserialize(deserializer)?;
    let mut videos: Vec<VideoLink> = Vec::new();
    for item in raw {
        match item {
            Value::String(url) => videos.push(VideoLink {
                url,
                title: String::new(),
            }),
            Value::Object(_) => {
                let video: VideoLink =
                    serde_json::from_value(item).map_err(de::Error::custom)?;
                videos.push(video);
            }
            _ => return Err(de::Error::custom("wrong type for video entry")),
        }
    }
    Ok(videos)
}

/// A persisted listing as the backend returns it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PropertyRecord {
    #[serde(deserialize_with = "as_u64")]
    pub id: u64,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub listing_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub property_type: String,
    #[serde(default, deserialize_with = "price_number_or_string")]
    pub price: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Aggregate counters shown on the admin dashboard.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default, deserialize_with = "as_u64")]
    pub total_properties: u64,
    #[serde(default, deserialize_with = "as_u64")]
    pub featured_properties: u64,
    #[serde(default, deserialize_with = "as_u64")]
    pub total_messages: u64,
    #[serde(default, deserialize_with = "as_u64")]
    pub unread_messages: u64,
}
