use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{error, info};
use rand::Rng;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_this_or_that::as_u64;

use crate::config::Config;
use crate::models::image::ImageBlob;
use crate::models::property::{DashboardStats, DraftProperty, PropertyRecord, StagedImage};

use super::PropertyBackend;

// The availability probe uses its own short deadline instead of the
// configured request timeout.
const PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Deserialize)]
struct TempUploadResponse {
    success: bool,
    #[serde(default)]
    images: Vec<StagedImage>,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    #[serde(deserialize_with = "as_u64")]
    id: u64,
}

#[derive(Debug, Deserialize)]
struct PropertyImagesResponse {
    #[serde(default)]
    images: Vec<StagedImage>,
}

// The listing endpoint answers with pagination metadata, or with a bare
// array on older backends.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingResponse {
    Paged {
        properties: Vec<PropertyRecord>,
        #[serde(deserialize_with = "as_u64")]
        total: u64,
        #[serde(rename = "totalPages", deserialize_with = "as_u64")]
        total_pages: u64,
    },
    Bare(Vec<PropertyRecord>),
}

/// One page of the property listing.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyPage {
    pub properties: Vec<PropertyRecord>,
    pub total: u64,
    pub total_pages: u64,
}

/// Filter and pagination parameters for the listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct PropertyQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub listing_type: Option<String>,
    pub status: Option<String>,
}

/// Client for the admin REST API.
#[derive(Debug, Clone)]
pub struct AdminApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl AdminApiClient {
    pub fn new(config: &Config) -> Result<AdminApiClient> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(AdminApiClient {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Checks whether the backend answers within the fixed probe timeout.
    /// A random query parameter defeats intermediary caches.
    pub async fn probe_server(&self) -> bool {
        let num: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        let rand_param = num.to_string();
        let params: Vec<(&str, &str)> = vec![("rand", &rand_param)];

        let response = self
            .client
            .get(self.url("/admin/dashboard-stats"))
            .query(&params)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match response {
            Ok(re) => re.status().is_success(),
            Err(e) => {
                error!("Server probe failed: {}", e);
                false
            }
        }
    }

    /// Paginated and filtered listing, with the bare-array fallback mapped
    /// into a single synthetic page.
    pub async fn list_properties(&self, query: &PropertyQuery) -> Result<PropertyPage> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(listing_type) = &query.listing_type {
            params.push(("type", listing_type.clone()));
        }
        if let Some(status) = &query.status {
            params.push(("status", status.clone()));
        }

        let response = self
            .client
            .get(self.url("/admin/properties"))
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to load properties: backend answered {}",
                response.status()
            ));
        }

        let listing: ListingResponse = response.json().await?;
        let limit = query.limit.max(1) as u64;
        let page = match listing {
            ListingResponse::Paged {
                properties,
                total,
                total_pages,
            } => PropertyPage {
                properties,
                total,
                total_pages,
            },
            ListingResponse::Bare(properties) => {
                let total = properties.len() as u64;
                PropertyPage {
                    properties,
                    total,
                    total_pages: (total + limit - 1) / limit,
                }
            }
        };

        Ok(page)
    }

    /// A single persisted property, used when loading the edit form.
    pub async fn get_property(&self, id: u64) -> Result<PropertyRecord> {
        let response = self
            .client
            .get(self.url(&format!("/properties/{}", id)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("property {} not found", id));
        }

        Ok(response.json().await?)
    }

    pub async fn delete_property(&self, id: u64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/admin/properties/{}", id)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to delete property {}: backend answered {}",
                id,
                response.status()
            ));
        }

        info!("Deleted property {}", id);
        Ok(())
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let response = self
            .client
            .get(self.url("/admin/dashboard-stats"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to load dashboard stats: backend answered {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PropertyBackend for AdminApiClient {
    async fn upload_temp_images(&self, blobs: &[ImageBlob]) -> Result<Vec<StagedImage>> {
        let mut form = Form::new();
        for blob in blobs {
            let part = Part::bytes(blob.bytes.clone())
                .file_name(blob.name.clone())
                .mime_str(&blob.mime)?;
            form = form.part("images", part);
        }

        let response = self
            .client
            .post(self.url("/admin/properties/images/temp"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "image upload failed: backend answered {}",
                response.status()
            ));
        }

        let upload: TempUploadResponse = response.json().await?;
        if !upload.success {
            return Err(anyhow!("image upload was not accepted by the backend"));
        }

        Ok(upload.images)
    }

    async fn create_property(&self, draft: &DraftProperty) -> Result<u64> {
        let response = self
            .client
            .post(self.url("/admin/properties"))
            .json(draft)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to create property: backend answered {}",
                response.status()
            ));
        }

        let created: CreatedResponse = response.json().await?;
        Ok(created.id)
    }

    async fn update_property(&self, id: u64, draft: &DraftProperty) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("/admin/properties/{}", id)))
            .json(draft)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to update property {}: backend answered {}",
                id,
                response.status()
            ));
        }

        Ok(())
    }

    async fn associate_images(&self, id: u64, images: &[StagedImage]) -> Result<()> {
        let response = self
            .client
            .post(self.url(&format!("/admin/properties/{}/associate-images", id)))
            .json(&json!({ "images": images }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to associate images with property {}: backend answered {}",
                id,
                response.status()
            ));
        }

        Ok(())
    }

    async fn property_images(&self, id: u64) -> Result<Vec<StagedImage>> {
        let response = self
            .client
            .get(self.url(&format!("/admin/properties/{}/images", id)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to load images for property {}: backend answered {}",
                id,
                response.status()
            ));
        }

        let images: PropertyImagesResponse = response.json().await?;
        Ok(images.images)
    }

    async fn list_all_properties(&self) -> Result<Vec<PropertyRecord>> {
        let response = self
            .client
            .get(self.url("/admin/properties"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to load properties: backend answered {}",
                response.status()
            ));
        }

        let listing: ListingResponse = response.json().await?;
        Ok(match listing {
            ListingResponse::Paged { properties, .. } => properties,
            ListingResponse::Bare(properties) => properties,
        })
    }
}
