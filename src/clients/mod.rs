pub mod admin_client;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::image::ImageBlob;
use crate::models::property::{DraftProperty, PropertyRecord, StagedImage};

pub use admin_client::{AdminApiClient, PropertyPage, PropertyQuery};

/// Backend operations the orchestrators depend on. The REST client
/// implements this; tests run against an in-memory mock.
#[async_trait]
pub trait PropertyBackend: Send + Sync {
    /// Uploads files to the temporary store, returning staged references.
    async fn upload_temp_images(&self, blobs: &[ImageBlob]) -> Result<Vec<StagedImage>>;

    /// Creates a property and returns the new id.
    async fn create_property(&self, draft: &DraftProperty) -> Result<u64>;

    /// Updates an existing property.
    async fn update_property(&self, id: u64, draft: &DraftProperty) -> Result<()>;

    /// Links previously staged images to a persisted property.
    async fn associate_images(&self, id: u64, images: &[StagedImage]) -> Result<()>;

    /// Images currently associated with a property.
    async fn property_images(&self, id: u64) -> Result<Vec<StagedImage>>;

    /// The full unpaged listing, used for the code-collision scan.
    async fn list_all_properties(&self) -> Result<Vec<PropertyRecord>>;
}
