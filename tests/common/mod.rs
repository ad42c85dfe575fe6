#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use imovia::clients::PropertyBackend;
use imovia::models::image::ImageBlob;
use imovia::models::property::{DraftProperty, PropertyRecord, StagedImage};

/// Calls observed by the mock backend, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    UploadTempImages(usize),
    CreateProperty(String),
    UpdateProperty(u64),
    AssociateImages(u64, usize),
    PropertyImages(u64),
    ListAllProperties,
}

/// In-memory stand-in for the REST backend. Each failure toggle makes the
/// matching operation reject; `fail_uploads_for` rejects only the first k
/// upload calls.
#[derive(Default)]
pub struct MockBackend {
    pub calls: Mutex<Vec<BackendCall>>,
    pub created_drafts: Mutex<Vec<DraftProperty>>,
    pub existing: Mutex<Vec<PropertyRecord>>,
    pub associated: Mutex<Vec<(u64, Vec<StagedImage>)>>,
    pub fail_uploads_for: Mutex<usize>,
    pub fail_create: bool,
    pub fail_update: bool,
    pub fail_associate: bool,
    // accept the association call but silently drop the images
    pub drop_associated: bool,
    pub fail_listing: bool,
    pub next_id: Mutex<u64>,
}

impl MockBackend {
    pub fn new() -> MockBackend {
        MockBackend {
            next_id: Mutex::new(1),
            ..Default::default()
        }
    }

    pub fn with_existing(records: Vec<PropertyRecord>) -> MockBackend {
        let backend = MockBackend::new();
        *backend.existing.lock().unwrap() = records;
        backend
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::CreateProperty(_)))
            .count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn record(id: u64, code: &str) -> PropertyRecord {
    PropertyRecord {
        id,
        code: code.to_string(),
        title: format!("Listing {}", code),
        listing_type: "sale".to_string(),
        status: "active".to_string(),
        property_type: "apartment".to_string(),
        price: "100000".to_string(),
        neighborhood: "Centro".to_string(),
        city: "Florianopolis".to_string(),
        created_at: None,
    }
}

pub fn valid_draft(code: &str) -> DraftProperty {
    DraftProperty {
        title: format!("Listing {}", code),
        code: code.to_string(),
        listing_type: "sale".to_string(),
        status: "active".to_string(),
        property_type: "apartment".to_string(),
        price: "100000".to_string(),
        neighborhood: "Centro".to_string(),
        city: "Florianopolis".to_string(),
        ..Default::default()
    }
}

pub fn staged(id: &str) -> StagedImage {
    StagedImage {
        id: id.to_string(),
        url: format!("/uploads/tmp/{}.jpg", id),
    }
}

#[async_trait]
impl PropertyBackend for MockBackend {
    async fn upload_temp_images(&self, blobs: &[ImageBlob]) -> Result<Vec<StagedImage>> {
        self.record(BackendCall::UploadTempImages(blobs.len()));
        let mut remaining = self.fail_uploads_for.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(anyhow!("image upload failed: backend answered 500"));
        }
        Ok(blobs
            .iter()
            .enumerate()
            .map(|(i, blob)| StagedImage {
                id: format!("tmp-{}", i),
                url: format!("/uploads/tmp/{}", blob.name),
            })
            .collect())
    }

    async fn create_property(&self, draft: &DraftProperty) -> Result<u64> {
        self.record(BackendCall::CreateProperty(draft.code.clone()));
        if self.fail_create {
            return Err(anyhow!("failed to create property: backend answered 500"));
        }
        self.created_drafts.lock().unwrap().push(draft.clone());
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        Ok(id)
    }

    async fn update_property(&self, id: u64, _draft: &DraftProperty) -> Result<()> {
        self.record(BackendCall::UpdateProperty(id));
        if self.fail_update {
            return Err(anyhow!("failed to update property: backend answered 500"));
        }
        Ok(())
    }

    async fn associate_images(&self, id: u64, images: &[StagedImage]) -> Result<()> {
        self.record(BackendCall::AssociateImages(id, images.len()));
        if self.fail_associate {
            return Err(anyhow!(
                "failed to associate images with property {}: backend answered 500",
                id
            ));
        }
        if !self.drop_associated {
            self.associated.lock().unwrap().push((id, images.to_vec()));
        }
        Ok(())
    }

    async fn property_images(&self, id: u64) -> Result<Vec<StagedImage>> {
        self.record(BackendCall::PropertyImages(id));
        let images = self
            .associated
            .lock()
            .unwrap()
            .iter()
            .filter(|(property_id, _)| *property_id == id)
            .flat_map(|(_, images)| images.clone())
            .collect();
        Ok(images)
    }

    async fn list_all_properties(&self) -> Result<Vec<PropertyRecord>> {
        self.record(BackendCall::ListAllProperties);
        if self.fail_listing {
            return Err(anyhow!("failed to load properties: backend answered 500"));
        }
        Ok(self.existing.lock().unwrap().clone())
    }
}
