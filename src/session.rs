use anyhow::Result;
use log::info;

use crate::clients::{PropertyBackend, PropertyPage};
use crate::models::image::ImageBlob;
use crate::models::property::StagedImage;
use crate::staging::{self, StagingError};

/// Mutable state of one admin session: the image selection being prepared
/// for a property and the listing pagination cursor. The confirmed-images
/// list has a single writer, the confirmation step; changing the file
/// selection always clears it.
#[derive(Debug, Default)]
pub struct AdminSession {
    pending_files: Vec<ImageBlob>,
    confirmed_images: Vec<StagedImage>,
    current_page: u32,
    total_pages: u32,
}

impl AdminSession {
    pub fn new() -> AdminSession {
        AdminSession {
            current_page: 1,
            ..Default::default()
        }
    }

    /// Replaces the file selection after checking it against the upload
    /// constraints. Any previous confirmation is dropped either way; a
    /// rejected selection leaves nothing pending.
    pub fn select_files(&mut self, blobs: Vec<ImageBlob>) -> Result<(), StagingError> {
        self.confirmed_images.clear();
        if let Err(e) = staging::check_selection(&blobs) {
            self.pending_files.clear();
            return Err(e);
        }
        self.pending_files = blobs;
        Ok(())
    }

    pub fn pending_files(&self) -> &[ImageBlob] {
        &self.pending_files
    }

    /// Stages the pending selection and records the returned references as
    /// confirmed. On failure the confirmed list stays empty.
    pub async fn confirm_upload(&mut self, backend: &dyn PropertyBackend) -> Result<usize> {
        let staged = staging::stage_images(backend, &self.pending_files).await?;
        info!("Confirmed {} staged images", staged.len());
        self.confirmed_images = staged;
        Ok(self.confirmed_images.len())
    }

    pub fn confirmed_images(&self) -> &[StagedImage] {
        &self.confirmed_images
    }

    /// Drops both the selection and the confirmation, used after a
    /// successful save.
    pub fn clear_images(&mut self) {
        self.pending_files.clear();
        self.confirmed_images.clear();
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Updates the pagination counters from a listing response, clamping
    /// the cursor into the new range.
    pub fn apply_page(&mut self, page: &PropertyPage) {
        self.total_pages = page.total_pages as u32;
        if self.total_pages == 0 {
            self.current_page = 1;
        } else if self.current_page > self.total_pages {
            self.current_page = self.total_pages;
        }
    }

    /// Resets to the first page, used whenever a filter changes.
    pub fn reset_page(&mut self) {
        self.current_page = 1;
    }

    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }
}
