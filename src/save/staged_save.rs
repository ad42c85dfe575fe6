use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use crate::clients::PropertyBackend;
use crate::models::property::{DraftProperty, StagedImage};
use crate::validation::{self, ValidationError};

/// How long the CLI lingers on the success message before navigating away.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Create a new property or update an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Edit(u64),
}

/// Receives progress updates while the save protocol runs. The reported
/// percentage only ever increases; `done` unblocks the close action.
pub trait ProgressSink {
    fn report(&mut self, percent: u8, status: &str, done: bool);
}

/// Sink that forwards progress to the logger.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, percent: u8, status: &str, done: bool) {
        if done {
            info!("[{}%] {} (done)", percent, status);
        } else {
            info!("[{}%] {}", percent, status);
        }
    }
}

/// Result of a completed save: the persisted id plus an optional non-fatal
/// warning from the post-success verification.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub property_id: u64,
    pub warning: Option<String>,
}

/// Two-phase save protocol for a single property: persist the record without
/// images, then associate the previously confirmed staged images. There is
/// no rollback; a phase-2 failure leaves the property persisted without
/// images and is reported as such.
pub struct StagedSave<'a> {
    backend: &'a dyn PropertyBackend,
}

impl<'a> StagedSave<'a> {
    pub fn new(backend: &'a dyn PropertyBackend) -> StagedSave<'a> {
        StagedSave { backend }
    }

    /// Runs the preconditions and both phases. Phase 2 is never attempted
    /// when phase 1 fails.
    pub async fn run(
        &self,
        mode: SaveMode,
        draft: &DraftProperty,
        confirmed_images: &[StagedImage],
        progress: &mut dyn ProgressSink,
    ) -> Result<SaveOutcome> {
        self.check_preconditions(mode, draft, confirmed_images)
            .await?;

        // Phase 1: persist the record, images forced empty
        let editing = matches!(mode, SaveMode::Edit(_));
        progress.report(
            5,
            if editing {
                "Sending updated property data..."
            } else {
                "Sending property data..."
            },
            false,
        );

        let mut record = draft.clone();
        record.images = Vec::new();

        let property_id = match mode {
            SaveMode::Create => match self.backend.create_property(&record).await {
                Ok(id) => {
                    info!("Created property {}", id);
                    id
                }
                Err(e) => {
                    progress.report(5, &format!("Failed to save the property: {}", e), true);
                    return Err(e.context("failed to save the property"));
                }
            },
            SaveMode::Edit(id) => {
                if let Err(e) = self.backend.update_property(id, &record).await {
                    progress.report(5, &format!("Failed to save the property: {}", e), true);
                    return Err(e.context("failed to save the property"));
                }
                info!("Updated property {}", id);
                id
            }
        };

        // Phase 2: hand the staged references over to the persisted record.
        // An edit without a new selection keeps its existing images.
        let warning = if confirmed_images.is_empty() && editing {
            progress.report(90, "No new images to associate", false);
            None
        } else {
            progress.report(10, "Associating images with the property...", false);
            if let Err(e) = self
                .backend
                .associate_images(property_id, confirmed_images)
                .await
            {
                progress.report(
                    10,
                    &format!("Failed to associate images with the property: {}", e),
                    true,
                );
                return Err(e.context(format!(
                    "property {} was saved but the image association failed",
                    property_id
                )));
            }
            progress.report(90, "Images associated with the property", false);

            self.verify_images(property_id).await
        };

        progress.report(
            100,
            if editing {
                "Property update finished successfully"
            } else {
                "Property registration finished successfully"
            },
            true,
        );

        Ok(SaveOutcome {
            property_id,
            warning,
        })
    }

    async fn check_preconditions(
        &self,
        mode: SaveMode,
        draft: &DraftProperty,
        confirmed_images: &[StagedImage],
    ) -> Result<()> {
        match mode {
            SaveMode::Create => {
                validation::check_price(draft)?;
                validation::check_required_fields(draft)?;
                // Edits keep their already-associated images; only creation
                // demands a confirmed selection. Checked before the code
                // scan so the rejection happens without any network call.
                if confirmed_images.is_empty() {
                    return Err(ValidationError::NoConfirmedImages.into());
                }
                validation::check_code_available(self.backend, &draft.code).await?;
            }
            SaveMode::Edit(_) => validation::validate_for_edit(draft)?,
        }
        Ok(())
    }

    /// Best-effort check that the association actually took. Failure here
    /// never changes the terminal success state.
    async fn verify_images(&self, property_id: u64) -> Option<String> {
        match self.backend.property_images(property_id).await {
            Ok(images) if images.is_empty() => {
                let message = format!(
                    "no images ended up associated with property {}, check the upload",
                    property_id
                );
                warn!("{}", message);
                Some(message)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(
                    "Could not verify the images of property {}: {}",
                    property_id, e
                );
                None
            }
        }
    }
}
