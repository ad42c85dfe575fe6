use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use log::{error, info, warn};
use serde_json::Value;

use crate::clients::PropertyBackend;
use crate::models::image::ImageBlob;
use crate::models::property::DraftProperty;
use crate::staging;
use crate::validation;

/// How long the CLI lingers on the summary before navigating away.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(2000);

/// Lifecycle of a batch. Rows only change while collecting; submission is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Collecting,
    Previewing,
    Submitting,
    Done,
}

/// Per-batch counters, frozen once the batch finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// An ordered collection of drafts undergoing bulk import.
#[derive(Debug, Default)]
pub struct PropertyBatch {
    rows: Vec<DraftProperty>,
    phase: BatchPhase,
}

impl Default for BatchPhase {
    fn default() -> BatchPhase {
        BatchPhase::Collecting
    }
}

impl PropertyBatch {
    pub fn new() -> PropertyBatch {
        PropertyBatch::default()
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn rows(&self) -> &[DraftProperty] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add_row(&mut self, draft: DraftProperty) -> Result<()> {
        self.ensure_collecting()?;
        self.rows.push(draft);
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> Result<DraftProperty> {
        self.ensure_collecting()?;
        if index >= self.rows.len() {
            return Err(anyhow!("no row at position {}", index));
        }
        Ok(self.rows.remove(index))
    }

    /// Wholesale-replaces the rows from a JSON blob. The input must be an
    /// array of objects; anything else leaves the batch untouched.
    pub fn replace_from_json(&mut self, text: &str) -> Result<usize> {
        self.ensure_collecting()?;

        let value: Value =
            serde_json::from_str(text).map_err(|e| anyhow!("invalid JSON: {}", e))?;
        let items = match value {
            Value::Array(items) => items,
            _ => return Err(anyhow!("invalid JSON: expected an array of properties")),
        };

        let mut rows: Vec<DraftProperty> = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            if !item.is_object() {
                return Err(anyhow!("invalid JSON: entry {} is not an object", index + 1));
            }
            let draft: DraftProperty = serde_json::from_value(item)
                .map_err(|e| anyhow!("invalid JSON at entry {}: {}", index + 1, e))?;
            rows.push(draft);
        }

        info!("Replacing batch rows with {} imported drafts", rows.len());
        self.rows = rows;
        Ok(self.rows.len())
    }

    /// Moves a non-empty batch into the preview gate. Nothing is persisted
    /// until the preview is confirmed.
    pub fn begin_preview(&mut self) -> Result<()> {
        self.ensure_collecting()?;
        if self.rows.is_empty() {
            return Err(anyhow!("add at least one property before submitting"));
        }
        self.phase = BatchPhase::Previewing;
        Ok(())
    }

    /// Cancels the preview and discards every row.
    pub fn discard(&mut self) {
        self.rows.clear();
        self.phase = BatchPhase::Collecting;
    }

    fn ensure_collecting(&self) -> Result<()> {
        if self.phase != BatchPhase::Collecting {
            return Err(anyhow!("the batch is no longer collecting rows"));
        }
        Ok(())
    }
}

/// Runs a previewed batch against the backend, row by row.
pub struct BatchImporter<'a> {
    backend: &'a dyn PropertyBackend,
}

impl<'a> BatchImporter<'a> {
    pub fn new(backend: &'a dyn PropertyBackend) -> BatchImporter<'a> {
        BatchImporter { backend }
    }

    /// Submits every row sequentially: required-field gate, image staging,
    /// then the create call. A failing row is counted and skipped, never
    /// aborting its siblings, and failed rows are not retried.
    pub async fn submit(&self, batch: &mut PropertyBatch) -> Result<ImportReport> {
        if batch.phase != BatchPhase::Previewing {
            return Err(anyhow!("confirm the preview before submitting the batch"));
        }
        batch.phase = BatchPhase::Submitting;

        let mut report = ImportReport::default();
        let total = batch.rows.len();

        for (index, row) in batch.rows.iter_mut().enumerate() {
            info!("Submitting property {} of {}", index + 1, total);

            if let Err(e) = validation::check_price(row) {
                warn!("Row {} rejected: {}", index + 1, e);
                report.failed += 1;
                continue;
            }
            if let Err(e) = validation::check_required_fields(row) {
                warn!("Row {} rejected: {}", index + 1, e);
                report.failed += 1;
                continue;
            }

            let blobs = match load_row_images(row) {
                Ok(blobs) => blobs,
                Err(e) => {
                    error!("Failed to read images for row {}: {}", index + 1, e);
                    report.failed += 1;
                    continue;
                }
            };

            match staging::stage_images(self.backend, &blobs).await {
                Ok(staged) => row.images = staged,
                Err(e) => {
                    error!("Failed to stage images for row {}: {}", index + 1, e);
                    report.failed += 1;
                    continue;
                }
            }

            match self.backend.create_property(row).await {
                Ok(id) => {
                    info!("Created property {} from row {}", id, index + 1);
                    report.succeeded += 1;
                }
                Err(e) => {
                    error!("Failed to create property from row {}: {}", index + 1, e);
                    report.failed += 1;
                }
            }
        }

        batch.phase = BatchPhase::Done;
        info!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded, report.failed
        );
        Ok(report)
    }
}

fn load_row_images(row: &DraftProperty) -> Result<Vec<ImageBlob>> {
    row.image_files
        .iter()
        .map(|path| ImageBlob::from_path(Path::new(path)))
        .collect()
}
