pub mod image_stager;

pub use image_stager::{check_selection, stage_images, StagingError};
pub use image_stager::{MAX_FILES, MAX_FILE_BYTES, MAX_TOTAL_BYTES};
