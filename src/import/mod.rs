pub mod batch_import;
pub mod preview;

pub use batch_import::{BatchImporter, BatchPhase, ImportReport, PropertyBatch};
pub use preview::PreviewNavigator;
