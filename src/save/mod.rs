pub mod staged_save;

pub use staged_save::{
    LogProgress, ProgressSink, SaveMode, SaveOutcome, StagedSave, REDIRECT_DELAY,
};
