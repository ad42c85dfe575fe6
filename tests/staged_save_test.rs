mod common;

use common::{record, staged, valid_draft, BackendCall, MockBackend};
use imovia::save::{ProgressSink, SaveMode, StagedSave};

/// Sink that records every report for later inspection.
#[derive(Default)]
struct RecordingSink {
    reports: Vec<(u8, String, bool)>,
}

impl ProgressSink for RecordingSink {
    fn report(&mut self, percent: u8, status: &str, done: bool) {
        self.reports.push((percent, status.to_string(), done));
    }
}

impl RecordingSink {
    fn percents(&self) -> Vec<u8> {
        self.reports.iter().map(|(p, _, _)| *p).collect()
    }
}

#[tokio::test]
async fn test_create_runs_both_phases_in_order() {
    let backend = MockBackend::new();
    *backend.next_id.lock().unwrap() = 11;
    let mut sink = RecordingSink::default();

    let outcome = StagedSave::new(&backend)
        .run(
            SaveMode::Create,
            &valid_draft("AP1"),
            &[staged("a"), staged("b")],
            &mut sink,
        )
        .await
        .unwrap();

    assert_eq!(outcome.property_id, 11);
    assert_eq!(outcome.warning, None);
    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::ListAllProperties,
            BackendCall::CreateProperty("AP1".to_string()),
            BackendCall::AssociateImages(11, 2),
            BackendCall::PropertyImages(11),
        ]
    );

    // percent indicator only ever increases and the last report is terminal
    let percents = sink.percents();
    assert_eq!(percents, vec![5, 10, 90, 100]);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert!(sink.reports.last().unwrap().2);
}

#[tokio::test]
async fn test_draft_is_sent_with_images_forced_empty() {
    let backend = MockBackend::new();
    let mut draft = valid_draft("AP1");
    draft.images = vec![staged("stale")];
    let mut sink = RecordingSink::default();

    StagedSave::new(&backend)
        .run(SaveMode::Create, &draft, &[staged("a")], &mut sink)
        .await
        .unwrap();

    // the create call went out without images, the association call
    // carried the confirmed selection
    assert!(backend.created_drafts.lock().unwrap()[0].images.is_empty());
    assert!(backend
        .calls()
        .contains(&BackendCall::AssociateImages(1, 1)));
}

#[tokio::test]
async fn test_missing_confirmed_images_is_rejected_before_any_network_call() {
    let backend = MockBackend::new();
    let mut sink = RecordingSink::default();

    let err = StagedSave::new(&backend)
        .run(SaveMode::Create, &valid_draft("AP1"), &[], &mut sink)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("confirm the images"));
    assert!(backend.calls().is_empty());
    assert!(sink.reports.is_empty());
}

#[tokio::test]
async fn test_code_collision_blocks_the_create_call() {
    let backend = MockBackend::with_existing(vec![record(7, "AP100")]);
    let mut sink = RecordingSink::default();

    let err = StagedSave::new(&backend)
        .run(SaveMode::Create, &valid_draft("ap100"), &[staged("a")], &mut sink)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert_eq!(backend.calls(), vec![BackendCall::ListAllProperties]);
}

#[tokio::test]
async fn test_failed_create_never_reaches_the_association_phase() {
    let mut backend = MockBackend::new();
    backend.fail_create = true;
    let mut sink = RecordingSink::default();

    let err = StagedSave::new(&backend)
        .run(SaveMode::Create, &valid_draft("AP1"), &[staged("a")], &mut sink)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("failed to save the property"));
    let calls = backend.calls();
    assert!(calls.contains(&BackendCall::CreateProperty("AP1".to_string())));
    assert!(!calls
        .iter()
        .any(|c| matches!(c, BackendCall::AssociateImages(_, _))));
    // terminal error report unblocks the close action
    assert!(sink.reports.last().unwrap().2);
}

#[tokio::test]
async fn test_association_failure_leaves_the_property_persisted() {
    let mut backend = MockBackend::new();
    backend.fail_associate = true;
    *backend.next_id.lock().unwrap() = 42;
    let mut sink = RecordingSink::default();

    let err = StagedSave::new(&backend)
        .run(SaveMode::Create, &valid_draft("AP1"), &[staged("a")], &mut sink)
        .await
        .unwrap_err();

    // property 42 exists, the error names the association, and no second
    // create call was issued
    assert!(err.to_string().contains("image association failed"));
    assert!(err.to_string().contains("42"));
    assert_eq!(backend.created_count(), 1);
    assert_eq!(*backend.next_id.lock().unwrap(), 43);
    assert!(sink.reports.last().unwrap().2);
}

#[tokio::test]
async fn test_silent_empty_association_surfaces_a_warning() {
    // the backend accepts the association but silently drops the images;
    // the save still succeeds, with a non-fatal warning attached
    let mut backend = MockBackend::new();
    backend.drop_associated = true;
    let mut sink = RecordingSink::default();

    let outcome = StagedSave::new(&backend)
        .run(SaveMode::Create, &valid_draft("AP1"), &[staged("a")], &mut sink)
        .await
        .unwrap();

    let warning = outcome.warning.expect("expected a verification warning");
    assert!(warning.contains("no images"));
    assert_eq!(sink.percents(), vec![5, 10, 90, 100]);
}

#[tokio::test]
async fn test_edit_updates_in_place_and_skips_the_collision_scan() {
    let backend = MockBackend::with_existing(vec![record(9, "AP9")]);
    let mut sink = RecordingSink::default();

    let outcome = StagedSave::new(&backend)
        .run(SaveMode::Edit(9), &valid_draft("AP9"), &[staged("new")], &mut sink)
        .await
        .unwrap();

    assert_eq!(outcome.property_id, 9);
    let calls = backend.calls();
    assert!(!calls.contains(&BackendCall::ListAllProperties));
    assert!(calls.contains(&BackendCall::UpdateProperty(9)));
    assert!(calls.contains(&BackendCall::AssociateImages(9, 1)));
}

#[tokio::test]
async fn test_edit_without_new_images_keeps_the_existing_ones() {
    let backend = MockBackend::new();
    let mut sink = RecordingSink::default();

    let outcome = StagedSave::new(&backend)
        .run(SaveMode::Edit(9), &valid_draft("AP9"), &[], &mut sink)
        .await
        .unwrap();

    assert_eq!(outcome.property_id, 9);
    assert!(!backend
        .calls()
        .iter()
        .any(|c| matches!(c, BackendCall::AssociateImages(_, _))));
    assert_eq!(sink.percents(), vec![5, 90, 100]);
}
