mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use notehub::commands;
use notehub::db::SqliteStorage;
use notehub::form::{FormPhase, SubmitOutcome};
use notehub::types::{CreateNoteRequest, FormFields, NoteDraft, NoteField, NotesQuery, Tag};
use notehub::validation::MSG_TITLE_MIN;

use common::{app, memory_app, FakeApi};

async fn fill(state: &notehub::AppMutex, title: &str, content: &str, tag: &str) {
    commands::update_field(state, NoteField::Title, title.into()).await;
    commands::update_field(state, NoteField::Content, content.into()).await;
    commands::update_field(state, NoteField::Tag, tag.into()).await;
}

#[tokio::test]
async fn short_title_is_rejected_without_calling_api() {
    let api = Arc::new(FakeApi::default());
    let state = memory_app(api.clone());
    commands::mount_form(&state).await;
    fill(&state, "Hi", "", "Todo").await;

    let outcome = commands::submit_note(&state).await;

    match outcome {
        SubmitOutcome::Invalid { errors } => {
            assert_eq!(errors.first(NoteField::Title), Some(MSG_TITLE_MIN));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(api.creates(), 0);
    let s = state.lock().await;
    assert_eq!(s.form.drafts().draft().title, "Hi");
    assert!(!s.form.is_submitting());
}

#[tokio::test]
async fn valid_note_is_sent_once_and_form_resets() {
    let api = Arc::new(FakeApi::default());
    let state = memory_app(api.clone());
    commands::mount_form(&state).await;

    let page = commands::list_notes(&state, NotesQuery::default()).await.unwrap();
    assert_eq!(page.total_pages, 1);
    assert_eq!(state.lock().await.notes_cache.len(), 1);

    fill(&state, "Buy milk", "", "Shopping").await;
    let outcome = commands::submit_note(&state).await;

    let SubmitOutcome::Created { note } = outcome else {
        panic!("note was not created");
    };
    assert_eq!(note.title, "Buy milk");
    assert_eq!(api.creates(), 1);
    assert_eq!(
        api.requests.lock().unwrap().as_slice(),
        &[CreateNoteRequest {
            title: "Buy milk".into(),
            content: String::new(),
            tag: Tag::Shopping,
        }]
    );

    let s = state.lock().await;
    assert_eq!(s.form.fields(), &FormFields::default());
    assert!(!s.form.drafts().has_draft());
    assert!(s.notes_cache.is_empty());
}

#[tokio::test]
async fn rejected_request_keeps_fields_and_draft() {
    let api = Arc::new(FakeApi::default());
    api.fail_create.store(true, Ordering::SeqCst);
    let state = memory_app(api.clone());
    commands::mount_form(&state).await;
    fill(&state, "Buy milk", "", "Shopping").await;

    let outcome = commands::submit_note(&state).await;

    assert!(matches!(outcome, SubmitOutcome::Failed { .. }), "{outcome:?}");
    let snapshot = commands::form_state(&state).await;
    assert_eq!(snapshot.title, "Buy milk");
    assert_eq!(snapshot.tag, "Shopping");
    assert!(!snapshot.is_submitting);
    assert!(snapshot.has_draft);

    // The user can retry without retyping.
    api.fail_create.store(false, Ordering::SeqCst);
    let retry = commands::submit_note(&state).await;
    assert!(matches!(retry, SubmitOutcome::Created { .. }));
    assert_eq!(api.creates(), 2);
}

#[tokio::test]
async fn double_submit_sends_one_request() {
    let api = Arc::new(FakeApi::default());
    api.hold.store(true, Ordering::SeqCst);
    let state = memory_app(api.clone());
    commands::mount_form(&state).await;
    fill(&state, "Buy milk", "", "Shopping").await;

    let first = tokio::spawn({
        let state = state.clone();
        async move { commands::submit_note(&state).await }
    });
    api.entered.notified().await;

    let snapshot = commands::form_state(&state).await;
    assert!(snapshot.is_submitting);
    assert_eq!(snapshot.phase, FormPhase::Submitting);
    assert_eq!(commands::submit_note(&state).await, SubmitOutcome::Busy);

    api.release.notify_one();
    let outcome = first.await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Created { .. }));
    assert_eq!(api.creates(), 1);
}

#[tokio::test]
async fn result_arriving_after_close_is_dropped() {
    let api = Arc::new(FakeApi::default());
    api.hold.store(true, Ordering::SeqCst);
    let state = memory_app(api.clone());
    commands::mount_form(&state).await;
    fill(&state, "Buy milk", "", "Shopping").await;

    let pending = tokio::spawn({
        let state = state.clone();
        async move { commands::submit_note(&state).await }
    });
    api.entered.notified().await;
    commands::unmount_form(&state).await;
    api.release.notify_one();

    assert_eq!(pending.await.unwrap(), SubmitOutcome::Ignored);
    {
        let s = state.lock().await;
        assert!(!s.form.is_mounted());
        assert_eq!(s.form.fields().title, "Buy milk");
    }

    // The note exists remotely, so reopening the form must not offer it again.
    let snapshot = commands::mount_form(&state).await;
    assert!(!snapshot.has_draft);
    assert_eq!(snapshot.title, "");
    api.hold.store(false, Ordering::SeqCst);
    assert!(matches!(commands::submit_note(&state).await, SubmitOutcome::Invalid { .. }));
    assert_eq!(api.creates(), 1);
}

#[tokio::test]
async fn reopened_form_shows_no_stale_errors() {
    let api = Arc::new(FakeApi::default());
    let state = memory_app(api.clone());
    commands::mount_form(&state).await;
    commands::update_field(&state, NoteField::Title, "Hi".into()).await;
    assert!(matches!(commands::submit_note(&state).await, SubmitOutcome::Invalid { .. }));

    commands::unmount_form(&state).await;
    let snapshot = commands::mount_form(&state).await;
    assert!(snapshot.errors.is_empty(), "{:?}", snapshot.errors);
    assert_eq!(snapshot.title, "Hi");

    // Without a draft the reopened form is blank.
    commands::discard_draft(&state).await;
    commands::update_field(&state, NoteField::Title, "Hi".into()).await;
    state.lock().await.form.drafts_mut().clear_draft();
    commands::unmount_form(&state).await;
    let snapshot = commands::mount_form(&state).await;
    assert_eq!(snapshot.title, "");
    assert!(snapshot.errors.is_empty());
}

#[tokio::test]
async fn abandoned_submit_does_not_leave_form_busy() {
    let api = Arc::new(FakeApi::default());
    api.hold.store(true, Ordering::SeqCst);
    let state = memory_app(api.clone());
    commands::mount_form(&state).await;
    fill(&state, "Buy milk", "", "Shopping").await;

    let pending = tokio::spawn({
        let state = state.clone();
        async move { commands::submit_note(&state).await }
    });
    api.entered.notified().await;
    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());

    let snapshot = commands::form_state(&state).await;
    assert!(!snapshot.is_submitting);
    assert_eq!(snapshot.phase, FormPhase::Idle);

    api.hold.store(false, Ordering::SeqCst);
    let retry = commands::submit_note(&state).await;
    assert!(matches!(retry, SubmitOutcome::Created { .. }), "{retry:?}");
    assert_eq!(api.creates(), 2);
}

#[tokio::test]
async fn cached_pages_skip_the_network() {
    let api = Arc::new(FakeApi::default());
    let state = memory_app(api.clone());
    let query = NotesQuery::for_filter("Work");

    commands::list_notes(&state, query.clone()).await.unwrap();
    commands::list_notes(&state, query.clone()).await.unwrap();
    assert_eq!(api.fetches(), 1);

    commands::list_notes(&state, query.with_page(2)).await.unwrap();
    assert_eq!(api.fetches(), 2);
}

#[tokio::test]
async fn draft_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notehub.sqlite");

    {
        let storage = Arc::new(SqliteStorage::open(&path).unwrap());
        let state = app(storage, Arc::new(FakeApi::default()));
        commands::mount_form(&state).await;
        fill(&state, "Quarterly review", "agenda", "Meeting").await;
        commands::cancel_form(&state).await;
    }

    let storage = Arc::new(SqliteStorage::open(&path).unwrap());
    let state = app(storage, Arc::new(FakeApi::default()));
    let snapshot = commands::mount_form(&state).await;
    assert_eq!(snapshot.title, "Quarterly review");
    assert_eq!(snapshot.content, "agenda");
    assert_eq!(snapshot.tag, "Meeting");
}

#[tokio::test]
async fn discarded_draft_is_not_restored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notehub.sqlite");

    {
        let storage = Arc::new(SqliteStorage::open(&path).unwrap());
        let state = app(storage, Arc::new(FakeApi::default()));
        commands::mount_form(&state).await;
        fill(&state, "Scratch", "", "Work").await;
        commands::discard_draft(&state).await;
    }

    let storage = Arc::new(SqliteStorage::open(&path).unwrap());
    let state = app(storage, Arc::new(FakeApi::default()));
    let snapshot = commands::mount_form(&state).await;
    assert!(!snapshot.has_draft);
    assert_eq!(snapshot.title, "");
    assert_eq!(snapshot.tag, "Todo");
    assert_eq!(state.lock().await.form.drafts().draft(), &NoteDraft::default());
}
