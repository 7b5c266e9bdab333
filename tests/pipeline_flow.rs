//! End-to-end behaviour of the outreach pipeline against fake collaborators.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use outreach_tracker::collab::types::Reminder;
use outreach_tracker::collab::{Enricher, Scheduler};
use outreach_tracker::pipeline::{
    AdvanceOutcome, ContactId, PipelineEngine, Stage, ViewState, WorkDay, FOLLOW_UP_DAYS,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct OkScheduler;

#[async_trait]
impl Scheduler for OkScheduler {
    async fn create(&self, _reminder: &Reminder) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct FlakyScheduler {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl Scheduler for FlakyScheduler {
    async fn create(&self, reminder: &Reminder) -> Result<()> {
        self.calls.lock().unwrap().push(reminder.title.clone());
        anyhow::bail!("calendar offline")
    }
}

/// Returns a canned answer and records the profile URLs it was given.
struct ScriptedEnricher {
    answer: Option<String>,
    fail: bool,
    calls: AtomicUsize,
    last_args: Mutex<Option<(String, String)>>,
}

impl ScriptedEnricher {
    fn answering(answer: Option<&str>) -> Self {
        Self {
            answer: answer.map(str::to_string),
            fail: false,
            calls: AtomicUsize::new(0),
            last_args: Mutex::new(None),
        }
    }

    fn failing() -> Self {
        Self { fail: true, ..Self::answering(None) }
    }
}

#[async_trait]
impl Enricher for ScriptedEnricher {
    async fn generate(&self, a: &str, b: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_args.lock().unwrap() = Some((a.to_string(), b.to_string()));
        if self.fail {
            anyhow::bail!("rate limited");
        }
        Ok(self.answer.clone())
    }
}

fn engine() -> PipelineEngine {
    PipelineEngine::new(Arc::new(OkScheduler), Arc::new(ScriptedEnricher::answering(None)))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 12, 8, 45, 0).unwrap()
}

fn header() -> Vec<&'static str> {
    vec![
        "Entity Name", "Primary Contact", "Email Address", "Phone Number",
        "Company LinkedIn", "Contact LinkedIn", "Contact Facebook", "Notes",
    ]
}

#[test]
fn test_import_maps_fields_and_discards_header() {
    let mut engine = engine();
    let added = engine.import_contacts(&[
        header(),
        vec!["Acme", "Jane", "jane@acme.test", "555-0100", "co", "li", "fb", "n", "extra", "more"],
        vec!["Globex", "Hank"],
    ]);

    assert_eq!(added.len(), 2);
    for c in &added {
        assert_eq!(c.stage, Stage::FirstEmail);
        assert!(!c.attempted);
        assert!(c.next_contact_date.is_none());
    }
    assert_eq!(added[0].contact_social_url, "fb");
    assert_eq!(added[0].notes, "n");
    assert_eq!(added[1].primary_contact_name, "Hank");
    assert_eq!(added[1].email_address, "");
    assert_eq!(added[1].notes, "");
}

#[test]
fn test_import_without_header_still_drops_first_row() {
    let mut engine = engine();
    let added = engine.import_contacts(&[vec!["Acme"], vec!["Globex"]]);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].entity_name, "Globex");
}

#[test]
fn test_repeat_import_does_not_dedup() {
    let mut engine = engine();
    engine.import_contacts(&[header(), vec!["Acme", "Jane", "jane@acme.test"]]);
    engine.import_contacts(&[header(), vec!["Acme", "Jane", "jane@acme.test"]]);
    assert_eq!(engine.len(), 2);
    assert_ne!(engine.contacts()[0].id, engine.contacts()[1].id);
}

#[tokio::test]
async fn test_advance_sets_date_and_attempted() {
    let mut engine = engine();
    let id = engine.import_contacts(&[header(), vec!["Acme"]])[0].id;

    let outcome = engine.advance_at(id, now()).await;
    assert!(matches!(outcome, AdvanceOutcome::Advanced(_)));

    let c = engine.get(id).unwrap();
    assert_eq!(c.stage, Stage::SecondEmail);
    assert!(c.attempted);
    assert_eq!(c.next_contact_date, Some(now() + Duration::days(FOLLOW_UP_DAYS)));
    assert_eq!(c.next_contact_date, Some(Utc.with_ymd_and_hms(2026, 10, 19, 8, 45, 0).unwrap()));
}

#[tokio::test]
async fn test_stage_is_monotonic_and_stops_at_breakup() {
    let mut engine = engine();
    let id = engine.import_contacts(&[header(), vec!["Acme"]])[0].id;

    let mut last = engine.get(id).unwrap().stage.index();
    for _ in 0..10 {
        engine.advance_at(id, now()).await;
        let idx = engine.get(id).unwrap().stage.index();
        assert!(idx >= last);
        assert!(idx <= Stage::BreakupEmail.index());
        last = idx;
    }
    assert_eq!(engine.get(id).unwrap().stage, Stage::BreakupEmail);
}

#[tokio::test]
async fn test_terminal_advance_leaves_record_identical() {
    let mut engine = engine();
    let id = engine.import_contacts(&[header(), vec!["Acme"]])[0].id;
    for _ in 0..3 {
        engine.advance_at(id, now()).await;
    }
    let snapshot = engine.contacts().to_vec();

    let outcome = engine.advance_at(id, now() + Duration::days(3)).await;
    assert_eq!(outcome, AdvanceOutcome::Terminal);
    assert_eq!(engine.contacts(), snapshot.as_slice());
}

#[tokio::test]
async fn test_unknown_id_leaves_collection_identical() {
    let mut engine = engine();
    engine.import_contacts(&[header(), vec!["Acme"], vec!["Globex"]]);
    let snapshot = engine.contacts().to_vec();

    assert_eq!(engine.advance_at(ContactId::new(), now()).await, AdvanceOutcome::NotFound);
    assert_eq!(engine.contacts(), snapshot.as_slice());
}

#[tokio::test]
async fn test_stage_cleared_fires_only_when_last_contact_leaves() {
    let mut engine = engine();
    let added = engine.import_contacts(&[header(), vec!["A"], vec!["B"]]);

    let first = engine.advance_at(added[0].id, now()).await;
    assert_eq!(first.cleared_stage(), None);

    let second = engine.advance_at(added[1].id, now()).await;
    assert_eq!(second.cleared_stage(), Some(Stage::FirstEmail));
}

#[tokio::test]
async fn test_single_contact_in_stage_clears_vacuously() {
    let mut engine = engine();
    let added = engine.import_contacts(&[header(), vec!["A"], vec!["B"]]);

    // A alone reaches SecondEmail; B stays behind in FirstEmail.
    engine.advance_at(added[0].id, now()).await;
    assert_eq!(engine.list_by_stage(Stage::SecondEmail).len(), 1);

    let outcome = engine.advance_at(added[0].id, now()).await;
    assert_eq!(outcome.cleared_stage(), Some(Stage::SecondEmail));
    assert!(engine.list_by_stage(Stage::SecondEmail).is_empty());
}

#[tokio::test]
async fn test_scheduler_failure_is_not_fatal() {
    let scheduler = Arc::new(FlakyScheduler::default());
    let mut engine = PipelineEngine::new(scheduler.clone(), Arc::new(ScriptedEnricher::answering(None)));
    let id = engine.import_contacts(&[header(), vec!["Acme", "Jane"]])[0].id;

    let AdvanceOutcome::Advanced(t) = engine.advance_at(id, now()).await else {
        panic!("transition should commit despite scheduler failure");
    };
    assert!(!t.reminder_scheduled);
    assert_eq!(engine.get(id).unwrap().stage, Stage::SecondEmail);
    assert_eq!(*scheduler.calls.lock().unwrap(), vec!["Second Email - Acme".to_string()]);
}

#[tokio::test]
async fn test_enrich_failure_leaves_contact_unchanged() {
    let enricher = Arc::new(ScriptedEnricher::failing());
    let mut engine = PipelineEngine::new(Arc::new(OkScheduler), enricher.clone());
    let id = engine.import_contacts(&[
        header(),
        vec!["Acme", "Jane", "", "", "", "https://li.test/jane", "https://fb.test/jane", "keep me"],
    ])[0]
        .id;
    let before = engine.get(id).unwrap().clone();

    let err = engine.enrich(id).await.unwrap_err();
    assert!(format!("{:#}", err).contains("rate limited"));
    assert_eq!(engine.get(id).unwrap(), &before);
    assert_eq!(enricher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_enrich_uses_profile_and_social_urls() {
    let enricher = Arc::new(ScriptedEnricher::answering(Some("Coaches youth soccer.")));
    let mut engine = PipelineEngine::new(Arc::new(OkScheduler), enricher.clone());
    let id = engine.import_contacts(&[
        header(),
        vec!["Acme", "Jane", "", "", "https://li.test/acme", "https://li.test/jane", "https://fb.test/jane"],
    ])[0]
        .id;

    let updated = engine.enrich(id).await.unwrap().unwrap();
    assert_eq!(updated.notes, "Coaches youth soccer.");
    assert_eq!(
        *enricher.last_args.lock().unwrap(),
        Some(("https://li.test/jane".to_string(), "https://fb.test/jane".to_string()))
    );
}

#[tokio::test]
async fn test_enrich_empty_answer_clears_notes() {
    let mut engine = PipelineEngine::new(Arc::new(OkScheduler), Arc::new(ScriptedEnricher::answering(None)));
    let id = engine.import_contacts(&[header(), vec!["Acme", "", "", "", "", "", "", "old notes"]])[0].id;

    let updated = engine.enrich(id).await.unwrap().unwrap();
    assert_eq!(updated.notes, "");
    assert_eq!(engine.get(id).unwrap().notes, "");
}

#[tokio::test]
async fn test_list_by_stage_is_ordered_and_repeatable() {
    let mut engine = engine();
    let added = engine.import_contacts(&[header(), vec!["A"], vec!["B"], vec!["C"]]);
    engine.advance_at(added[1].id, now()).await;

    let first: Vec<_> = engine.list_by_stage(Stage::FirstEmail).iter().map(|c| c.entity_name.clone()).collect();
    let again: Vec<_> = engine.list_by_stage(Stage::FirstEmail).iter().map(|c| c.entity_name.clone()).collect();
    assert_eq!(first, vec!["A", "C"]);
    assert_eq!(first, again);
}

#[tokio::test]
async fn test_day_selection_does_not_filter() {
    let mut engine = engine();
    engine.import_contacts(&[header(), vec!["A"], vec!["B"]]);

    let mut view = ViewState::default();
    let monday: Vec<_> = view.visible(&engine).iter().map(|c| c.id).collect();
    for day in WorkDay::ALL {
        view.day = day;
        let ids: Vec<_> = view.visible(&engine).iter().map(|c| c.id).collect();
        assert_eq!(ids, monday);
    }
}
