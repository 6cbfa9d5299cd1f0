use fb_core::prelude::*;
use fb_core::{BuilderError, Clock, Confirmed, DELETE_QUESTION_PROMPT};
use fb_model::FieldSettings;
use fb_reconcile::MergeRejected;
use fb_store::{KvBackend, MemoryBackend, StoreError};
use fb_test_utils::{harness, page_with_radio, titled_question, ManualClock};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn confirm(gate: Gate) -> Confirmed {
    match gate {
        Gate::NeedsConfirmation(pending) => pending.accept(),
        Gate::Ready(confirmed) => confirmed,
    }
}

#[test]
fn pages_list_oldest_first() {
    let h = harness();
    let first = h.builder.create_page("First").unwrap();
    h.clock.advance(10);
    let second = h.builder.create_page("Second").unwrap();

    let ids: Vec<_> = h.builder.pages().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn option_crud_round() {
    let h = harness();
    let (_, question) = page_with_radio(&h.builder);
    let texts = |q: &Question| q.options.iter().map(|o| o.text.clone()).collect::<Vec<_>>();
    assert_eq!(texts(&question), vec!["Yes", "No"]);

    let maybe = h
        .builder
        .create_option(&question.id, OptionDraft::new(" Maybe "))
        .unwrap();
    assert_eq!(maybe.text, "Maybe");
    assert_eq!(maybe.value, "Maybe");

    h.builder
        .reorder_option(&question.id, &maybe.id, Direction::Up)
        .unwrap();
    h.builder
        .update_option(
            &question.id,
            &maybe.id,
            OptionDraft::new("Not sure").with_hint("Pick this if unsure"),
        )
        .unwrap();

    let stored = h.builder.question(&question.id).unwrap();
    assert_eq!(texts(&stored), vec!["Yes", "Not sure", "No"]);
    assert_eq!(stored.options[1].hint, "Pick this if unsure");

    let gate = h
        .builder
        .request(Command::DeleteOption {
            question: question.id.clone(),
            option: maybe.id.clone(),
        })
        .unwrap();
    h.builder.commit(confirm(gate)).unwrap();
    assert_eq!(texts(&h.builder.question(&question.id).unwrap()), vec!["Yes", "No"]);
}

#[test]
fn deleting_last_option_leaves_empty_list() {
    let h = harness();
    let page = h.builder.create_page("P").unwrap();
    let question = h.builder.create_question(&page.id, FieldType::Select).unwrap();
    let only = h
        .builder
        .create_option(&question.id, OptionDraft::new("Only"))
        .unwrap();

    let gate = h
        .builder
        .request(Command::DeleteOption {
            question: question.id.clone(),
            option: only.id,
        })
        .unwrap();
    h.builder.commit(confirm(gate)).unwrap();
    assert!(h.builder.question(&question.id).unwrap().options.is_empty());
}

#[test]
fn full_save_without_options_is_refused() {
    let h = harness();
    let (page, question) = page_with_radio(&h.builder);
    let record: QuestionRecord = serde_json::from_value(json!({
        "id": question.id.as_str(),
        "pageId": page.id.as_str(),
        "fieldType": "radio",
        "title": "Renamed",
    }))
    .unwrap();

    let err = h.builder.save_question(&record).unwrap_err();
    assert!(matches!(
        err,
        BuilderError::Merge(MergeRejected::DestructiveOptionLoss { .. })
    ));
    let stored = h.builder.question(&question.id).unwrap();
    assert_eq!(stored.title, "Do you live in the UK?");
    assert_eq!(stored.options.len(), 2);
}

#[test]
fn full_save_with_options_replaces_fields() {
    let h = harness();
    let (page, question) = page_with_radio(&h.builder);
    let mut record = QuestionRecord::from(&question);
    record.title = Some("Where do you live?".into());
    record.page_id = Some(page.id.to_string());

    let saved = h.builder.save_question(&record).unwrap();
    assert_eq!(saved.title, "Where do you live?");
    assert_eq!(saved.options, question.options);
}

#[test]
fn update_keeps_settings_not_mentioned() {
    let h = harness();
    let page = h.builder.create_page("P").unwrap();
    let question = h.builder.create_question(&page.id, FieldType::Text).unwrap();
    let settings = FieldSettings {
        max_length: Some("40".into()),
        ..FieldSettings::default()
    };
    h.builder
        .update_question(&question.id, &QuestionPatch::new().with_settings(settings))
        .unwrap();
    let updated = h
        .builder
        .update_question(&question.id, &QuestionPatch::new().with_hint("As on your passport"))
        .unwrap();
    assert_eq!(updated.settings.max_length.as_deref(), Some("40"));
    assert_eq!(updated.hint, "As on your passport");
}

#[test]
fn moving_questions_renumbers_positions() {
    let h = harness();
    let page = h.builder.create_page("P").unwrap();
    let a = titled_question(&h.builder, &page, FieldType::Text, "A");
    let b = titled_question(&h.builder, &page, FieldType::Text, "B");
    let c = titled_question(&h.builder, &page, FieldType::Text, "C");

    let moved = h.builder.move_question(&page.id, &c.id, Direction::Up).unwrap();
    let titles: Vec<_> = moved.iter().map(|q| q.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "C", "B"]);
    let positions: Vec<_> = moved.iter().map(|q| q.position).collect();
    assert_eq!(positions, vec![Some(0), Some(1), Some(2)]);

    let unchanged = h.builder.move_question(&page.id, &a.id, Direction::Up).unwrap();
    assert_eq!(unchanged[0].id, a.id);
    assert_eq!(
        h.builder.repository().load_question(&b.id).unwrap().position,
        Some(2)
    );
}

#[test]
fn sweep_keeps_choice_drafts_with_options() {
    let h = harness();
    let page = h.builder.create_page("P").unwrap();
    let empty_text = h.builder.create_question(&page.id, FieldType::Text).unwrap();
    let radio = h.builder.create_question(&page.id, FieldType::Radio).unwrap();
    h.builder
        .create_option(&radio.id, OptionDraft::new("Yes"))
        .unwrap();
    let kept = titled_question(&h.builder, &page, FieldType::Email, "Email address");

    let swept = h.builder.sweep_page(&page.id).unwrap();
    assert_eq!(swept, vec![empty_text.id.clone()]);

    let remaining: Vec<_> = h
        .builder
        .resolve_questions(&page.id)
        .unwrap()
        .into_iter()
        .map(|q| q.id)
        .collect();
    assert_eq!(remaining, vec![radio.id, kept.id]);
    assert!(h.builder.repository().load_question(&empty_text.id).is_none());
}

#[test]
fn deleting_page_removes_its_questions_only() {
    let h = harness();
    let (page, question) = page_with_radio(&h.builder);
    let other = h.builder.create_page("Other").unwrap();
    let survivor = titled_question(&h.builder, &other, FieldType::Text, "Name");

    let gate = h.builder.request(Command::DeletePage(page.id.clone())).unwrap();
    let outcome = h.builder.commit(confirm(gate)).unwrap();
    assert_eq!(
        outcome,
        Outcome::PageDeleted {
            page: page.id.clone(),
            questions: vec![question.id.clone()],
        }
    );
    assert!(h.builder.page(&page.id).is_err());
    assert!(h.builder.repository().load_question(&question.id).is_none());
    assert!(h.builder.question(&survivor.id).is_ok());
}

#[test]
fn deleting_question_removes_it_and_its_options() {
    let h = harness();
    let (page, question) = page_with_radio(&h.builder);
    assert_eq!(question.options.len(), 2);

    let gate = h
        .builder
        .request(Command::DeleteQuestion(question.id.clone()))
        .unwrap();
    let Gate::NeedsConfirmation(pending) = gate else {
        panic!("question deletion must ask");
    };
    assert_eq!(pending.prompt(), DELETE_QUESTION_PROMPT);
    let outcome = h.builder.commit(pending.accept()).unwrap();
    assert_eq!(outcome, Outcome::QuestionDeleted(question.id.clone()));

    assert!(h.builder.resolve_questions(&page.id).unwrap().is_empty());
    assert!(h.builder.repository().load_question(&question.id).is_none());
    assert!(h.builder.page(&page.id).unwrap().questions.is_empty());
    assert!(h.builder.question(&question.id).is_err());
}

#[test]
fn replace_import_after_confirmation_regenerates_ids() {
    let h = harness();
    let (_, question) = page_with_radio(&h.builder);
    let gate = h
        .builder
        .request(Command::ImportList {
            question: question.id.clone(),
            list_id: "yes_no".into(),
            mode: ImportMode::Replace,
        })
        .unwrap();
    let Gate::NeedsConfirmation(pending) = gate else {
        panic!("replacing options must ask");
    };
    let Outcome::OptionsImported { added, options, .. } =
        h.builder.commit(pending.accept()).unwrap()
    else {
        panic!("unexpected outcome");
    };
    assert_eq!(added, 2);
    assert_eq!(options[0].hint, "Select this if you agree");
    assert!(options.iter().all(|o| question.option_index(&o.id).is_none()));
}

#[test]
fn lenient_page_data_is_repaired_on_read() {
    let h = harness();
    let page = h.builder.create_page("Legacy").unwrap();
    h.backend
        .set_raw(
            page.id.as_str(),
            json!({
                "id": page.id.as_str(),
                "title": "Legacy",
                "questions": [
                    {"id": "form_form_5", "fieldType": "text", "title": "Embedded"},
                    {"fieldType": "text", "title": "No id"},
                ],
            })
            .to_string(),
        )
        .unwrap();
    h.backend
        .set_raw(
            "form_5",
            json!({"id": "form_5", "pageId": page.id.as_str(), "hint": "From standalone"})
                .to_string(),
        )
        .unwrap();

    let questions = h.builder.resolve_questions(&page.id).unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].id.as_str(), "form_5");
    assert_eq!(questions[0].title, "Embedded");
    assert_eq!(questions[0].hint, "From standalone");
    assert_eq!(questions[0].page_id, page.id);
}

/// Memory backend whose page writes can be made to fail
#[derive(Default)]
struct FlakyPages {
    inner: MemoryBackend,
    fail_pages: AtomicBool,
}

impl KvBackend for FlakyPages {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.inner.get_raw(key)
    }

    fn set_raw(&self, key: &str, value: String) -> fb_store::Result<()> {
        if key.starts_with("page_") && self.fail_pages.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set_raw(key, value)
    }

    fn remove(&self, key: &str) -> fb_store::Result<()> {
        self.inner.remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

#[test]
fn failed_page_write_restores_standalone_record() {
    let backend = Arc::new(FlakyPages::default());
    let clock = Arc::new(ManualClock::new());
    let builder =
        FormBuilder::with_clock(Arc::clone(&backend), clock, BuilderConfig::new()).unwrap();
    let page = builder.create_page("P").unwrap();
    let question = builder.create_question(&page.id, FieldType::Text).unwrap();

    backend.fail_pages.store(true, Ordering::SeqCst);
    let err = builder
        .update_question(&question.id, &QuestionPatch::new().with_title("Lost"))
        .unwrap_err();
    assert!(matches!(err, BuilderError::Store(StoreError::Io(_))));
    let standalone = builder.repository().load_question(&question.id).unwrap();
    assert_eq!(standalone.title.as_deref(), Some(""));

    let orphan = builder.create_question(&page.id, FieldType::Text);
    assert!(orphan.is_err());
    assert_eq!(builder.repository().question_records().len(), 1);
}

#[test]
fn manual_clock_drives_ids() {
    let clock = ManualClock::at(42);
    assert_eq!(clock.now_millis(), 42);
    let h = harness();
    h.clock.set(5_000);
    let page = h.builder.create_page("Timed").unwrap();
    assert_eq!(page.id.timestamp(), Some(5_000));
}
