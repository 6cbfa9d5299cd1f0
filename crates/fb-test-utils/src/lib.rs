//! Testing utilities for the form builder workspace
//!
//! Shared clocks, builders and fixtures.

#![allow(missing_docs)]

use fb_core::{BuilderConfig, Clock, FormBuilder};
use fb_model::{FieldType, OptionDraft, Page, Question, QuestionPatch};
use fb_store::MemoryBackend;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Start time used by [`ManualClock::new`]
pub const EPOCH_MILLIS: i64 = 1_700_000_000_000;

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new() -> Self {
        Self::at(EPOCH_MILLIS)
    }

    pub fn at(millis: i64) -> Self {
        Self(AtomicI64::new(millis))
    }

    pub fn set(&self, millis: i64) {
        self.0.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub type TestBuilder = FormBuilder<Arc<MemoryBackend>, Arc<ManualClock>>;

pub struct Harness {
    pub backend: Arc<MemoryBackend>,
    pub clock: Arc<ManualClock>,
    pub builder: TestBuilder,
}

pub fn harness_with(backend: MemoryBackend, config: BuilderConfig) -> Harness {
    let backend = Arc::new(backend);
    let clock = Arc::new(ManualClock::new());
    let builder =
        FormBuilder::with_clock(Arc::clone(&backend), Arc::clone(&clock), config).unwrap();
    Harness {
        backend,
        clock,
        builder,
    }
}

pub fn harness() -> Harness {
    harness_with(MemoryBackend::new(), BuilderConfig::new())
}

pub fn memory_builder() -> TestBuilder {
    harness().builder
}

/// Page with one titled radio question holding Yes and No
pub fn page_with_radio(builder: &TestBuilder) -> (Page, Question) {
    let page = builder.create_page("Your circumstances").unwrap();
    let question = builder.create_question(&page.id, FieldType::Radio).unwrap();
    builder
        .update_question(
            &question.id,
            &QuestionPatch::new().with_title("Do you live in the UK?"),
        )
        .unwrap();
    builder
        .create_option(&question.id, OptionDraft::new("Yes").with_value("yes"))
        .unwrap();
    builder
        .create_option(&question.id, OptionDraft::new("No").with_value("no"))
        .unwrap();
    let question = builder.question(&question.id).unwrap();
    (page, question)
}

pub fn titled_question(builder: &TestBuilder, page: &Page, field_type: FieldType, title: &str) -> Question {
    let question = builder.create_question(&page.id, field_type).unwrap();
    builder
        .update_question(&question.id, &QuestionPatch::new().with_title(title))
        .unwrap()
}
