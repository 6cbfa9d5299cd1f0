use fb_core::prelude::*;
use fb_core::DEFAULT_AUTOSAVE_MS;
use fb_store::{KvBackend, MemoryBackend};
use fb_test_utils::{harness, ManualClock};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

const DELAY: Duration = Duration::from_millis(500);

#[tokio::test(start_paused = true)]
async fn bursts_collapse_into_one_write() {
    let h = harness();
    let builder = Arc::new(h.builder);
    let page = builder.create_page("P").unwrap();
    let question = builder.create_question(&page.id, FieldType::Text).unwrap();
    let autosave = Autosave::with_delay(Arc::clone(&builder), DELAY);

    autosave.schedule(question.id.clone(), QuestionPatch::new().with_title("Ful"));
    tokio::time::sleep(Duration::from_millis(200)).await;
    autosave.schedule(question.id.clone(), QuestionPatch::new().with_title("Full name"));
    autosave.schedule(question.id.clone(), QuestionPatch::new().with_hint("As on your passport"));
    assert_eq!(autosave.pending_count(), 1);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(builder.question(&question.id).unwrap().title, "");

    tokio::time::sleep(DELAY).await;
    let stored = builder.question(&question.id).unwrap();
    assert_eq!(stored.title, "Full name");
    assert_eq!(stored.hint, "As on your passport");
    assert_eq!(autosave.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn flush_writes_immediately() {
    let h = harness();
    let builder = Arc::new(h.builder);
    let page = builder.create_page("P").unwrap();
    let a = builder.create_question(&page.id, FieldType::Text).unwrap();
    let b = builder.create_question(&page.id, FieldType::Email).unwrap();
    let autosave = Autosave::new(Arc::clone(&builder));
    assert_eq!(autosave.delay(), Duration::from_millis(DEFAULT_AUTOSAVE_MS));

    autosave.schedule(a.id.clone(), QuestionPatch::new().with_title("Name"));
    autosave.schedule(b.id.clone(), QuestionPatch::new().with_title("Email"));
    assert_eq!(autosave.flush(), 2);
    assert_eq!(autosave.pending_count(), 0);
    assert_eq!(builder.question(&a.id).unwrap().title, "Name");
    assert_eq!(builder.question(&b.id).unwrap().title, "Email");
}

#[tokio::test(start_paused = true)]
async fn cancelled_edit_is_never_written() {
    let h = harness();
    let builder = Arc::new(h.builder);
    let page = builder.create_page("P").unwrap();
    let question = builder.create_question(&page.id, FieldType::Text).unwrap();
    let autosave = Autosave::with_delay(Arc::clone(&builder), DELAY);

    autosave.schedule(question.id.clone(), QuestionPatch::new().with_title("Gone"));
    assert!(autosave.cancel(&question.id));
    assert!(!autosave.cancel(&question.id));

    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(builder.question(&question.id).unwrap().title, "");
}

#[tokio::test(start_paused = true)]
async fn failed_write_is_dropped() {
    let h = harness();
    let builder = Arc::new(h.builder);
    let missing = QuestionId::from_timestamp(1);
    let autosave = Autosave::with_delay(Arc::clone(&builder), DELAY);

    autosave.schedule(missing.clone(), QuestionPatch::new().with_title("Nobody"));
    assert_eq!(autosave.flush(), 0);
    assert_eq!(autosave.pending_count(), 0);
}

/// Memory backend that notes which thread each question write came from
#[derive(Default)]
struct WriterThreads {
    inner: MemoryBackend,
    question_writers: Mutex<Vec<ThreadId>>,
}

impl KvBackend for WriterThreads {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.inner.get_raw(key)
    }

    fn set_raw(&self, key: &str, value: String) -> fb_store::Result<()> {
        if key.starts_with("form_") {
            self.question_writers.lock().push(thread::current().id());
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

#[tokio::test(start_paused = true)]
async fn debounced_write_leaves_the_runtime_thread() {
    let backend = Arc::new(WriterThreads::default());
    let builder = Arc::new(
        FormBuilder::with_clock(
            Arc::clone(&backend),
            Arc::new(ManualClock::new()),
            BuilderConfig::new(),
        )
        .unwrap(),
    );
    let page = builder.create_page("P").unwrap();
    let question = builder.create_question(&page.id, FieldType::Text).unwrap();
    backend.question_writers.lock().clear();
    let autosave = Autosave::with_delay(Arc::clone(&builder), DELAY);

    autosave.schedule(question.id.clone(), QuestionPatch::new().with_title("Full name"));
    tokio::time::sleep(DELAY * 2).await;

    assert_eq!(builder.question(&question.id).unwrap().title, "Full name");
    let writers = backend.question_writers.lock().clone();
    assert_eq!(writers.len(), 1);
    assert_ne!(writers[0], thread::current().id());
}
