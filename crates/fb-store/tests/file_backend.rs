//! File backend persistence tests

use fb_model::{FieldType, Page, PageId, Question, QuestionId};
use fb_store::{FileBackend, KvBackend, Repository};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("store.json");

    let page = Page::new(PageId::parse("page_1700").unwrap(), "Contact details");
    let question = Question::new(
        QuestionId::parse("form_1701").unwrap(),
        page.id.clone(),
        FieldType::Email,
    );
    {
        let repo = Repository::new(FileBackend::open(&path).unwrap());
        repo.save_page(&page).unwrap();
        repo.save_question(&question).unwrap();
        assert!(repo.lists().ensure_defaults().unwrap());
    }

    let repo = Repository::new(FileBackend::open(&path).unwrap());
    assert_eq!(repo.load_page(&page.id), Some(page));
    let record = repo.load_question(&question.id).unwrap();
    assert_eq!(record.to_question(None).unwrap(), question);
    assert_eq!(repo.lists().all().len(), 2);
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn corrupt_file_opens_empty_and_is_replaced() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ definitely not json").unwrap();

    let backend = FileBackend::open(&path).unwrap();
    assert!(backend.keys().is_empty());
    backend.set_raw("page_1", r#"{"id":"page_1","questions":[]}"#.into()).unwrap();

    let reopened = FileBackend::open(&path).unwrap();
    assert_eq!(reopened.keys(), vec!["page_1".to_string()]);
}

#[test]
fn removal_is_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let backend = FileBackend::open(&path).unwrap();
    backend.set_raw("a", "1".into()).unwrap();
    backend.set_raw("b", "2".into()).unwrap();
    backend.remove("a").unwrap();

    let reopened = FileBackend::open(&path).unwrap();
    assert_eq!(reopened.get_raw("a"), None);
    assert_eq!(reopened.get_raw("b").as_deref(), Some("2"));
}
