//! Typed page and question records
//!
//! Every write passes [`fb_reconcile::is_valid`] first; a rejected record
//! never reaches the backend.

use crate::backend::KvBackend;
use crate::error::{Result, StoreError};
use crate::json::JsonStore;
use crate::key::RecordKey;
use crate::lists::ListCatalog;
use fb_model::{Page, PageId, Question, QuestionId, QuestionRecord};
use serde::Serialize;

/// Page and question storage over a [`JsonStore`]
#[derive(Debug, Default)]
pub struct Repository<B> {
    store: JsonStore<B>,
}

impl<B: KvBackend> Repository<B> {
    /// Repository over `backend`
    pub fn new(backend: B) -> Self {
        Self {
            store: JsonStore::new(backend),
        }
    }

    /// Underlying JSON store
    pub fn store(&self) -> &JsonStore<B> {
        &self.store
    }

    /// Predefined option lists held in the same store
    pub fn lists(&self) -> ListCatalog<'_, B> {
        ListCatalog::new(&self.store)
    }

    fn write_checked<T: Serialize>(&self, key: &str, record: &T) -> Result<()> {
        let value = serde_json::to_value(record)?;
        if !fb_reconcile::is_valid(&value) {
            tracing::warn!(key, "record rejected by structure check");
            return Err(StoreError::Rejected {
                key: key.to_string(),
            });
        }
        self.store.try_set_raw_key(key, &value)
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    /// Page record, `None` when missing or unreadable
    pub fn load_page(&self, id: &PageId) -> Option<Page> {
        self.store.get(&RecordKey::Page(id.clone()))
    }

    /// Write a page record
    ///
    /// # Errors
    /// [`StoreError::Rejected`] for invalid structure, otherwise backend errors.
    pub fn save_page(&self, page: &Page) -> Result<()> {
        self.write_checked(page.id.as_str(), page)
    }

    /// Delete a page record
    ///
    /// # Errors
    /// Backend failure.
    pub fn remove_page(&self, id: &PageId) -> Result<()> {
        self.store.remove(&RecordKey::Page(id.clone()))
    }

    /// Every readable page record, in key order
    pub fn pages(&self) -> Vec<Page> {
        self.store
            .keys_with_prefix(PageId::PREFIX)
            .iter()
            .filter_map(|key| self.store.get_raw_key::<Page>(key))
            .collect()
    }

    // ------------------------------------------------------------------
    // Questions
    // ------------------------------------------------------------------

    /// Raw keys that hold the standalone record of `id`
    ///
    /// The canonical key comes first; older records may sit under a key
    /// with a repeated prefix.
    fn question_keys(&self, id: &QuestionId) -> Vec<String> {
        let mut keys: Vec<String> = self
            .store
            .keys_with_prefix(QuestionId::PREFIX)
            .into_iter()
            .filter(|key| QuestionId::parse(key).ok().as_ref() == Some(id))
            .collect();
        keys.sort_by_key(|key| key.as_str() != id.as_str());
        keys
    }

    /// Standalone question record
    pub fn load_question(&self, id: &QuestionId) -> Option<QuestionRecord> {
        self.store
            .get(&RecordKey::Question(id.clone()))
            .or_else(|| {
                self.question_keys(id)
                    .iter()
                    .find_map(|key| self.store.get_raw_key(key))
            })
    }

    /// Write the standalone record of a question under its canonical key
    ///
    /// # Errors
    /// [`StoreError::Rejected`] for invalid structure, otherwise backend errors.
    pub fn save_question(&self, question: &Question) -> Result<()> {
        self.write_checked(question.id.as_str(), question)
    }

    /// Write a raw question record under the canonical key of `id`
    ///
    /// # Errors
    /// [`StoreError::Rejected`] for invalid structure, otherwise backend errors.
    pub fn save_question_record(&self, id: &QuestionId, record: &QuestionRecord) -> Result<()> {
        self.write_checked(id.as_str(), record)
    }

    /// Delete every standalone record of a question
    ///
    /// # Errors
    /// Backend failure.
    pub fn remove_question(&self, id: &QuestionId) -> Result<()> {
        for key in self.question_keys(id) {
            self.store.remove_raw_key(&key)?;
        }
        Ok(())
    }

    /// Every readable standalone question record, in key order
    pub fn question_records(&self) -> Vec<QuestionRecord> {
        self.store
            .keys_with_prefix(QuestionId::PREFIX)
            .iter()
            .filter_map(|key| self.store.get_raw_key::<QuestionRecord>(key))
            .collect()
    }

    /// Standalone records whose normalised `pageId` is `page`
    pub fn question_records_for(&self, page: &PageId) -> Vec<QuestionRecord> {
        self.question_records()
            .into_iter()
            .filter(|record| record.page().as_ref() == Some(page))
            .collect()
    }
}
