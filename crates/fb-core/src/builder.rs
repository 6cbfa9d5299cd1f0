//! Page, question and option services
//!
//! Every question write goes through [`safe_merge`] and then lands in both
//! places a question lives: its standalone record and its page's embedded
//! array. If the page write fails, the standalone record is restored.

use crate::config::BuilderConfig;
use crate::error::{BuilderError, Result};
use crate::ids::{Clock, IdGenerator, SystemClock};
use fb_model::{
    Direction, FieldType, Lists, OptionDraft, OptionId, Page, PageId, Question, QuestionId,
    QuestionOption, QuestionPatch, QuestionRecord,
};
use fb_reconcile::{move_option, reorder, resolve_questions, safe_merge, MergeOptions};
use fb_store::{KvBackend, Repository};

/// Message for an option saved without text
pub const OPTION_TEXT_REQUIRED: &str = "Option text is required";

/// Message for a page created without a title
pub const PAGE_TITLE_REQUIRED: &str = "Enter a page title";

/// Form builder services over a storage backend
#[derive(Debug)]
pub struct FormBuilder<B, C = SystemClock> {
    repo: Repository<B>,
    ids: IdGenerator<C>,
    config: BuilderConfig,
}

impl<B: KvBackend> FormBuilder<B, SystemClock> {
    /// Builder using the wall clock
    ///
    /// # Errors
    /// Backend failure while seeding default lists.
    pub fn open(backend: B, config: BuilderConfig) -> Result<Self> {
        Self::with_clock(backend, SystemClock, config)
    }
}

impl<B: KvBackend, C: Clock> FormBuilder<B, C> {
    /// Builder with an explicit clock
    ///
    /// # Errors
    /// Backend failure while seeding default lists.
    pub fn with_clock(backend: B, clock: C, config: BuilderConfig) -> Result<Self> {
        let builder = Self {
            repo: Repository::new(backend),
            ids: IdGenerator::new(clock),
            config,
        };
        if builder.config.seed_default_lists {
            builder.repo.lists().ensure_defaults()?;
        }
        Ok(builder)
    }

    /// Underlying repository
    pub fn repository(&self) -> &Repository<B> {
        &self.repo
    }

    /// Active configuration
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub(crate) fn ids(&self) -> &IdGenerator<C> {
        &self.ids
    }

    /// Predefined option lists
    pub fn lists(&self) -> Lists {
        self.repo.lists().all()
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    /// Create an empty page
    ///
    /// # Errors
    /// [`BuilderError::Validation`] for a blank title, otherwise storage errors.
    pub fn create_page(&self, title: &str) -> Result<Page> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BuilderError::validation(PAGE_TITLE_REQUIRED));
        }
        let page = Page::new(self.ids.page_id(), title);
        self.repo.save_page(&page)?;
        tracing::info!(page = %page.id, title, "page created");
        Ok(page)
    }

    /// Change a page title
    ///
    /// # Errors
    /// Blank title, missing page or storage failure.
    pub fn rename_page(&self, page_id: &PageId, title: &str) -> Result<Page> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BuilderError::validation(PAGE_TITLE_REQUIRED));
        }
        let mut page = self.page(page_id)?;
        title.clone_into(&mut page.title);
        self.repo.save_page(&page)?;
        Ok(page)
    }

    /// Page record
    ///
    /// # Errors
    /// [`BuilderError::PageNotFound`].
    pub fn page(&self, page_id: &PageId) -> Result<Page> {
        self.repo.load_page(page_id).ok_or_else(|| {
            tracing::warn!(page = %page_id, "page not found");
            BuilderError::PageNotFound(page_id.clone())
        })
    }

    /// All pages, oldest first
    pub fn pages(&self) -> Vec<Page> {
        let mut pages = self.repo.pages();
        pages.sort_by_key(|p| {
            let ts = p.id.timestamp();
            (ts.is_none(), ts.unwrap_or_default())
        });
        pages
    }

    /// All pages with their resolved questions, oldest page first
    pub fn pages_with_questions(&self) -> Vec<(Page, Vec<Question>)> {
        let records = self.repo.question_records();
        self.pages()
            .into_iter()
            .map(|page| {
                let questions = resolve_questions(&page, &records);
                (page, questions)
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Questions
    // ------------------------------------------------------------------

    /// Merged, ordered questions of a page; never writes
    ///
    /// # Errors
    /// [`BuilderError::PageNotFound`].
    pub fn resolve_questions(&self, page_id: &PageId) -> Result<Vec<Question>> {
        let page = self.page(page_id)?;
        let records = self.repo.question_records_for(page_id);
        Ok(resolve_questions(&page, &records))
    }

    /// Merged view of one question
    ///
    /// # Errors
    /// [`BuilderError::QuestionNotFound`].
    pub fn question(&self, question_id: &QuestionId) -> Result<Question> {
        let record = self.repo.load_question(question_id);
        let owner = record
            .as_ref()
            .and_then(QuestionRecord::page)
            .or_else(|| self.embedding_page(question_id));

        let resolved = owner
            .and_then(|page_id| self.repo.load_page(&page_id))
            .and_then(|page| {
                let records = self.repo.question_records_for(&page.id);
                resolve_questions(&page, &records)
                    .into_iter()
                    .find(|q| &q.id == question_id)
            });

        resolved
            .or_else(|| record.and_then(|r| r.to_question(None).ok()))
            .ok_or_else(|| {
                tracing::warn!(question = %question_id, "question not found");
                BuilderError::QuestionNotFound(question_id.clone())
            })
    }

    fn embedding_page(&self, question_id: &QuestionId) -> Option<PageId> {
        self.repo
            .pages()
            .into_iter()
            .find(|page| page.position_of(question_id).is_some())
            .map(|page| page.id)
    }

    /// Add a draft question to the end of a page
    ///
    /// # Errors
    /// Missing page or storage failure; nothing is left behind on failure.
    pub fn create_question(&self, page_id: &PageId, field_type: FieldType) -> Result<Question> {
        let existing = self.resolve_questions(page_id)?;
        let mut question = Question::new(self.ids.question_id(), page_id.clone(), field_type);
        if !existing.is_empty() && existing.iter().all(|q| q.position.is_some()) {
            question.position = existing
                .iter()
                .filter_map(|q| q.position)
                .max()
                .map(|p| p.saturating_add(1));
        }
        let question = safe_merge(None, &QuestionRecord::from(&question), MergeOptions::patch())?;
        self.persist(None, &question)?;
        tracing::info!(question = %question.id, page = %page_id, %field_type, "question created");
        Ok(question)
    }

    /// Apply a partial update
    ///
    /// # Errors
    /// Missing question, merge rejection or storage failure.
    pub fn update_question(&self, question_id: &QuestionId, patch: &QuestionPatch) -> Result<Question> {
        self.merge_and_persist(question_id, &patch.to_record(question_id), MergeOptions::patch())
    }

    /// Write a full question record
    ///
    /// A record that omits `options` for a question that has some is
    /// refused.
    ///
    /// # Errors
    /// Missing id, merge rejection or storage failure.
    pub fn save_question(&self, record: &QuestionRecord) -> Result<Question> {
        let question_id = record
            .question_id()
            .ok_or_else(|| BuilderError::validation("Question id is required"))?;
        match self.question(&question_id) {
            Ok(existing) => {
                let merged = safe_merge(Some(&existing), record, MergeOptions::replace())?;
                self.persist(Some(&existing), &merged)?;
                Ok(merged)
            }
            Err(BuilderError::QuestionNotFound(_)) => {
                let created = safe_merge(None, record, MergeOptions::replace())?;
                self.page(&created.page_id)?;
                self.persist(None, &created)?;
                tracing::info!(question = %created.id, "question created from full record");
                Ok(created)
            }
            Err(other) => Err(other),
        }
    }

    pub(crate) fn merge_and_persist(
        &self,
        question_id: &QuestionId,
        incoming: &QuestionRecord,
        options: MergeOptions,
    ) -> Result<Question> {
        let existing = self.question(question_id)?;
        let merged = safe_merge(Some(&existing), incoming, options).inspect_err(|rejected| {
            tracing::warn!(question = %question_id, %rejected, "question write refused");
        })?;
        self.persist(Some(&existing), &merged)?;
        Ok(merged)
    }

    /// Write both representations of `question`
    fn persist(&self, before: Option<&Question>, question: &Question) -> Result<()> {
        let previous = self.repo.load_question(&question.id);
        let mut page = self.page(&question.page_id)?;
        self.repo.save_question(question)?;

        page.upsert_question(question);
        if let Err(error) = self.repo.save_page(&page) {
            self.restore_standalone(&question.id, previous);
            return Err(error.into());
        }

        if let Some(old_page) = before.map(|b| &b.page_id).filter(|p| *p != &question.page_id) {
            if let Some(mut old) = self.repo.load_page(old_page) {
                if old.remove_question(&question.id) {
                    self.repo.save_page(&old)?;
                }
            }
        }
        Ok(())
    }

    fn restore_standalone(&self, question_id: &QuestionId, previous: Option<QuestionRecord>) {
        let restored = match previous {
            Some(record) => self.repo.save_question_record(question_id, &record),
            None => self.repo.remove_question(question_id),
        };
        if let Err(error) = restored {
            tracing::error!(question = %question_id, %error, "rollback of standalone record failed");
        }
    }

    /// Move a question one step and store the new positions
    ///
    /// # Errors
    /// Missing page or question, or storage failure.
    pub fn move_question(
        &self,
        page_id: &PageId,
        question_id: &QuestionId,
        direction: Direction,
    ) -> Result<Vec<Question>> {
        let mut page = self.page(page_id)?;
        let questions = self.resolve_questions(page_id)?;
        if !questions.iter().any(|q| &q.id == question_id) {
            return Err(BuilderError::QuestionNotFound(question_id.clone()));
        }
        let reordered = reorder(questions, question_id, direction);
        for question in &reordered {
            self.repo.save_question(question)?;
        }
        page.questions = reordered.iter().map(QuestionRecord::from).collect();
        self.repo.save_page(&page)?;
        tracing::debug!(page = %page_id, question = %question_id, %direction, "question moved");
        Ok(reordered)
    }

    /// Remove abandoned drafts from a page
    ///
    /// Untitled questions go, except choice questions that still have
    /// options. Returns the removed ids.
    ///
    /// # Errors
    /// Missing page or storage failure.
    pub fn sweep_page(&self, page_id: &PageId) -> Result<Vec<QuestionId>> {
        let mut page = self.page(page_id)?;
        let swept: Vec<QuestionId> = self
            .resolve_questions(page_id)?
            .into_iter()
            .filter(Question::is_abandoned_draft)
            .map(|q| q.id)
            .collect();
        if swept.is_empty() {
            return Ok(swept);
        }
        for id in &swept {
            self.repo.remove_question(id)?;
            page.remove_question(id);
        }
        self.repo.save_page(&page)?;
        tracing::info!(page = %page_id, removed = swept.len(), "swept draft questions");
        Ok(swept)
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    pub(crate) fn write_options(
        &self,
        question: &Question,
        options: Vec<QuestionOption>,
        confirm_clear: bool,
    ) -> Result<Question> {
        let patch = QuestionPatch::new().with_options(options);
        let mut merge = MergeOptions::patch();
        if confirm_clear {
            merge = merge.with_confirmed_clear();
        }
        self.merge_and_persist(&question.id, &patch.to_record(&question.id), merge)
    }

    fn required_text(draft: &OptionDraft) -> Result<()> {
        match draft.trimmed_text() {
            Some(_) => Ok(()),
            None => Err(BuilderError::validation(OPTION_TEXT_REQUIRED)),
        }
    }

    /// Append an option
    ///
    /// # Errors
    /// Blank text, missing question or storage failure.
    pub fn create_option(&self, question_id: &QuestionId, draft: OptionDraft) -> Result<QuestionOption> {
        Self::required_text(&draft)?;
        let question = self.question(question_id)?;
        let option = draft.into_option(self.ids.option_id());
        let mut options = question.options.clone();
        options.push(option.clone());
        self.write_options(&question, options, false)?;
        tracing::info!(question = %question_id, option = %option.id, "option created");
        Ok(option)
    }

    /// Replace the text, value and hint of an option
    ///
    /// # Errors
    /// Blank text, missing question or option, or storage failure.
    pub fn update_option(
        &self,
        question_id: &QuestionId,
        option_id: &OptionId,
        draft: OptionDraft,
    ) -> Result<QuestionOption> {
        Self::required_text(&draft)?;
        let question = self.question(question_id)?;
        let index = question
            .option_index(option_id)
            .ok_or_else(|| BuilderError::OptionNotFound {
                question: question_id.clone(),
                option: option_id.clone(),
            })?;
        let option = draft.into_option(option_id.clone());
        let mut options = question.options.clone();
        options[index] = option.clone();
        self.write_options(&question, options, false)?;
        Ok(option)
    }

    /// Move an option one step
    ///
    /// # Errors
    /// Missing question or option, or storage failure.
    pub fn reorder_option(
        &self,
        question_id: &QuestionId,
        option_id: &OptionId,
        direction: Direction,
    ) -> Result<Vec<QuestionOption>> {
        let question = self.question(question_id)?;
        if question.option_index(option_id).is_none() {
            return Err(BuilderError::OptionNotFound {
                question: question_id.clone(),
                option: option_id.clone(),
            });
        }
        let mut options = question.options.clone();
        if !move_option(&mut options, option_id, direction) {
            return Ok(options);
        }
        Ok(self.write_options(&question, options, false)?.options)
    }
}
