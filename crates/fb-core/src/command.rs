//! Destructive operations behind an explicit confirmation step
//!
//! A [`Command`] is first passed to [`FormBuilder::request`], which checks
//! its references and decides whether the author must confirm. Only a
//! [`Confirmed`] value can be committed, and the only ways to get one are a
//! command that needs no confirmation or [`Confirmation::accept`].

use crate::builder::FormBuilder;
use crate::error::{BuilderError, Result};
use crate::ids::Clock;
use fb_model::{ListOption, OptionDraft, OptionId, PageId, QuestionId, QuestionOption};
use fb_store::KvBackend;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Prompt shown before deleting a question
pub const DELETE_QUESTION_PROMPT: &str =
    "Are you sure you want to delete this question? This cannot be undone.";

/// Prompt shown before deleting an option
pub const DELETE_OPTION_PROMPT: &str = "Are you sure you want to delete this option?";

/// Prompt shown before an import replaces existing options
pub const REPLACE_OPTIONS_PROMPT: &str = "Do you want to replace existing options?";

/// How imported list options combine with existing ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Keep existing options and add the new texts
    #[default]
    Append,
    /// Discard existing options
    Replace,
}

impl ImportMode {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "" | "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown import mode: {other:?}")),
        }
    }
}

/// Destructive operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Delete a page and every question that belongs to it
    DeletePage(PageId),
    /// Delete one question
    DeleteQuestion(QuestionId),
    /// Delete one option of a question
    DeleteOption {
        /// Owning question
        question: QuestionId,
        /// Option to remove
        option: OptionId,
    },
    /// Copy a predefined list into a question's options
    ImportList {
        /// Target question
        question: QuestionId,
        /// Key in the list catalog
        list_id: String,
        /// Append or replace
        mode: ImportMode,
    },
}

/// Command that may be committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed(Command);

impl Confirmed {
    /// Wrapped command
    #[must_use]
    pub fn command(&self) -> &Command {
        &self.0
    }
}

/// Command waiting for the author's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    command: Command,
    prompt: String,
}

impl Confirmation {
    /// Question to put to the author
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Pending command
    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Author agreed
    #[must_use]
    pub fn accept(self) -> Confirmed {
        Confirmed(self.command)
    }

    /// Author declined; nothing happens
    pub fn decline(self) {
        tracing::debug!(command = ?self.command, "confirmation declined");
    }
}

/// Result of [`FormBuilder::request`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Safe to commit without asking
    Ready(Confirmed),
    /// Ask first
    NeedsConfirmation(Confirmation),
}

impl Gate {
    fn ask(command: Command, prompt: impl Into<String>) -> Self {
        Self::NeedsConfirmation(Confirmation {
            command,
            prompt: prompt.into(),
        })
    }
}

/// What a committed command changed
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Page removed along with these questions
    PageDeleted {
        /// Removed page
        page: PageId,
        /// Removed questions
        questions: Vec<QuestionId>,
    },
    /// Question removed
    QuestionDeleted(QuestionId),
    /// Option removed
    OptionDeleted {
        /// Owning question
        question: QuestionId,
        /// Removed option
        option: OptionId,
    },
    /// Options imported from a list
    OptionsImported {
        /// Target question
        question: QuestionId,
        /// Number of options added
        added: usize,
        /// Options after the import
        options: Vec<QuestionOption>,
    },
}

impl<B: KvBackend, C: Clock> FormBuilder<B, C> {
    /// Check a destructive command and decide whether to ask first
    ///
    /// Deletions always ask. An import asks only when it would replace
    /// existing options.
    ///
    /// # Errors
    /// A missing page, question, option or list.
    pub fn request(&self, command: Command) -> Result<Gate> {
        match &command {
            Command::DeletePage(page_id) => {
                let page = self.page(page_id)?;
                let prompt = format!("Are you sure you want to delete \"{}\"?", page.title);
                Ok(Gate::ask(command, prompt))
            }
            Command::DeleteQuestion(question_id) => {
                self.question(question_id)?;
                Ok(Gate::ask(command, DELETE_QUESTION_PROMPT))
            }
            Command::DeleteOption { question, option } => {
                if self.question(question)?.option_index(option).is_none() {
                    return Err(BuilderError::OptionNotFound {
                        question: question.clone(),
                        option: option.clone(),
                    });
                }
                Ok(Gate::ask(command, DELETE_OPTION_PROMPT))
            }
            Command::ImportList {
                question,
                list_id,
                mode,
            } => {
                let target = self.question(question)?;
                if self.repository().lists().get(list_id).is_none() {
                    return Err(BuilderError::ListNotFound(list_id.clone()));
                }
                if *mode == ImportMode::Replace && !target.options.is_empty() {
                    Ok(Gate::ask(command, REPLACE_OPTIONS_PROMPT))
                } else {
                    Ok(Gate::Ready(Confirmed(command)))
                }
            }
        }
    }

    /// Carry out a confirmed command
    ///
    /// # Errors
    /// References that disappeared since the request, or storage failure.
    pub fn commit(&self, confirmed: Confirmed) -> Result<Outcome> {
        match confirmed.0 {
            Command::DeletePage(page_id) => self.delete_page(page_id),
            Command::DeleteQuestion(question_id) => self.delete_question(question_id),
            Command::DeleteOption { question, option } => self.delete_option(question, option),
            Command::ImportList {
                question,
                list_id,
                mode,
            } => self.import_list(question, &list_id, mode),
        }
    }

    /// Import list options, failing if the author must confirm first
    ///
    /// # Errors
    /// [`BuilderError::ConfirmationRequired`] when replacing existing options,
    /// otherwise as [`FormBuilder::commit`].
    pub fn import_list_options(
        &self,
        question: &QuestionId,
        list_id: &str,
        mode: ImportMode,
    ) -> Result<Outcome> {
        let command = Command::ImportList {
            question: question.clone(),
            list_id: list_id.to_string(),
            mode,
        };
        match self.request(command)? {
            Gate::Ready(confirmed) => self.commit(confirmed),
            Gate::NeedsConfirmation(pending) => Err(BuilderError::ConfirmationRequired {
                prompt: pending.prompt().to_string(),
            }),
        }
    }

    fn delete_page(&self, page_id: PageId) -> Result<Outcome> {
        let page = self.page(&page_id)?;
        let mut removed: Vec<QuestionId> = Vec::new();
        let owned = self
            .repository()
            .question_records_for(&page_id)
            .into_iter()
            .filter_map(|r| r.question_id())
            .chain(page.questions.iter().filter_map(|r| r.question_id()));
        for question_id in owned {
            if removed.contains(&question_id) {
                continue;
            }
            self.repository().remove_question(&question_id)?;
            removed.push(question_id);
        }
        self.repository().remove_page(&page_id)?;
        tracing::info!(page = %page_id, questions = removed.len(), "page deleted");
        Ok(Outcome::PageDeleted {
            page: page_id,
            questions: removed,
        })
    }

    fn delete_question(&self, question_id: QuestionId) -> Result<Outcome> {
        let question = self.question(&question_id)?;
        if let Some(mut page) = self.repository().load_page(&question.page_id) {
            if page.remove_question(&question_id) {
                self.repository().save_page(&page)?;
            }
        }
        self.repository().remove_question(&question_id)?;
        tracing::info!(question = %question_id, "question deleted");
        Ok(Outcome::QuestionDeleted(question_id))
    }

    fn delete_option(&self, question_id: QuestionId, option_id: OptionId) -> Result<Outcome> {
        let question = self.question(&question_id)?;
        let index = question
            .option_index(&option_id)
            .ok_or_else(|| BuilderError::OptionNotFound {
                question: question_id.clone(),
                option: option_id.clone(),
            })?;
        let mut options = question.options.clone();
        options.remove(index);
        self.write_options(&question, options, true)?;
        tracing::info!(question = %question_id, option = %option_id, "option deleted");
        Ok(Outcome::OptionDeleted {
            question: question_id,
            option: option_id,
        })
    }

    fn import_list(&self, question_id: QuestionId, list_id: &str, mode: ImportMode) -> Result<Outcome> {
        let question = self.question(&question_id)?;
        let list = self
            .repository()
            .lists()
            .get(list_id)
            .ok_or_else(|| BuilderError::ListNotFound(list_id.to_string()))?;

        let mut options = match mode {
            ImportMode::Append => question.options.clone(),
            ImportMode::Replace => Vec::new(),
        };
        let mut seen: HashSet<String> = options
            .iter()
            .map(|o| o.text.trim().to_lowercase())
            .collect();
        let before = options.len();
        for entry in &list.options {
            let key = entry.text.trim().to_lowercase();
            if !key.is_empty() && seen.insert(key) {
                options.push(self.imported_option(entry));
            }
        }
        let added = options.len() - before;

        let written = if added == 0 && mode == ImportMode::Append {
            question
        } else {
            self.write_options(&question, options, true)?
        };
        tracing::info!(question = %question_id, list = list_id, %mode, added, "list imported");
        Ok(Outcome::OptionsImported {
            question: question_id,
            added,
            options: written.options,
        })
    }

    fn imported_option(&self, entry: &ListOption) -> QuestionOption {
        OptionDraft {
            text: entry.text.clone(),
            value: entry.value.clone(),
            hint: entry.hint.clone(),
        }
        .into_option(self.ids().option_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuilderConfig;
    use fb_model::{FieldType, ListOption, Lists, OptionList};
    use fb_store::MemoryBackend;

    fn builder() -> FormBuilder<MemoryBackend> {
        FormBuilder::open(MemoryBackend::new(), BuilderConfig::new()).unwrap()
    }

    #[test]
    fn declined_deletion_changes_nothing() {
        let b = builder();
        let page = b.create_page("Keep me").unwrap();
        match b.request(Command::DeletePage(page.id.clone())).unwrap() {
            Gate::NeedsConfirmation(pending) => {
                assert_eq!(pending.prompt(), "Are you sure you want to delete \"Keep me\"?");
                pending.decline();
            }
            Gate::Ready(_) => panic!("page deletion must ask"),
        }
        assert!(b.page(&page.id).is_ok());
    }

    #[test]
    fn append_import_needs_no_confirmation() {
        let b = builder();
        let page = b.create_page("P").unwrap();
        let q = b.create_question(&page.id, FieldType::Radio).unwrap();
        b.create_option(&q.id, OptionDraft::new("yes")).unwrap();

        let outcome = b.import_list_options(&q.id, "yes_no", ImportMode::Append).unwrap();
        let Outcome::OptionsImported { added, options, .. } = outcome else {
            panic!("unexpected outcome");
        };
        assert_eq!(added, 1);
        let texts: Vec<_> = options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["yes", "No"]);
    }

    #[test]
    fn imported_blank_values_default_to_text() {
        let b = builder();
        let mut lists = Lists::new();
        lists.insert(
            "colours".into(),
            OptionList {
                name: "Colours".into(),
                options: vec![
                    ListOption { text: " Red ".into(), value: String::new(), hint: String::new() },
                    ListOption { text: "Blue".into(), value: "b".into(), hint: String::new() },
                    ListOption { text: "  ".into(), value: "blank".into(), hint: String::new() },
                ],
            },
        );
        b.repository().lists().replace(&lists).unwrap();
        let page = b.create_page("P").unwrap();
        let q = b.create_question(&page.id, FieldType::Radio).unwrap();

        b.import_list_options(&q.id, "colours", ImportMode::Append).unwrap();
        let stored = b.question(&q.id).unwrap().options;
        let pairs: Vec<_> = stored.iter().map(|o| (o.text.as_str(), o.value.as_str())).collect();
        assert_eq!(pairs, vec![("Red", "Red"), ("Blue", "b")]);
    }

    #[test]
    fn replace_import_over_options_asks_first() {
        let b = builder();
        let page = b.create_page("P").unwrap();
        let q = b.create_question(&page.id, FieldType::Checkbox).unwrap();
        b.create_option(&q.id, OptionDraft::new("Sometimes")).unwrap();

        let err = b
            .import_list_options(&q.id, "days", ImportMode::Replace)
            .unwrap_err();
        assert!(matches!(err, BuilderError::ConfirmationRequired { .. }));
        assert_eq!(b.question(&q.id).unwrap().options.len(), 1);
    }

    #[test]
    fn unknown_list_is_missing_reference() {
        let b = builder();
        let page = b.create_page("P").unwrap();
        let q = b.create_question(&page.id, FieldType::Radio).unwrap();
        let err = b
            .request(Command::ImportList {
                question: q.id,
                list_id: "colours".into(),
                mode: ImportMode::Append,
            })
            .unwrap_err();
        assert!(err.is_missing_reference());
    }

    #[test]
    fn import_mode_parses_wire_names() {
        assert_eq!("replace".parse::<ImportMode>(), Ok(ImportMode::Replace));
        assert_eq!("".parse::<ImportMode>(), Ok(ImportMode::Append));
        assert!("merge".parse::<ImportMode>().is_err());
    }
}
