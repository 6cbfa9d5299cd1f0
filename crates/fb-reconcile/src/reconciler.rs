//! Question reconciliation and ordering
//!
//! A question lives in two places: embedded in its page and under its own
//! key. [`resolve_questions`] folds both into one ordered list.

use fb_model::{Direction, OptionId, Page, Question, QuestionId, QuestionOption, QuestionRecord};
use indexmap::IndexMap;

/// Merged, ordered view of a page's questions
///
/// Embedded copies form the base; standalone records owned by the page
/// overlay them field by field (present, non-empty fields win) or are
/// appended when the page has no copy. Entries without an id or without a
/// known field type are dropped.
///
/// Ordering is by `position` when every question has one, otherwise by the
/// timestamp in the id with timestamp-less ids last. The sort is stable.
#[must_use]
pub fn resolve_questions(page: &Page, standalone: &[QuestionRecord]) -> Vec<Question> {
    let mut combined: IndexMap<QuestionId, QuestionRecord> = IndexMap::new();

    for record in &page.questions {
        let Some(id) = record.question_id() else {
            tracing::debug!(page = %page.id, "dropping embedded question without id");
            continue;
        };
        match combined.get_mut(&id) {
            Some(base) => *base = base.overlaid_with(record),
            None => {
                combined.insert(id, record.clone());
            }
        }
    }

    let mut owned: Vec<(QuestionId, &QuestionRecord)> = standalone
        .iter()
        .filter(|record| record.page().as_ref() == Some(&page.id))
        .filter_map(|record| record.question_id().map(|id| (id, record)))
        .collect();
    owned.sort_by(|(a, _), (b, _)| {
        timestamp_order(a)
            .cmp(&timestamp_order(b))
            .then_with(|| a.cmp(b))
    });

    for (id, record) in owned {
        match combined.get_mut(&id) {
            Some(base) => *base = base.overlaid_with(record),
            None => {
                combined.insert(id, record.clone());
            }
        }
    }

    let mut questions: Vec<Question> = combined
        .into_values()
        .filter_map(|record| match record.to_question(Some(&page.id)) {
            Ok(question) => Some(question),
            Err(defect) => {
                tracing::debug!(page = %page.id, %defect, "dropping question record");
                None
            }
        })
        .collect();

    sort_questions(&mut questions);
    questions
}

/// Numeric timestamp order; ids without one sort last
fn timestamp_order(id: &QuestionId) -> (bool, u64) {
    let ts = id.timestamp();
    (ts.is_none(), ts.unwrap_or_default())
}

/// Stable sort by position, or by id timestamp when any position is missing
pub fn sort_questions(questions: &mut [Question]) {
    if questions.iter().all(|q| q.position.is_some()) {
        questions.sort_by_key(|q| q.position);
    } else {
        questions.sort_by_key(|q| timestamp_order(&q.id));
    }
}

/// Swap `items[index]` with its neighbour; `false` at a boundary
fn step<T>(items: &mut [T], index: usize, direction: Direction) -> bool {
    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => index.checked_add(1).filter(|&i| i < items.len()),
    };
    match target {
        Some(target) => {
            items.swap(index, target);
            true
        }
        None => false,
    }
}

/// Move one question a single step and renumber positions `0..n`
///
/// Unknown ids and moves past either end leave the order unchanged.
#[must_use]
pub fn reorder(
    mut questions: Vec<Question>,
    moved: &QuestionId,
    direction: Direction,
) -> Vec<Question> {
    if let Some(index) = questions.iter().position(|q| &q.id == moved) {
        if !step(&mut questions, index, direction) {
            tracing::debug!(question = %moved, %direction, "move at boundary ignored");
        }
    }
    for (position, question) in (0u32..).zip(questions.iter_mut()) {
        question.position = Some(position);
    }
    questions
}

/// Move one option a single step; returns whether anything moved
pub fn move_option(
    options: &mut [QuestionOption],
    option_id: &OptionId,
    direction: Direction,
) -> bool {
    options
        .iter()
        .position(|o| &o.id == option_id)
        .is_some_and(|index| step(options, index, direction))
}
