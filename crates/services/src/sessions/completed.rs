use chrono::Duration;

use practice_core::model::{AttemptId, AttemptRecord, Question};
use practice_core::{QuestionResult, ScoreReport};

/// One row of the review screen: the question with the user's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewItem<'a> {
    pub position: usize,
    pub question: &'a Question,
    pub result: &'a QuestionResult,
}

/// Where the finished attempt stands with result persistence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Pending,
    Saved(AttemptId),
    Failed(String),
}

/// A scored session, shared by the `results` and `review` states.
#[derive(Debug, Clone)]
pub struct CompletedSession {
    record: AttemptRecord,
    save_status: SaveStatus,
}

impl CompletedSession {
    pub(crate) fn new(record: AttemptRecord) -> Self {
        Self {
            record,
            save_status: SaveStatus::Pending,
        }
    }

    #[must_use]
    pub fn record(&self) -> &AttemptRecord {
        &self.record
    }

    #[must_use]
    pub fn report(&self) -> &ScoreReport {
        self.record.report()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.record.elapsed()
    }

    #[must_use]
    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub(crate) fn set_save_status(&mut self, status: SaveStatus) {
        self.save_status = status;
    }

    /// Questions paired with their results, in bank order.
    #[must_use]
    pub fn review_items(&self) -> Vec<ReviewItem<'_>> {
        self.record
            .bank()
            .iter()
            .zip(&self.report().per_question)
            .enumerate()
            .map(|(position, (question, result))| ReviewItem {
                position,
                question,
                result,
            })
            .collect()
    }

    /// Only the items answered wrong or left unanswered.
    #[must_use]
    pub fn missed_items(&self) -> Vec<ReviewItem<'_>> {
        self.review_items()
            .into_iter()
            .filter(|item| !item.result.is_correct)
            .collect()
    }
}
