use chrono::{DateTime, Utc};
use std::fmt;

use practice_core::model::{
    AnswerLedger, AttemptRecord, OptionKey, Question, QuestionBank, QuestionId, SessionSettings,
};

use super::progress::SessionProgress;
use crate::error::SessionError;

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The cursor moved to this index.
    Moved(usize),
    /// Already at the first/last question; nothing changed.
    AtBoundary,
}

/// A session in the `active` state: question bank, answers and cursor.
///
/// Mutation is crate-private so the controller stays the only writer.
#[derive(Clone)]
pub struct ActiveSession {
    settings: SessionSettings,
    bank: QuestionBank,
    ledger: AnswerLedger,
    cursor: usize,
    furthest: usize,
    started_at: DateTime<Utc>,
}

impl ActiveSession {
    pub(crate) fn new(
        settings: SessionSettings,
        bank: QuestionBank,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            settings,
            bank,
            ledger: AnswerLedger::new(),
            cursor: 0,
            furthest: 0,
            started_at,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The question under the cursor.
    #[must_use]
    pub fn current(&self) -> &Question {
        // The bank is never empty and the cursor never leaves 0..len.
        &self.bank.questions()[self.cursor]
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&OptionKey> {
        self.ledger.answer_for(self.current().id())
    }

    #[must_use]
    pub fn is_answered(&self, question: &QuestionId) -> bool {
        self.ledger.is_answered(question)
    }

    /// Every question has been shown at least once.
    #[must_use]
    pub fn all_visited(&self) -> bool {
        self.furthest + 1 >= self.bank.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.bank.len(),
            answered: self.ledger.answered_count(),
            visited: self.furthest + 1,
            cursor: self.cursor,
            all_visited: self.all_visited(),
        }
    }

    pub(crate) fn next(&mut self) -> Result<Step, SessionError> {
        if self.cursor + 1 >= self.bank.len() {
            return Ok(Step::AtBoundary);
        }
        if self.settings.require_answer_to_advance() && self.current_answer().is_none() {
            return Err(SessionError::AnswerRequired(self.current().id().clone()));
        }
        self.cursor += 1;
        self.furthest = self.furthest.max(self.cursor);
        Ok(Step::Moved(self.cursor))
    }

    pub(crate) fn previous(&mut self) -> Result<Step, SessionError> {
        if self.cursor == 0 {
            return Ok(Step::AtBoundary);
        }
        self.cursor -= 1;
        Ok(Step::Moved(self.cursor))
    }

    pub(crate) fn record_answer(
        &mut self,
        question: &QuestionId,
        key: OptionKey,
    ) -> Result<&AnswerLedger, SessionError> {
        self.ledger = self.ledger.with_answer(&self.bank, question, key)?;
        Ok(&self.ledger)
    }

    /// Snapshot the session as a finished attempt.
    ///
    /// `completed_at` is clamped so it is never earlier than `started_at`.
    pub(crate) fn to_record(&self, completed_at: DateTime<Utc>) -> Result<AttemptRecord, SessionError> {
        Ok(AttemptRecord::new(
            self.settings.clone(),
            self.bank.clone(),
            self.ledger.clone(),
            self.started_at,
            completed_at.max(self.started_at),
        )?)
    }
}

impl fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSession")
            .field("questions", &self.bank.len())
            .field("answered", &self.ledger.answered_count())
            .field("cursor", &self.cursor)
            .field("furthest", &self.furthest)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
