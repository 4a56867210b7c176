use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::{AnswerLedger, QuestionBank, SessionSettings};
use crate::scorer::{self, ScoreReport};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("stored score {stored_correct}/{stored_total} does not match recomputed {correct}/{total}")]
    CountMismatch {
        stored_correct: u32,
        stored_total: u32,
        correct: u32,
        total: u32,
    },
}

/// A finished practice session, as handed to result persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    settings: SessionSettings,
    bank: QuestionBank,
    ledger: AnswerLedger,
    report: ScoreReport,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// Build a record for a session that was just finalized.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidTimeRange` if `completed_at` is before `started_at`.
    pub fn new(
        settings: SessionSettings,
        bank: QuestionBank,
        ledger: AnswerLedger,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if completed_at < started_at {
            return Err(AttemptError::InvalidTimeRange);
        }
        let report = scorer::score(&bank, &ledger);
        Ok(Self {
            settings,
            bank,
            ledger,
            report,
            started_at,
            completed_at,
        })
    }

    /// Rehydrate a record from persisted storage.
    ///
    /// The score is recomputed from the bank and ledger and checked against the
    /// stored counts.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::CountMismatch` if the stored counts disagree with
    /// the recomputed score, or `AttemptError::InvalidTimeRange`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        settings: SessionSettings,
        bank: QuestionBank,
        ledger: AnswerLedger,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        stored_correct: u32,
        stored_total: u32,
    ) -> Result<Self, AttemptError> {
        let record = Self::new(settings, bank, ledger, started_at, completed_at)?;
        if record.report.correct_count != stored_correct || record.report.total_count != stored_total
        {
            return Err(AttemptError::CountMismatch {
                stored_correct,
                stored_total,
                correct: record.report.correct_count,
                total: record.report.total_count,
            });
        }
        Ok(record)
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
    pub fn report(&self) -> &ScoreReport {
        &self.report
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.completed_at - self.started_at
    }
}
