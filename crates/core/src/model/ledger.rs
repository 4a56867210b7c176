use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{OptionKey, QuestionId};
use crate::model::question::QuestionBank;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LedgerError {
    #[error("question {0} is not part of this session")]
    UnknownQuestion(QuestionId),

    #[error("option {key} is not an option of question {question}")]
    UnknownOption { question: QuestionId, key: OptionKey },
}

/// Selected answers for one session, keyed by question id.
///
/// The ledger is an immutable value: `with_answer` returns a new ledger and
/// leaves the receiver untouched, so earlier snapshots stay valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerLedger {
    entries: Arc<BTreeMap<QuestionId, OptionKey>>,
}

impl AnswerLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` for `question`, replacing any earlier selection.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UnknownQuestion` if the bank has no such question and
    /// `LedgerError::UnknownOption` if `key` is not one of its options.
    pub fn with_answer(
        &self,
        bank: &QuestionBank,
        question: &QuestionId,
        key: OptionKey,
    ) -> Result<Self, LedgerError> {
        let found = bank
            .find(question)
            .ok_or_else(|| LedgerError::UnknownQuestion(question.clone()))?;
        if !found.has_option(&key) {
            return Err(LedgerError::UnknownOption {
                question: question.clone(),
                key,
            });
        }

        if self.answer_for(question) == Some(&key) {
            return Ok(self.clone());
        }

        let mut entries = (*self.entries).clone();
        entries.insert(question.clone(), key);
        Ok(Self {
            entries: Arc::new(entries),
        })
    }

    /// Build a ledger from raw entries without checking them against a bank.
    ///
    /// Used when rehydrating persisted attempts; the scorer treats unknown keys
    /// as wrong answers.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (QuestionId, OptionKey)>) -> Self {
        Self {
            entries: Arc::new(entries.into_iter().collect()),
        }
    }

    #[must_use]
    pub fn is_answered(&self, question: &QuestionId) -> bool {
        self.entries.contains_key(question)
    }

    #[must_use]
    pub fn answer_for(&self, question: &QuestionId) -> Option<&OptionKey> {
        self.entries.get(question)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &OptionKey)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::test_support::{bank, key, qid};

    #[test]
    fn record_then_is_answered() {
        let bank = bank(&["A", "B"]);
        let ledger = AnswerLedger::new()
            .with_answer(&bank, &qid("q1"), key("C"))
            .unwrap();

        assert!(ledger.is_answered(&qid("q1")));
        assert!(!ledger.is_answered(&qid("q2")));
        assert_eq!(ledger.answer_for(&qid("q1")), Some(&key("C")));
    }

    #[test]
    fn recording_same_answer_twice_matches_once() {
        let bank = bank(&["A", "B"]);
        let once = AnswerLedger::new()
            .with_answer(&bank, &qid("q2"), key("B"))
            .unwrap();
        let twice = once.with_answer(&bank, &qid("q2"), key("B")).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn overwrite_leaves_previous_snapshot_intact() {
        let bank = bank(&["A"]);
        let first = AnswerLedger::new()
            .with_answer(&bank, &qid("q1"), key("A"))
            .unwrap();
        let second = first.with_answer(&bank, &qid("q1"), key("D")).unwrap();

        assert_eq!(first.answer_for(&qid("q1")), Some(&key("A")));
        assert_eq!(second.answer_for(&qid("q1")), Some(&key("D")));
        assert_eq!(second.answered_count(), 1);
    }

    #[test]
    fn rejects_unknown_question_and_option() {
        let bank = bank(&["A"]);
        let ledger = AnswerLedger::new();

        assert_eq!(
            ledger.with_answer(&bank, &qid("q7"), key("A")),
            Err(LedgerError::UnknownQuestion(qid("q7")))
        );
        assert_eq!(
            ledger.with_answer(&bank, &qid("q1"), key("X")),
            Err(LedgerError::UnknownOption {
                question: qid("q1"),
                key: key("X"),
            })
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn serializes_as_plain_map() {
        let ledger = AnswerLedger::from_entries([(qid("q1"), key("A"))]);
        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"{"q1":"A"}"#);
        let back: AnswerLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }
}
