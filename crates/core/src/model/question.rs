use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{OptionKey, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question {id} has an empty stem")]
    EmptyStem { id: QuestionId },

    #[error("question {id} needs at least two options, got {count}")]
    TooFewOptions { id: QuestionId, count: usize },

    #[error("option {key} of question {id} has no text")]
    EmptyOptionText { id: QuestionId, key: OptionKey },

    #[error("correct option {key} is not an option of question {id}")]
    MissingCorrectOption { id: QuestionId, key: OptionKey },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionBankError {
    #[error("question bank is empty")]
    Empty,

    #[error("duplicate question id {0} in bank")]
    DuplicateId(QuestionId),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
///
/// Construction validates that the correct key names one of the options, so a
/// `Question` value can always be scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionParts")]
pub struct Question {
    id: QuestionId,
    stem: String,
    options: BTreeMap<OptionKey, String>,
    correct: OptionKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

#[derive(Deserialize)]
struct QuestionParts {
    id: QuestionId,
    stem: String,
    options: BTreeMap<OptionKey, String>,
    correct: OptionKey,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

impl TryFrom<QuestionParts> for Question {
    type Error = QuestionError;

    fn try_from(parts: QuestionParts) -> Result<Self, Self::Error> {
        Question::new(parts.id, parts.stem, parts.options, parts.correct)
            .map(|q| q.with_topic(parts.topic).with_explanation(parts.explanation))
    }
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the stem is empty, fewer than two options are
    /// given, an option has no text, or `correct` is not one of the option keys.
    pub fn new(
        id: QuestionId,
        stem: impl Into<String>,
        options: BTreeMap<OptionKey, String>,
        correct: OptionKey,
    ) -> Result<Self, QuestionError> {
        if id.as_str().trim().is_empty() {
            return Err(QuestionError::EmptyId);
        }

        let stem = stem.into().trim().to_owned();
        if stem.is_empty() {
            return Err(QuestionError::EmptyStem { id });
        }

        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                id,
                count: options.len(),
            });
        }

        if let Some((key, _)) = options.iter().find(|(_, text)| text.trim().is_empty()) {
            return Err(QuestionError::EmptyOptionText {
                key: key.clone(),
                id,
            });
        }

        if !options.contains_key(&correct) {
            return Err(QuestionError::MissingCorrectOption { id, key: correct });
        }

        Ok(Self {
            id,
            stem,
            options,
            correct,
            topic: None,
            explanation: None,
        })
    }

    /// Attach an instructional-area tag. Blank tags are dropped.
    #[must_use]
    pub fn with_topic(mut self, topic: Option<String>) -> Self {
        self.topic = non_blank(topic);
        self
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: Option<String>) -> Self {
        self.explanation = non_blank(explanation);
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<OptionKey, String> {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> &OptionKey {
        &self.correct
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn has_option(&self, key: &OptionKey) -> bool {
        self.options.contains_key(key)
    }

    #[must_use]
    pub fn is_correct(&self, key: &OptionKey) -> bool {
        &self.correct == key
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

/// Ordered, non-empty set of questions for one session.
///
/// The order is fixed once the bank is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Question>", into = "Vec<Question>")]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Builds a bank from already validated questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Empty` for an empty list and
    /// `QuestionBankError::DuplicateId` when two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(QuestionBankError::DuplicateId(question.id().clone()));
            }
        }

        Ok(Self { questions })
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false` for a constructed bank; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn find(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn position(&self, id: &QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    /// Reorders the bank in place. Used once, before a session starts.
    pub fn reorder_with(&mut self, f: impl FnOnce(&mut [Question])) {
        f(&mut self.questions);
    }
}

impl TryFrom<Vec<Question>> for QuestionBank {
    type Error = QuestionBankError;

    fn try_from(questions: Vec<Question>) -> Result<Self, Self::Error> {
        Self::new(questions)
    }
}

impl From<QuestionBank> for Vec<Question> {
    fn from(bank: QuestionBank) -> Self {
        bank.questions
    }
}

impl<'a> IntoIterator for &'a QuestionBank {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn rejects_correct_key_outside_options() {
        let options = [(key("A"), "yes".to_owned()), (key("B"), "no".to_owned())]
            .into_iter()
            .collect();
        let err = Question::new(qid("q1"), "Pick", options, key("E")).unwrap_err();
        assert_eq!(
            err,
            QuestionError::MissingCorrectOption {
                id: qid("q1"),
                key: key("E"),
            }
        );
    }

    #[test]
    fn rejects_blank_stem_and_single_option() {
        let two: BTreeMap<_, _> = [(key("A"), "a".to_owned()), (key("B"), "b".to_owned())]
            .into_iter()
            .collect();
        assert!(matches!(
            Question::new(qid("q1"), "   ", two, key("A")),
            Err(QuestionError::EmptyStem { .. })
        ));

        let one = [(key("A"), "a".to_owned())].into_iter().collect();
        assert!(matches!(
            Question::new(qid("q1"), "Pick", one, key("A")),
            Err(QuestionError::TooFewOptions { count: 1, .. })
        ));
    }

    #[test]
    fn blank_topic_is_dropped() {
        let q = question("q1", "A", Some("  "));
        assert_eq!(q.topic(), None);
    }

    #[test]
    fn bank_rejects_empty_and_duplicates() {
        assert_eq!(QuestionBank::new(Vec::new()), Err(QuestionBankError::Empty));

        let dup = vec![question("q1", "A", None), question("q1", "B", None)];
        assert_eq!(
            QuestionBank::new(dup),
            Err(QuestionBankError::DuplicateId(qid("q1")))
        );
    }

    #[test]
    fn deserializing_revalidates() {
        let raw = r#"[{"id":"q1","stem":"Pick","options":{"A":"a","B":"b"},"correct":"C"}]"#;
        assert!(serde_json::from_str::<QuestionBank>(raw).is_err());

        let raw = r#"[{"id":"q1","stem":"Pick","options":{"A":"a","B":"b"},"correct":"B","topic":"Pricing"}]"#;
        let bank: QuestionBank = serde_json::from_str(raw).unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.questions()[0].topic(), Some("Pricing"));
    }

    #[test]
    fn deserializing_rejects_blank_keys_and_ids() {
        let raw = r#"[{"id":"q1","stem":"Pick","options":{"":"blank key","B":"b"},"correct":""}]"#;
        assert!(serde_json::from_str::<QuestionBank>(raw).is_err());

        let raw = r#"[{"id":"  ","stem":"Pick","options":{"A":"a","B":"b"},"correct":"A"}]"#;
        assert!(serde_json::from_str::<QuestionBank>(raw).is_err());
    }

    #[test]
    fn bank_lookup_by_id() {
        let bank = bank(&["A", "B", "C"]);
        assert_eq!(bank.position(&qid("q2")), Some(1));
        assert!(bank.find(&qid("q9")).is_none());
    }
}
