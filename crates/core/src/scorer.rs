use serde::{Deserialize, Serialize};

use crate::model::{AnswerLedger, OptionKey, QuestionBank, QuestionId};

//
// ─── REPORT TYPES ──────────────────────────────────────────────────────────────
//

/// Outcome for one question, parallel to the bank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub user_answer: Option<OptionKey>,
    pub is_correct: bool,
    #[serde(default)]
    pub topic: Option<String>,
}

/// Aggregate score for a bank + ledger pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub correct_count: u32,
    pub total_count: u32,
    pub percentage: u32,
    pub per_question: Vec<QuestionResult>,
}

impl ScoreReport {
    /// A report for zero questions. Stored histories may contain these.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            correct_count: 0,
            total_count: 0,
            percentage: 0,
            per_question: Vec::new(),
        }
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.per_question
            .iter()
            .filter(|r| r.user_answer.is_none())
            .count()
    }

    /// Results the user got wrong, including unanswered questions.
    pub fn incorrect(&self) -> impl Iterator<Item = &QuestionResult> {
        self.per_question.iter().filter(|r| !r.is_correct)
    }
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Score `ledger` against `bank`.
///
/// Pure: the same inputs always produce an equal report. Unanswered questions
/// count towards the total and never towards the correct count.
#[must_use]
pub fn score(bank: &QuestionBank, ledger: &AnswerLedger) -> ScoreReport {
    let per_question: Vec<QuestionResult> = bank
        .iter()
        .map(|question| {
            let user_answer = ledger.answer_for(question.id()).cloned();
            let is_correct = user_answer
                .as_ref()
                .is_some_and(|answer| question.is_correct(answer));
            QuestionResult {
                question_id: question.id().clone(),
                user_answer,
                is_correct,
                topic: question.topic().map(str::to_owned),
            }
        })
        .collect();

    let correct_count = saturating_u32(per_question.iter().filter(|r| r.is_correct).count());
    let total_count = saturating_u32(per_question.len());

    ScoreReport {
        correct_count,
        total_count,
        percentage: percentage(correct_count, total_count),
        per_question,
    }
}

/// `round(100 * correct / total)` with halves rounded up; `0` when `total == 0`.
#[must_use]
pub fn percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct.min(total));
    let total = u64::from(total);
    let rounded = (200 * correct + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(100)
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
