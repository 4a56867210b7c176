use chrono::{DateTime, Utc};
use std::sync::Arc;

use practice_core::TopicStat;
use practice_core::model::{AttemptId, AttemptRecord, Cluster, Level};
use practice_core::topics;
use storage::repository::{AttemptRepository, AttemptRow};

use crate::error::SessionError;

/// Presentation-agnostic list item for a stored attempt.
///
/// No pre-formatted strings; the UI formats timestamps and durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptListItem {
    pub id: AttemptId,
    pub cluster: Cluster,
    pub level: Level,
    pub completed_at: DateTime<Utc>,
    pub elapsed_secs: i64,

    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

impl AttemptListItem {
    #[must_use]
    pub fn from_row(row: &AttemptRow) -> Self {
        let record = &row.record;
        let report = record.report();
        Self {
            id: row.id,
            cluster: record.settings().cluster(),
            level: record.settings().level(),
            completed_at: record.completed_at(),
            elapsed_secs: record.elapsed().num_seconds(),
            correct: report.correct_count,
            total: report.total_count,
            percentage: report.percentage,
        }
    }
}

/// Which attempts feed a weak-topic report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicQuery {
    pub cluster: Option<Cluster>,
    /// Most recent attempts to include.
    pub history_limit: u32,
    /// Topics seen fewer times than this are left out.
    pub min_questions: u32,
}

impl Default for TopicQuery {
    fn default() -> Self {
        Self {
            cluster: None,
            history_limit: 50,
            min_questions: 1,
        }
    }
}

impl TopicQuery {
    #[must_use]
    pub fn for_cluster(cluster: Cluster) -> Self {
        Self {
            cluster: Some(cluster),
            ..Self::default()
        }
    }
}

/// Read-only access to past attempts and the reports derived from them.
#[derive(Clone)]
pub struct HistoryService {
    attempts: Arc<dyn AttemptRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { attempts }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(storage::repository::InMemoryRepository::new()))
    }

    /// Load recent attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn recent_attempts(
        &self,
        cluster: Option<Cluster>,
        limit: u32,
    ) -> Result<Vec<AttemptListItem>, SessionError> {
        let rows = self.attempts.list_attempts(cluster, limit).await?;
        Ok(rows.iter().map(AttemptListItem::from_row).collect())
    }

    /// Fetch a stored attempt for review.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the attempt is missing or unreadable.
    pub async fn get_attempt(&self, id: AttemptId) -> Result<AttemptRecord, SessionError> {
        Ok(self.attempts.get_attempt(id).await?)
    }

    /// Per-topic wrong rates over the selected history, recomputed on every call.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn weak_topics(&self, query: &TopicQuery) -> Result<Vec<TopicStat>, SessionError> {
        let rows = self
            .attempts
            .list_attempts(query.cluster, query.history_limit)
            .await?;
        let mut stats = topics::aggregate(rows.iter().map(|row| row.record.report()));
        stats.retain(|stat| stat.total_count >= query.min_questions.max(1));
        Ok(stats)
    }

    /// The `n` topics with the highest wrong rate, skipping topics never missed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn weakest(&self, query: &TopicQuery, n: usize) -> Result<Vec<TopicStat>, SessionError> {
        let mut stats = self.weak_topics(query).await?;
        stats.retain(|stat| stat.wrong_count > 0);
        stats.truncate(n);
        Ok(stats)
    }
}
