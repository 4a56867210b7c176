use practice_core::model::{AttemptId, AttemptRecord, Cluster};

use super::SqliteRepository;
use super::mapping::{map_attempt_row, map_attempt_row_with_id, to_json};
use crate::repository::{AttemptRepository, AttemptRow, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempt(&self, record: &AttemptRecord) -> Result<AttemptId, StorageError> {
        let settings = record.settings();
        let report = record.report();

        let res = sqlx::query(
            r"
                INSERT INTO attempts (
                    cluster, level, settings_json, bank_json, ledger_json,
                    started_at, completed_at, correct_count, total_count, percentage
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(settings.cluster().as_str())
        .bind(settings.level().as_str())
        .bind(to_json("settings_json", settings)?)
        .bind(to_json("bank_json", record.bank())?)
        .bind(to_json("ledger_json", record.ledger())?)
        .bind(record.started_at())
        .bind(record.completed_at())
        .bind(i64::from(report.correct_count))
        .bind(i64::from(report.total_count))
        .bind(i64::from(report.percentage))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let id = AttemptId::new(res.last_insert_rowid());
        tracing::debug!(attempt_id = %id, cluster = %settings.cluster(), "attempt stored");
        Ok(id)
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<AttemptRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    settings_json, bank_json, ledger_json,
                    started_at, completed_at, correct_count, total_count
                FROM attempts
                WHERE id = ?1
            ",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_attempt_row(&row)
    }

    async fn list_attempts(
        &self,
        cluster: Option<Cluster>,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT
                    id, settings_json, bank_json, ledger_json,
                    started_at, completed_at, correct_count, total_count
                FROM attempts
            ",
        );

        let mut bind_index = 1;
        if cluster.is_some() {
            sql.push_str(" WHERE cluster = ?1");
            bind_index += 1;
        }
        sql.push_str(" ORDER BY completed_at DESC, id DESC");
        sql.push_str(" LIMIT ?");
        sql.push_str(&bind_index.to_string());

        let mut query = sqlx::query(&sql);
        if let Some(cluster) = cluster {
            query = query.bind(cluster.as_str());
        }
        query = query.bind(i64::from(limit));

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_attempt_row_with_id(&row)?);
        }
        Ok(out)
    }
}
