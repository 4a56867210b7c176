use practice_core::model::{
    AnswerLedger, AttemptId, AttemptRecord, QuestionBank, SessionSettings,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;

use crate::repository::{AttemptRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn to_json<T: Serialize>(field: &'static str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value)
        .map_err(|e| StorageError::Serialization(format!("{field}: {e}")))
}

fn from_json<T: DeserializeOwned>(field: &'static str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(format!("{field}: {e}")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<AttemptRecord, StorageError> {
    let settings: SessionSettings =
        from_json("settings_json", &row.try_get::<String, _>("settings_json").map_err(ser)?)?;
    let bank: QuestionBank =
        from_json("bank_json", &row.try_get::<String, _>("bank_json").map_err(ser)?)?;
    let ledger: AnswerLedger =
        from_json("ledger_json", &row.try_get::<String, _>("ledger_json").map_err(ser)?)?;

    let correct = u32_from_i64(
        "correct_count",
        row.try_get::<i64, _>("correct_count").map_err(ser)?,
    )?;
    let total = u32_from_i64(
        "total_count",
        row.try_get::<i64, _>("total_count").map_err(ser)?,
    )?;

    AttemptRecord::from_persisted(
        settings,
        bank,
        ledger,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
        correct,
        total,
    )
    .map_err(ser)
}

pub(crate) fn map_attempt_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<AttemptRow, StorageError> {
    let id = AttemptId::new(row.try_get("id").map_err(ser)?);
    Ok(AttemptRow::new(id, map_attempt_row(row)?))
}
