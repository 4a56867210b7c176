//! Shared error types for the services crate.

use thiserror::Error;

use practice_core::model::{AttemptError, LedgerError, QuestionBankError, QuestionId, SettingsError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::sessions::{EventKind, StateKind};

/// Errors emitted by question generators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("question generation is not configured")]
    Disabled,
    #[error("question generation returned no questions")]
    EmptyBank,
    #[error("question generation failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("question generation returned an invalid payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Bank(#[from] QuestionBankError),
}

/// Errors emitted by the session controller and the services driving it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Configuration(#[from] SettingsError),
    #[error("a question set is already being generated")]
    RequestInFlight,
    #[error("cannot {event} while {state}")]
    InvalidTransition { state: StateKind, event: EventKind },
    #[error("question {0} must be answered before moving on")]
    AnswerRequired(QuestionId),
    #[error("only {visited} of {total} questions visited")]
    NotAllVisited { visited: usize, total: usize },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result persistence failed after the session was scored.
///
/// Non-blocking: the score and review stay available to the user.
#[derive(Debug, Error)]
#[error("results were scored but could not be saved: {0}")]
pub struct PersistenceWarning(#[from] pub StorageError);

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
