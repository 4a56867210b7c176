#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod generation;
pub mod history;
pub mod sessions;

pub use practice_core::Clock;

pub use app_services::AppServices;
pub use config::{GeneratorConfig, PracticeConfig};
pub use error::{AppServicesError, GenerationError, PersistenceWarning, SessionError};
pub use generation::{HttpQuestionGenerator, QuestionGenerator};
pub use history::{AttemptListItem, HistoryService, TopicQuery};

pub use sessions::{
    ActiveSession, Applied, CompletedSession, Effect, FinalizeOutcome, SessionController,
    SessionEvent, SessionLoop, SessionProgress, SessionState, StateKind, Step,
};
