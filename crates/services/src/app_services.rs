use std::sync::Arc;

use practice_core::model::{Cluster, Level, SessionSettings};
use storage::repository::{AttemptRepository, Storage};

use crate::Clock;
use crate::config::PracticeConfig;
use crate::error::AppServicesError;
use crate::generation::{HttpQuestionGenerator, QuestionGenerator};
use crate::history::HistoryService;
use crate::sessions::{SessionController, SessionLoop};

/// Assembles app-facing services around one storage backend and generator.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    require_answer_to_advance: bool,
    generation_enabled: bool,
    session_loop: Arc<SessionLoop>,
    history: Arc<HistoryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP generator.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(config: &PracticeConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        let generator = HttpQuestionGenerator::new(config.generator.clone());
        let generation_enabled = generator.enabled();
        Ok(Self::assemble(
            clock,
            config.require_answer_to_advance,
            generation_enabled,
            Arc::new(generator),
            storage.attempts,
        ))
    }

    /// Build services over in-memory storage with the given generator.
    #[must_use]
    pub fn in_memory(generator: Arc<dyn QuestionGenerator>, clock: Clock) -> Self {
        Self::assemble(clock, false, true, generator, Storage::in_memory().attempts)
    }

    fn assemble(
        clock: Clock,
        require_answer_to_advance: bool,
        generation_enabled: bool,
        generator: Arc<dyn QuestionGenerator>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            require_answer_to_advance,
            generation_enabled,
            session_loop: Arc::new(SessionLoop::new(generator, Arc::clone(&attempts))),
            history: Arc::new(HistoryService::new(attempts)),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// `false` when no generation backend is configured; submissions will fail.
    #[must_use]
    pub fn generation_enabled(&self) -> bool {
        self.generation_enabled
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoop> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    /// A fresh controller sharing this service graph's clock.
    #[must_use]
    pub fn new_controller(&self) -> SessionController {
        SessionController::new(self.clock)
    }

    /// Settings prefilled with the configured answer guard.
    #[must_use]
    pub fn settings(&self, cluster: Cluster, level: Level, question_count: u32) -> SessionSettings {
        SessionSettings::new(cluster, level, question_count)
            .with_require_answer_to_advance(self.require_answer_to_advance)
    }
}
