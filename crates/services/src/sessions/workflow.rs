use std::sync::Arc;

use rand::rng;
use rand::seq::SliceRandom;
use tracing::warn;

use practice_core::ScoreReport;
use practice_core::model::{AttemptId, SessionSettings};
use storage::repository::AttemptRepository;

use super::controller::{
    Applied, Effect, GenerationRequest, GenerationResponse, PersistRequest, PersistResponse,
    SessionController, SessionEvent,
};
use crate::error::{PersistenceWarning, SessionError};
use crate::generation::QuestionGenerator;

/// Scored outcome of `SessionLoop::finalize`.
#[derive(Debug)]
pub struct FinalizeOutcome {
    pub report: ScoreReport,
    /// Persistence never blocks results; a failure is reported here.
    pub saved: Result<AttemptId, PersistenceWarning>,
}

/// Executes controller intents against the injected collaborators.
#[derive(Clone)]
pub struct SessionLoop {
    generator: Arc<dyn QuestionGenerator>,
    attempts: Arc<dyn AttemptRepository>,
}

impl SessionLoop {
    #[must_use]
    pub fn new(
        generator: Arc<dyn QuestionGenerator>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            generator,
            attempts,
        }
    }

    /// Run a generation request. The bank is shuffled here, once, when the
    /// settings ask for it.
    pub async fn fulfil(&self, request: GenerationRequest) -> GenerationResponse {
        let shuffle = request.settings.shuffle_questions();
        let result = self
            .generator
            .generate(&request.settings)
            .await
            .map(|mut bank| {
                if shuffle {
                    let mut rng = rng();
                    bank.reorder_with(|questions| questions.shuffle(&mut rng));
                }
                bank
            });
        GenerationResponse {
            ticket: request.ticket,
            result,
        }
    }

    /// Store a finished attempt.
    pub async fn persist(&self, request: PersistRequest) -> PersistResponse {
        let result = self
            .attempts
            .append_attempt(&request.record)
            .await
            .map_err(PersistenceWarning::from);
        if let Err(warning) = &result {
            warn!(ticket = %request.ticket, error = %warning, "persisting attempt failed");
        }
        PersistResponse {
            ticket: request.ticket,
            result,
        }
    }

    /// Perform `effect` and return the event to feed back, if any.
    pub async fn execute(&self, effect: Effect) -> Option<SessionEvent> {
        match effect {
            Effect::Idle | Effect::GenerationFailed(_) | Effect::Discarded => None,
            Effect::Generate(request) => Some(SessionEvent::Generated(self.fulfil(request).await)),
            Effect::Persist(request) => Some(SessionEvent::Persisted(self.persist(request).await)),
        }
    }

    /// Submit `settings` and wait for the question bank.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the controller rejects the submission.
    /// Generation failures are reported through `Applied::Failed`.
    pub async fn start(
        &self,
        controller: &mut SessionController,
        settings: SessionSettings,
    ) -> Result<Applied, SessionError> {
        let request = controller.submit(settings)?;
        let response = self.fulfil(request).await;
        Ok(controller.apply_generation(response))
    }

    /// Finalize the active session and save the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the session cannot be finalized.
    pub async fn finalize(
        &self,
        controller: &mut SessionController,
    ) -> Result<FinalizeOutcome, SessionError> {
        let request = controller.finalize()?;
        let report = request.record.report().clone();
        let response = self.persist(request).await;
        controller.apply_persistence(&response);
        Ok(FinalizeOutcome {
            report,
            saved: response.result,
        })
    }
}
