use std::fmt;

use practice_core::Clock;
use practice_core::model::{
    AnswerLedger, AttemptId, AttemptRecord, OptionKey, QuestionBank, QuestionId, SessionSettings,
};
use tracing::{debug, info, warn};

use super::active::{ActiveSession, Step};
use super::completed::{CompletedSession, SaveStatus};
use super::progress::SessionProgress;
use crate::error::{GenerationError, PersistenceWarning, SessionError};

//
// ─── STATES AND EVENTS ─────────────────────────────────────────────────────────
//

/// Discriminant of `SessionState`, for logging and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Configuring,
    Loading,
    Active,
    Results,
    Review,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StateKind::Configuring => "configuring",
            StateKind::Loading => "loading",
            StateKind::Active => "active",
            StateKind::Results => "showing results",
            StateKind::Review => "reviewing",
        })
    }
}

/// User-initiated operations that can be rejected in the wrong state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Submit,
    Answer,
    Next,
    Previous,
    Finalize,
    ShowReview,
    ShowResults,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Submit => "submit settings",
            EventKind::Answer => "record an answer",
            EventKind::Next => "go to the next question",
            EventKind::Previous => "go to the previous question",
            EventKind::Finalize => "finish the session",
            EventKind::ShowReview => "open the review",
            EventKind::ShowResults => "return to results",
        })
    }
}

/// Session lifecycle. Each variant owns the data valid in that state.
#[derive(Debug)]
pub enum SessionState {
    Configuring { last_error: Option<String> },
    Loading {
        ticket: RequestTicket,
        settings: SessionSettings,
    },
    Active(ActiveSession),
    Results(CompletedSession),
    Review(CompletedSession),
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Configuring { last_error: None }
    }
}

impl SessionState {
    #[must_use]
    pub fn kind(&self) -> StateKind {
        match self {
            SessionState::Configuring { .. } => StateKind::Configuring,
            SessionState::Loading { .. } => StateKind::Loading,
            SessionState::Active(_) => StateKind::Active,
            SessionState::Results(_) => StateKind::Results,
            SessionState::Review(_) => StateKind::Review,
        }
    }
}

//
// ─── INTENTS ───────────────────────────────────────────────────────────────────
//

/// Tags an outstanding request with the session generation that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Intent to fetch a question bank for `settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub ticket: RequestTicket,
    pub settings: SessionSettings,
}

/// Outcome of a `GenerationRequest`, fed back into the controller.
#[derive(Debug)]
pub struct GenerationResponse {
    pub ticket: RequestTicket,
    pub result: Result<QuestionBank, GenerationError>,
}

/// Intent to persist a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistRequest {
    pub ticket: RequestTicket,
    pub record: AttemptRecord,
}

/// Outcome of a `PersistRequest`, fed back into the controller.
#[derive(Debug)]
pub struct PersistResponse {
    pub ticket: RequestTicket,
    pub result: Result<AttemptId, PersistenceWarning>,
}

/// What `apply_generation` did with a response.
#[derive(Debug)]
pub enum Applied {
    Activated { questions: usize },
    Failed(GenerationError),
    /// The response belongs to a request that was cancelled by a restart.
    Stale,
}

/// Input to `SessionController::dispatch`.
#[derive(Debug)]
pub enum SessionEvent {
    Submit(SessionSettings),
    Generated(GenerationResponse),
    Answer { question: QuestionId, key: OptionKey },
    Next,
    Previous,
    Finalize,
    Persisted(PersistResponse),
    ShowReview,
    ShowResults,
    Restart,
}

/// Work the caller must perform after a dispatch, or what became of a
/// fed-back response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Idle,
    Generate(GenerationRequest),
    Persist(PersistRequest),
    /// Generation failed; the message is also kept as `last_error`.
    GenerationFailed(String),
    /// The response belonged to a cancelled request and was dropped.
    Discarded,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Single owner of a practice session.
///
/// The controller performs no I/O. Operations that need the network or storage
/// return an intent (`GenerationRequest`, `PersistRequest`); the caller executes
/// it and feeds the response back. Responses carry the ticket they were issued
/// with, and anything issued before the last `restart` is ignored.
#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    generation: u64,
    clock: Clock,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(Clock::default())
    }
}

impl SessionController {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            state: SessionState::default(),
            generation: 0,
            clock,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    /// Message of the last failed generation, shown on the configuration form.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Configuring { last_error } => last_error.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<&ActiveSession> {
        match &self.state {
            SessionState::Active(active) => Some(active),
            _ => None,
        }
    }

    /// The scored session, in either `results` or `review`.
    #[must_use]
    pub fn completed(&self) -> Option<&CompletedSession> {
        match &self.state {
            SessionState::Results(done) | SessionState::Review(done) => Some(done),
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.active().map(ActiveSession::progress)
    }

    /// Submit settings and move to `loading`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::RequestInFlight` while a request is outstanding,
    /// `SessionError::Configuration` for invalid settings (state unchanged), and
    /// `SessionError::InvalidTransition` outside `configuring`.
    pub fn submit(&mut self, settings: SessionSettings) -> Result<GenerationRequest, SessionError> {
        match self.state.kind() {
            StateKind::Configuring => {}
            StateKind::Loading => return Err(SessionError::RequestInFlight),
            state => {
                return Err(SessionError::InvalidTransition {
                    state,
                    event: EventKind::Submit,
                });
            }
        }
        settings.validate()?;

        self.generation += 1;
        let ticket = RequestTicket(self.generation);
        debug!(
            %ticket,
            cluster = %settings.cluster(),
            level = %settings.level(),
            questions = settings.question_count(),
            "question generation requested"
        );
        self.state = SessionState::Loading {
            ticket,
            settings: settings.clone(),
        };
        Ok(GenerationRequest { ticket, settings })
    }

    /// Feed a generation result back into the session.
    ///
    /// Responses whose ticket does not match the pending request are dropped.
    pub fn apply_generation(&mut self, response: GenerationResponse) -> Applied {
        let settings = match &self.state {
            SessionState::Loading { ticket, settings } if *ticket == response.ticket => {
                settings.clone()
            }
            _ => {
                debug!(ticket = %response.ticket, state = %self.kind(), "discarding stale generation response");
                return Applied::Stale;
            }
        };

        match response.result {
            Ok(bank) => {
                let questions = bank.len();
                info!(ticket = %response.ticket, questions, "session started");
                self.state =
                    SessionState::Active(ActiveSession::new(settings, bank, self.clock.now()));
                Applied::Activated { questions }
            }
            Err(err) => {
                warn!(ticket = %response.ticket, error = %err, "question generation failed");
                self.state = SessionState::Configuring {
                    last_error: Some(err.to_string()),
                };
                Applied::Failed(err)
            }
        }
    }

    /// Record an answer for any question in the bank.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `active` and
    /// `SessionError::Ledger` for unknown questions or options.
    pub fn record_answer(
        &mut self,
        question: &QuestionId,
        key: OptionKey,
    ) -> Result<&AnswerLedger, SessionError> {
        self.active_mut(EventKind::Answer)?
            .record_answer(question, key)
    }

    /// Record an answer for the question under the cursor.
    ///
    /// # Errors
    ///
    /// Same as `record_answer`.
    pub fn answer_current(&mut self, key: OptionKey) -> Result<&AnswerLedger, SessionError> {
        let active = self.active_mut(EventKind::Answer)?;
        let question = active.current().id().clone();
        active.record_answer(&question, key)
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `active`, or
    /// `SessionError::AnswerRequired` when the answer guard is on.
    pub fn next(&mut self) -> Result<Step, SessionError> {
        self.active_mut(EventKind::Next)?.next()
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `active`.
    pub fn previous(&mut self) -> Result<Step, SessionError> {
        self.active_mut(EventKind::Previous)?.previous()
    }

    /// Score the session and move to `results`.
    ///
    /// Unanswered questions are scored as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `active` and
    /// `SessionError::NotAllVisited` until every question has been shown.
    pub fn finalize(&mut self) -> Result<PersistRequest, SessionError> {
        let record = {
            let SessionState::Active(active) = &self.state else {
                return Err(self.invalid(EventKind::Finalize));
            };
            if !active.all_visited() {
                let progress = active.progress();
                return Err(SessionError::NotAllVisited {
                    visited: progress.visited,
                    total: progress.total,
                });
            }
            active.to_record(self.clock.now())?
        };

        let ticket = RequestTicket(self.generation);
        let report = record.report();
        info!(
            %ticket,
            correct = report.correct_count,
            total = report.total_count,
            percentage = report.percentage,
            "session finalized"
        );
        self.state = SessionState::Results(CompletedSession::new(record.clone()));
        Ok(PersistRequest { ticket, record })
    }

    /// Record the outcome of result persistence.
    ///
    /// Returns `false` when the response is stale or there is no finished
    /// session to attach it to. A failure never leaves `results`.
    pub fn apply_persistence(&mut self, response: &PersistResponse) -> bool {
        if response.ticket != RequestTicket(self.generation) {
            debug!(ticket = %response.ticket, "discarding stale persistence response");
            return false;
        }
        let (SessionState::Results(done) | SessionState::Review(done)) = &mut self.state else {
            return false;
        };
        match &response.result {
            Ok(id) => done.set_save_status(SaveStatus::Saved(*id)),
            Err(warning) => {
                warn!(error = %warning, "attempt could not be saved");
                done.set_save_status(SaveStatus::Failed(warning.to_string()));
            }
        }
        true
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `results`.
    pub fn show_review(&mut self) -> Result<(), SessionError> {
        self.transition(EventKind::ShowReview, |state| match state {
            SessionState::Results(done) => Ok(SessionState::Review(done)),
            other => Err(other),
        })
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `review`.
    pub fn show_results(&mut self) -> Result<(), SessionError> {
        self.transition(EventKind::ShowResults, |state| match state {
            SessionState::Review(done) => Ok(SessionState::Results(done)),
            other => Err(other),
        })
    }

    /// Discard the current session and start over in `configuring`.
    ///
    /// Always allowed. Any in-flight request is cancelled: its response will be
    /// treated as stale.
    pub fn restart(&mut self) {
        let from = self.kind();
        self.generation += 1;
        self.state = SessionState::default();
        debug!(%from, generation = self.generation, "session restarted");
    }

    /// Apply `event` and report the follow-up work, if any.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation.
    pub fn dispatch(&mut self, event: SessionEvent) -> Result<Effect, SessionError> {
        match event {
            SessionEvent::Submit(settings) => self.submit(settings).map(Effect::Generate),
            SessionEvent::Generated(response) => Ok(match self.apply_generation(response) {
                Applied::Activated { .. } => Effect::Idle,
                Applied::Failed(err) => Effect::GenerationFailed(err.to_string()),
                Applied::Stale => Effect::Discarded,
            }),
            SessionEvent::Answer { question, key } => {
                self.record_answer(&question, key).map(|_| Effect::Idle)
            }
            SessionEvent::Next => self.next().map(|_| Effect::Idle),
            SessionEvent::Previous => self.previous().map(|_| Effect::Idle),
            SessionEvent::Finalize => self.finalize().map(Effect::Persist),
            SessionEvent::Persisted(response) => Ok(if self.apply_persistence(&response) {
                Effect::Idle
            } else {
                Effect::Discarded
            }),
            SessionEvent::ShowReview => self.show_review().map(|()| Effect::Idle),
            SessionEvent::ShowResults => self.show_results().map(|()| Effect::Idle),
            SessionEvent::Restart => {
                self.restart();
                Ok(Effect::Idle)
            }
        }
    }

    fn invalid(&self, event: EventKind) -> SessionError {
        SessionError::InvalidTransition {
            state: self.kind(),
            event,
        }
    }

    fn active_mut(&mut self, event: EventKind) -> Result<&mut ActiveSession, SessionError> {
        let state = self.kind();
        match &mut self.state {
            SessionState::Active(active) => Ok(active),
            _ => Err(SessionError::InvalidTransition { state, event }),
        }
    }

    fn transition(
        &mut self,
        event: EventKind,
        f: impl FnOnce(SessionState) -> Result<SessionState, SessionState>,
    ) -> Result<(), SessionError> {
        let current = std::mem::take(&mut self.state);
        match f(current) {
            Ok(next) => {
                self.state = next;
                Ok(())
            }
            Err(unchanged) => {
                self.state = unchanged;
                Err(self.invalid(event))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::active::tests::{bank, key, qid};
    use practice_core::model::{Cluster, Level};
    use practice_core::time::fixed_clock;
    use storage::repository::StorageError;

    fn settings(count: u32) -> SessionSettings {
        SessionSettings::new(Cluster::Marketing, Level::District, count)
    }

    fn ok_response(request: &GenerationRequest, correct: &[&str]) -> GenerationResponse {
        GenerationResponse {
            ticket: request.ticket,
            result: Ok(bank(correct)),
        }
    }

    fn active_controller(correct: &[&str]) -> SessionController {
        let mut controller = SessionController::new(fixed_clock());
        let request = controller.submit(settings(correct.len() as u32)).unwrap();
        let applied = controller.apply_generation(ok_response(&request, correct));
        assert!(matches!(applied, Applied::Activated { .. }));
        controller
    }

    fn walk_to_end(controller: &mut SessionController) {
        while let Step::Moved(_) = controller.next().unwrap() {}
    }

    #[test]
    fn submit_moves_to_loading_and_activation_starts_at_zero() {
        let mut controller = SessionController::new(fixed_clock());
        assert_eq!(controller.kind(), StateKind::Configuring);

        let request = controller.submit(settings(3)).unwrap();
        assert_eq!(controller.kind(), StateKind::Loading);
        assert_eq!(request.settings, settings(3));

        let applied = controller.apply_generation(ok_response(&request, &["A", "B", "C"]));
        assert!(matches!(applied, Applied::Activated { questions: 3 }));
        let active = controller.active().unwrap();
        assert_eq!(active.cursor(), 0);
        assert!(active.ledger().is_empty());
        assert_eq!(active.started_at(), practice_core::time::fixed_now());
    }

    #[test]
    fn invalid_settings_keep_configuring() {
        let mut controller = SessionController::new(fixed_clock());
        let err = controller.submit(settings(0)).unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
        assert_eq!(controller.kind(), StateKind::Configuring);
    }

    #[test]
    fn second_submit_while_loading_is_rejected() {
        let mut controller = SessionController::new(fixed_clock());
        let first = controller.submit(settings(2)).unwrap();
        let err = controller.submit(settings(5)).unwrap_err();
        assert!(matches!(err, SessionError::RequestInFlight));

        // The original request is still the one that counts.
        let applied = controller.apply_generation(ok_response(&first, &["A", "B"]));
        assert!(matches!(applied, Applied::Activated { questions: 2 }));
    }

    #[test]
    fn generation_failure_returns_to_configuring_with_message() {
        let mut controller = SessionController::new(fixed_clock());
        let request = controller.submit(settings(2)).unwrap();
        let applied = controller.apply_generation(GenerationResponse {
            ticket: request.ticket,
            result: Err(GenerationError::EmptyBank),
        });

        assert!(matches!(applied, Applied::Failed(GenerationError::EmptyBank)));
        assert_eq!(controller.kind(), StateKind::Configuring);
        assert_eq!(
            controller.last_error(),
            Some("question generation returned no questions")
        );

        // Retry is an explicit new submit.
        assert!(controller.submit(settings(2)).is_ok());
        assert_eq!(controller.last_error(), None);
    }

    #[test]
    fn late_response_after_restart_is_ignored() {
        let mut controller = SessionController::new(fixed_clock());
        let stale = controller.submit(settings(2)).unwrap();
        controller.restart();

        let applied = controller.apply_generation(ok_response(&stale, &["A", "B"]));
        assert!(matches!(applied, Applied::Stale));
        assert_eq!(controller.kind(), StateKind::Configuring);

        let fresh = controller.submit(settings(1)).unwrap();
        assert_ne!(fresh.ticket, stale.ticket);

        // The stale response still cannot land on the new request.
        let applied = controller.apply_generation(ok_response(&stale, &["A", "B"]));
        assert!(matches!(applied, Applied::Stale));
        assert_eq!(controller.kind(), StateKind::Loading);
    }

    #[test]
    fn restart_returns_to_configuring_from_every_state() {
        let mut configuring = SessionController::new(fixed_clock());
        configuring.restart();
        assert_eq!(configuring.kind(), StateKind::Configuring);

        let mut loading = SessionController::new(fixed_clock());
        loading.submit(settings(1)).unwrap();
        loading.restart();
        assert_eq!(loading.kind(), StateKind::Configuring);

        let mut active = active_controller(&["A"]);
        active.restart();
        assert_eq!(active.kind(), StateKind::Configuring);

        let mut results = active_controller(&["A"]);
        results.finalize().unwrap();
        results.restart();
        assert_eq!(results.kind(), StateKind::Configuring);

        let mut review = active_controller(&["A"]);
        review.finalize().unwrap();
        review.show_review().unwrap();
        review.restart();
        assert_eq!(review.kind(), StateKind::Configuring);
        assert!(review.completed().is_none());
    }

    #[test]
    fn operations_in_wrong_state_are_rejected() {
        let mut controller = SessionController::new(fixed_clock());
        let err = controller.record_answer(&qid("q1"), key("A")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                state: StateKind::Configuring,
                event: EventKind::Answer,
            }
        ));
        assert_eq!(
            err.to_string(),
            "cannot record an answer while configuring"
        );
        assert!(controller.next().is_err());
        assert!(controller.finalize().is_err());
        assert!(controller.show_review().is_err());
        assert_eq!(controller.kind(), StateKind::Configuring);

        let mut active = active_controller(&["A"]);
        assert!(matches!(
            active.submit(settings(1)),
            Err(SessionError::InvalidTransition {
                state: StateKind::Active,
                ..
            })
        ));
        assert!(active.show_results().is_err());
        assert_eq!(active.kind(), StateKind::Active);
    }

    #[test]
    fn next_at_last_question_is_a_no_op() {
        let mut controller = active_controller(&["A", "B", "C"]);
        walk_to_end(&mut controller);
        assert_eq!(controller.active().unwrap().cursor(), 2);

        assert_eq!(controller.next().unwrap(), Step::AtBoundary);
        assert_eq!(controller.active().unwrap().cursor(), 2);
        assert_eq!(controller.kind(), StateKind::Active);
    }

    #[test]
    fn finalize_requires_every_question_visited() {
        let mut controller = active_controller(&["A", "B", "C"]);
        controller.next().unwrap();
        let err = controller.finalize().unwrap_err();
        assert!(matches!(
            err,
            SessionError::NotAllVisited {
                visited: 2,
                total: 3
            }
        ));

        controller.next().unwrap();
        // Cursor position does not matter once everything was seen.
        controller.previous().unwrap();
        assert!(controller.finalize().is_ok());
        assert_eq!(controller.kind(), StateKind::Results);
    }

    #[test]
    fn finalize_scores_unanswered_as_incorrect() {
        let mut controller = active_controller(&["A", "B", "C"]);
        controller.answer_current(key("A")).unwrap();
        controller.next().unwrap();
        controller.answer_current(key("B")).unwrap();
        controller.next().unwrap();

        let request = controller.finalize().unwrap();
        let report = request.record.report();
        assert_eq!(report.correct_count, 2);
        assert_eq!(report.total_count, 3);
        assert_eq!(report.percentage, 67);
        assert_eq!(report.per_question[2].user_answer, None);

        let done = controller.completed().unwrap();
        assert_eq!(done.report(), report);
        assert_eq!(done.save_status(), &SaveStatus::Pending);
    }

    #[test]
    fn review_toggles_without_rescoring() {
        let mut controller = active_controller(&["A", "B"]);
        controller.record_answer(&qid("q2"), key("D")).unwrap();
        walk_to_end(&mut controller);
        controller.finalize().unwrap();
        let summary = controller.completed().unwrap().report().clone();

        controller.show_review().unwrap();
        assert_eq!(controller.kind(), StateKind::Review);
        let done = controller.completed().unwrap();
        assert_eq!(done.report(), &summary);
        let missed = done.missed_items();
        assert_eq!(missed.len(), 2);
        assert_eq!(missed[1].position, 1);
        assert_eq!(missed[1].result.user_answer, Some(key("D")));

        assert!(controller.show_review().is_err());
        controller.show_results().unwrap();
        assert_eq!(controller.kind(), StateKind::Results);
        assert_eq!(controller.completed().unwrap().report(), &summary);
    }

    #[test]
    fn answers_are_frozen_after_finalize() {
        let mut controller = active_controller(&["A"]);
        controller.finalize().unwrap();
        assert!(controller.record_answer(&qid("q1"), key("A")).is_err());
        assert_eq!(controller.completed().unwrap().report().correct_count, 0);
    }

    #[test]
    fn persistence_outcome_is_recorded_or_ignored_when_stale() {
        let mut controller = active_controller(&["A"]);
        let request = controller.finalize().unwrap();

        let applied = controller.apply_persistence(&PersistResponse {
            ticket: request.ticket,
            result: Err(PersistenceWarning(StorageError::Connection("offline".into()))),
        });
        assert!(applied);
        assert_eq!(controller.kind(), StateKind::Results);
        assert!(matches!(
            controller.completed().unwrap().save_status(),
            SaveStatus::Failed(msg) if msg.contains("offline")
        ));

        controller.restart();
        let applied = controller.apply_persistence(&PersistResponse {
            ticket: request.ticket,
            result: Ok(AttemptId::new(1)),
        });
        assert!(!applied);
    }

    #[test]
    fn dispatch_emits_intents() {
        let mut controller = SessionController::new(fixed_clock());
        let Effect::Generate(request) = controller
            .dispatch(SessionEvent::Submit(settings(2)))
            .unwrap()
        else {
            panic!("expected a generation intent");
        };

        let effect = controller
            .dispatch(SessionEvent::Generated(ok_response(&request, &["C", "D"])))
            .unwrap();
        assert_eq!(effect, Effect::Idle);

        controller
            .dispatch(SessionEvent::Answer {
                question: qid("q1"),
                key: key("C"),
            })
            .unwrap();
        controller.dispatch(SessionEvent::Next).unwrap();

        let Effect::Persist(persist) = controller.dispatch(SessionEvent::Finalize).unwrap() else {
            panic!("expected a persistence intent");
        };
        assert_eq!(persist.record.report().correct_count, 1);

        controller
            .dispatch(SessionEvent::Persisted(PersistResponse {
                ticket: persist.ticket,
                result: Ok(AttemptId::new(7)),
            }))
            .unwrap();
        assert_eq!(
            controller.completed().unwrap().save_status(),
            &SaveStatus::Saved(AttemptId::new(7))
        );

        controller.dispatch(SessionEvent::Restart).unwrap();
        assert_eq!(controller.kind(), StateKind::Configuring);
    }

    #[test]
    fn dispatch_reports_failed_and_stale_responses() {
        let mut controller = SessionController::new(fixed_clock());
        let Effect::Generate(first) = controller
            .dispatch(SessionEvent::Submit(settings(2)))
            .unwrap()
        else {
            panic!("expected a generation intent");
        };
        let effect = controller
            .dispatch(SessionEvent::Generated(GenerationResponse {
                ticket: first.ticket,
                result: Err(GenerationError::EmptyBank),
            }))
            .unwrap();
        assert_eq!(
            effect,
            Effect::GenerationFailed("question generation returned no questions".into())
        );

        let Effect::Generate(second) = controller
            .dispatch(SessionEvent::Submit(settings(2)))
            .unwrap()
        else {
            panic!("expected a generation intent");
        };
        controller.dispatch(SessionEvent::Restart).unwrap();
        let effect = controller
            .dispatch(SessionEvent::Generated(ok_response(&second, &["A", "B"])))
            .unwrap();
        assert_eq!(effect, Effect::Discarded);
        assert_eq!(controller.kind(), StateKind::Configuring);
    }
}
