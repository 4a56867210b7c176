mod active;
mod completed;
mod controller;
mod progress;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use active::{ActiveSession, Step};
pub use completed::{CompletedSession, ReviewItem, SaveStatus};
pub use controller::{
    Applied, Effect, EventKind, GenerationRequest, GenerationResponse, PersistRequest,
    PersistResponse, RequestTicket, SessionController, SessionEvent, SessionState, StateKind,
};
pub use progress::SessionProgress;
pub use workflow::{FinalizeOutcome, SessionLoop};
