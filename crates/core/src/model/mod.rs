mod attempt;
mod ids;
mod ledger;
pub mod question;
mod settings;

pub use ids::{AttemptId, IdError, OptionKey, QuestionId};

pub use attempt::{AttemptError, AttemptRecord};
pub use ledger::{AnswerLedger, LedgerError};
pub use question::{Question, QuestionBank, QuestionBankError, QuestionError};
pub use settings::{Cluster, Level, SessionSettings, SettingsError};
