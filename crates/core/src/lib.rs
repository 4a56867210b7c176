#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod scorer;
pub mod time;
pub mod topics;

pub use error::Error;
pub use scorer::{QuestionResult, ScoreReport};
pub use time::Clock;
pub use topics::TopicStat;
