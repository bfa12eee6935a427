pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod messages;
pub mod session;
pub mod types;

pub use error::{QuizError, Result};
pub use session::QuizController;
pub use types::{ChoiceSet, Mistake, NextQuestion, Question, Session, SessionReport, Verdict};
