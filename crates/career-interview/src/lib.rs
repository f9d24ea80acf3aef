#![deny(warnings)]

//! Offline interview generation for vetting job moves.
//!
//! Questions are built from templates plus filler vocabularies scoped by the
//! target job's path and level; a session asks three of them and passes on
//! two correct answers.

pub mod bank;
pub mod generator;
pub mod session;

pub use bank::{BankError, TemplateBank};
pub use generator::{difficulty_ceiling, InterviewQuestion, QUESTIONS_PER_SESSION};
pub use session::{
    passes, AnswerFeedback, InterviewSession, InterviewVerdict, SessionError, SessionState,
    PASS_THRESHOLD,
};
