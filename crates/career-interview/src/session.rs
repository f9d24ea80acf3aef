//! Interview session state machine and pass/fail verdict.

use crate::bank::TemplateBank;
use crate::generator::{InterviewQuestion, QUESTIONS_PER_SESSION};
use career_core::{Job, JobId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Correct answers needed to pass a session.
pub const PASS_THRESHOLD: usize = 2;

/// True when `correct` answers out of three is a pass.
pub fn passes(correct: usize) -> bool {
    correct >= PASS_THRESHOLD
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    AskingQuestion(usize),
    ShowingFeedback(usize),
    Results,
    /// Abandoned mid-question; no verdict.
    Cancelled,
}

/// Feedback shown after a single answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_index: usize,
    pub explanation: String,
}

/// Outcome handed back to the caller after the results screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewVerdict {
    pub job_id: JobId,
    pub correct: usize,
    pub total: usize,
    pub passed: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("expected {expected}, session is in {actual:?}")]
    WrongState {
        expected: &'static str,
        actual: SessionState,
    },
    #[error("choice {0} is out of range")]
    ChoiceOutOfRange(usize),
    #[error("a session needs {expected} questions, got {got}")]
    WrongQuestionCount { expected: usize, got: usize },
    #[error("session has no question {0}")]
    MissingQuestion(usize),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterviewSession {
    job_id: JobId,
    questions: Vec<InterviewQuestion>,
    state: SessionState,
    answers: Vec<bool>,
}

impl InterviewSession {
    pub fn new(job_id: JobId, questions: Vec<InterviewQuestion>) -> Result<Self, SessionError> {
        if questions.len() != QUESTIONS_PER_SESSION {
            return Err(SessionError::WrongQuestionCount {
                expected: QUESTIONS_PER_SESSION,
                got: questions.len(),
            });
        }
        Ok(Self {
            job_id,
            questions,
            state: SessionState::AskingQuestion(0),
            answers: Vec::with_capacity(QUESTIONS_PER_SESSION),
        })
    }

    /// Generate a fresh three-question session for `job`.
    pub fn start<R: Rng + ?Sized>(bank: &TemplateBank, job: &Job, rng: &mut R) -> Self {
        Self {
            job_id: job.id.clone(),
            questions: bank.generate_offline_interview_set(job, rng),
            state: SessionState::AskingQuestion(0),
            answers: Vec::with_capacity(QUESTIONS_PER_SESSION),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn questions(&self) -> &[InterviewQuestion] {
        &self.questions
    }

    /// The question being asked or reviewed, if any.
    pub fn current_question(&self) -> Option<&InterviewQuestion> {
        match self.state {
            SessionState::AskingQuestion(i) | SessionState::ShowingFeedback(i) => {
                self.questions.get(i)
            }
            SessionState::Results | SessionState::Cancelled => None,
        }
    }

    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|c| **c).count()
    }

    pub fn answer(&mut self, choice: usize) -> Result<AnswerFeedback, SessionError> {
        let SessionState::AskingQuestion(i) = self.state else {
            return Err(self.wrong_state("AskingQuestion"));
        };
        let q = self
            .questions
            .get(i)
            .ok_or(SessionError::MissingQuestion(i))?;
        if choice >= q.options.len() {
            return Err(SessionError::ChoiceOutOfRange(choice));
        }
        let correct = choice == q.correct_index;
        let feedback = AnswerFeedback {
            correct,
            correct_index: q.correct_index,
            explanation: q.explanation.clone(),
        };
        self.answers.push(correct);
        self.state = SessionState::ShowingFeedback(i);
        Ok(feedback)
    }

    /// Leave the feedback screen for the next question or the results.
    pub fn advance(&mut self) -> Result<SessionState, SessionError> {
        let SessionState::ShowingFeedback(i) = self.state else {
            return Err(self.wrong_state("ShowingFeedback"));
        };
        self.state = if i + 1 < self.questions.len() {
            SessionState::AskingQuestion(i + 1)
        } else {
            SessionState::Results
        };
        Ok(self.state)
    }

    /// Abort while a question is open. The caller treats this as "not taken".
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::AskingQuestion(_)) {
            return Err(self.wrong_state("AskingQuestion"));
        }
        self.state = SessionState::Cancelled;
        Ok(())
    }

    pub fn verdict(&self) -> Result<InterviewVerdict, SessionError> {
        if self.state != SessionState::Results {
            return Err(self.wrong_state("Results"));
        }
        let correct = self.correct_count();
        let verdict = InterviewVerdict {
            job_id: self.job_id.clone(),
            correct,
            total: self.questions.len(),
            passed: passes(correct),
        };
        info!(job = %verdict.job_id, correct, passed = verdict.passed, "interview finished");
        Ok(verdict)
    }

    fn wrong_state(&self, expected: &'static str) -> SessionError {
        SessionError::WrongState {
            expected,
            actual: self.state,
        }
    }
}
