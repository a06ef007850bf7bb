use crate::turn::TurnState;
use thiserror::Error;

/// How a failure must be surfaced to the person in the call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Show an alert and move the user to a safe page
    Fatal,
    /// Show a notice and leave the call actionable
    Recoverable,
    /// Drop without telling anyone
    Silent,
}

/// Domain errors of the interview flow
#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("failed to start interview: {0}")]
    SessionCreation(String),

    #[error("failed to submit answer: {0}")]
    Submission(String),

    #[error("interview result not found for {0}")]
    NotFound(String),

    #[error("result arrived after the interview ended")]
    StaleResultIgnored,

    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: TurnState,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("document store error: {0}")]
    Store(String),
}

impl InterviewError {
    pub fn severity(&self) -> Severity {
        match self {
            InterviewError::SessionCreation(_)
            | InterviewError::NotFound(_)
            | InterviewError::MalformedRecord(_)
            | InterviewError::Store(_) => Severity::Fatal,
            InterviewError::Submission(_)
            | InterviewError::InvalidState { .. }
            | InterviewError::InvalidInput(_) => Severity::Recoverable,
            InterviewError::StaleResultIgnored => Severity::Silent,
        }
    }

    /// Whether a retry by the user makes sense
    pub fn is_recoverable(&self) -> bool {
        self.severity() == Severity::Recoverable
    }
}

pub type InterviewResult<T> = std::result::Result<T, InterviewError>;
