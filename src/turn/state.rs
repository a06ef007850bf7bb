use crate::session::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the call stands in the question/answer loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    AwaitingQuestion,
    PresentingQuestion,
    AwaitingAnswer,
    SubmittingAnswer,
    Ended,
}

impl TurnState {
    pub fn is_ended(self) -> bool {
        self == TurnState::Ended
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnState::Idle => "idle",
            TurnState::AwaitingQuestion => "awaiting a question",
            TurnState::PresentingQuestion => "presenting a question",
            TurnState::AwaitingAnswer => "awaiting an answer",
            TurnState::SubmittingAnswer => "submitting an answer",
            TurnState::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Why the call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The service reported the interview complete
    ServiceCompleted,
    /// The candidate hung up
    UserEnded,
}

/// Notifications a shell renders while the call runs
#[derive(Debug, Clone)]
pub enum TurnEvent {
    StateChanged(TurnState),
    MessageAppended(Message),
    /// Short user-facing notice ("your turn", recoverable errors)
    Notice(String),
    Ended(EndReason),
}

/// Result of one answered turn
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The service sent another question, now being asked
    NextQuestion(Message),
    /// The question list is exhausted and the call has ended
    Completed,
}

/// Behavioral metrics streamed to the service during the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorMetric {
    Posture,
    EyeContact,
}
