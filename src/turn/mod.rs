//! Turn controller for a live interview call
//!
//! Idle -> AwaitingQuestion -> PresentingQuestion -> AwaitingAnswer ->
//! SubmittingAnswer -> AwaitingQuestion (loop) -> Ended

mod controller;
mod state;

pub use controller::{TurnController, CLOSING_MESSAGE, MAX_BEHAVIOR_SCORE};
pub use state::{BehaviorMetric, EndReason, TurnEvent, TurnOutcome, TurnState};
