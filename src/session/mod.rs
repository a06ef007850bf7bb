//! Interview session management
//!
//! This module provides:
//! - The session, message and transcript data model
//! - The session initiator that opens a session against the interview service

mod initiator;
mod model;

pub use initiator::{start_session, welcome_message, OpenedSession};
pub use model::{InterviewSession, Message, SessionStatus, Speaker, Transcript};
