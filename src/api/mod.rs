//! Client side of the interview-orchestration service
//!
//! - POST /start_interview - open a session
//! - GET /next_question - advance the question list
//! - POST /submit_answer - record one answer
//! - POST /end_interview - finalize scoring
//! - POST /update_posture_score, /update_eye_score - behavioral telemetry
//! - GET /interview_report - scored summary

pub mod client;
pub mod messages;

pub use client::{HttpInterviewApi, InterviewApi};
pub use messages::{InterviewReport, QuestionMessage, StartInterviewResponse};
