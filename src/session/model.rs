use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a session as reported by the interview service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// One interview session opened against the orchestration service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    /// Identifier allocated by the service
    pub session_id: String,

    /// Candidate email, also the key of the completion record
    pub candidate: String,

    /// Job role the questions are drawn for
    pub job_role: String,

    pub status: SessionStatus,
}

impl InterviewSession {
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

/// Who said a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    #[serde(rename = "ai", alias = "interviewer", alias = "assistant")]
    Interviewer,
    #[serde(rename = "user", alias = "candidate")]
    Candidate,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Interviewer => write!(f, "Interviewer"),
            Speaker::Candidate => write!(f, "You"),
        }
    }
}

/// A single line of the interview conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Speaker,

    #[serde(rename = "content")]
    pub text: String,

    #[serde(rename = "timestamp")]
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn interviewer(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::Interviewer,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn candidate(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::Candidate,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Append-only conversation log with strictly increasing timestamps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, nudging its timestamp past the previous one if needed.
    ///
    /// Returns the message as stored.
    pub fn push(&mut self, mut message: Message) -> &Message {
        if let Some(last) = self.messages.last() {
            if message.sent_at <= last.sent_at {
                message.sent_at = last.sent_at + Duration::milliseconds(1);
            }
        }
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Plain-text rendering used for transcript downloads
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for message in &self.messages {
            out.push_str(&format!(
                "[{}] {}: {}\n",
                message.sent_at.format("%H:%M:%S"),
                message.role,
                message.text
            ));
        }
        out
    }
}

impl From<Vec<Message>> for Transcript {
    /// Rebuilds a transcript from stored messages, restoring timestamp order
    fn from(mut messages: Vec<Message>) -> Self {
        messages.sort_by_key(|m| m.sent_at);
        let mut transcript = Transcript::new();
        for message in messages {
            transcript.push(message);
        }
        transcript
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_timestamps_strictly_increasing() {
        let now = Utc::now();
        let mut transcript = Transcript::new();
        for text in ["a", "b", "c"] {
            transcript.push(Message {
                role: Speaker::Interviewer,
                text: text.to_string(),
                sent_at: now,
            });
        }

        let stamps: Vec<_> = transcript.messages().iter().map(|m| m.sent_at).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(stamps[0], now);
    }

    #[test]
    fn test_message_wire_format() {
        let json = r#"{"role":"ai","content":"Tell me about Rust","timestamp":"2025-10-27T14:30:05Z"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, Speaker::Interviewer);
        assert_eq!(msg.text, "Tell me about Rust");

        let out = serde_json::to_string(&Message::candidate("ownership")).unwrap();
        assert!(out.contains("\"role\":\"user\""));
        assert!(out.contains("\"content\":\"ownership\""));
    }

    #[test]
    fn test_role_aliases() {
        let msg: Message = serde_json::from_str(
            r#"{"role":"candidate","content":"hi","timestamp":"2025-10-27T14:30:05Z"}"#,
        )
        .unwrap();
        assert_eq!(msg.role, Speaker::Candidate);
    }

    #[test]
    fn test_to_text_labels_speakers() {
        let mut transcript = Transcript::new();
        transcript.push(Message::interviewer("Question?"));
        transcript.push(Message::candidate("Answer."));

        let text = transcript.to_text();
        assert!(text.contains("Interviewer: Question?"));
        assert!(text.contains("You: Answer."));
    }
}
