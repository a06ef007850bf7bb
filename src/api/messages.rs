use serde::{Deserialize, Serialize};

/// Status value the service uses once the question list is exhausted
pub const STATUS_COMPLETED: &str = "completed";

/// Body of `POST /start_interview`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewRequest {
    pub email: String,
    pub job_role: String,
}

/// Reply of `POST /start_interview`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewResponse {
    #[serde(default)]
    pub session_id: Option<String>,

    /// Opening question, when the service sends one with the session
    #[serde(default, alias = "question")]
    pub content: Option<String>,

    #[serde(default)]
    pub status: Option<String>,
}

/// Reply of `GET /next_question`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionMessage {
    /// Speaker label, `ai` for questions
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default, alias = "question")]
    pub content: Option<String>,

    /// Server-side timestamp, informational only
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub status: Option<String>,
}

impl QuestionMessage {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some(STATUS_COMPLETED)
    }
}

/// Body of `POST /submit_answer`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub session_id: String,
    pub answer: String,
}

/// Body of `POST /end_interview`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndInterviewRequest {
    pub session_id: String,
}

/// Body of `POST /update_posture_score` and `POST /update_eye_score`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdateRequest {
    pub session_id: String,
    pub score: u8,
}

/// One scored answer inside an interview report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub score: u8,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Reply of `GET /interview_report`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewReport {
    pub session_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub job_role: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub answers: Vec<AnsweredQuestion>,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub percentage_score: f64,
    #[serde(default)]
    pub posture_score: f64,
    #[serde(default)]
    pub eye_score: f64,
    #[serde(default)]
    pub status: Option<String>,
}
