use super::messages::{
    EndInterviewRequest, InterviewReport, QuestionMessage, ScoreUpdateRequest,
    StartInterviewRequest, StartInterviewResponse, SubmitAnswerRequest,
};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Boundary to the interview-orchestration service
#[async_trait::async_trait]
pub trait InterviewApi: Send + Sync {
    /// Open a session for a candidate and job role
    async fn start_interview(&self, email: &str, job_role: &str)
        -> Result<StartInterviewResponse>;

    /// Advance to the next question
    async fn next_question(&self, session_id: &str) -> Result<QuestionMessage>;

    /// Record the answer to the current question
    async fn submit_answer(&self, session_id: &str, answer: &str) -> Result<()>;

    /// Close the session so the service finalizes scores
    async fn end_interview(&self, session_id: &str) -> Result<()>;

    async fn update_posture_score(&self, session_id: &str, score: u8) -> Result<()>;

    async fn update_eye_score(&self, session_id: &str, score: u8) -> Result<()>;

    async fn interview_report(&self, session_id: &str) -> Result<InterviewReport>;
}

/// JSON-over-HTTP client for the interview service
pub struct HttpInterviewApi {
    client: Client,
    base_url: String,
}

impl HttpInterviewApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        info!("Interview service at {}", base_url);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_ack<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<()> {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to /{} failed", path))?
            .error_for_status()
            .with_context(|| format!("/{} returned an error status", path))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl InterviewApi for HttpInterviewApi {
    async fn start_interview(
        &self,
        email: &str,
        job_role: &str,
    ) -> Result<StartInterviewResponse> {
        debug!(email, job_role, "Starting interview");

        let body = StartInterviewRequest {
            email: email.to_string(),
            job_role: job_role.to_string(),
        };

        let response = self
            .client
            .post(self.url("start_interview"))
            .json(&body)
            .send()
            .await
            .context("Request to /start_interview failed")?
            .error_for_status()
            .context("/start_interview returned an error status")?;

        response
            .json()
            .await
            .context("Malformed /start_interview response")
    }

    async fn next_question(&self, session_id: &str) -> Result<QuestionMessage> {
        let response = self
            .client
            .get(self.url("next_question"))
            .query(&[("sessionId", session_id)])
            .send()
            .await
            .context("Request to /next_question failed")?
            .error_for_status()
            .context("/next_question returned an error status")?;

        response
            .json()
            .await
            .context("Malformed /next_question response")
    }

    async fn submit_answer(&self, session_id: &str, answer: &str) -> Result<()> {
        debug!(session_id, chars = answer.len(), "Submitting answer");
        self.post_ack(
            "submit_answer",
            &SubmitAnswerRequest {
                session_id: session_id.to_string(),
                answer: answer.to_string(),
            },
        )
        .await
    }

    async fn end_interview(&self, session_id: &str) -> Result<()> {
        info!("Ending interview {}", session_id);
        self.post_ack(
            "end_interview",
            &EndInterviewRequest {
                session_id: session_id.to_string(),
            },
        )
        .await
    }

    async fn update_posture_score(&self, session_id: &str, score: u8) -> Result<()> {
        self.post_ack(
            "update_posture_score",
            &ScoreUpdateRequest {
                session_id: session_id.to_string(),
                score,
            },
        )
        .await
    }

    async fn update_eye_score(&self, session_id: &str, score: u8) -> Result<()> {
        self.post_ack(
            "update_eye_score",
            &ScoreUpdateRequest {
                session_id: session_id.to_string(),
                score,
            },
        )
        .await
    }

    async fn interview_report(&self, session_id: &str) -> Result<InterviewReport> {
        let response = self
            .client
            .get(self.url("interview_report"))
            .query(&[("sessionId", session_id)])
            .send()
            .await
            .context("Request to /interview_report failed")?
            .error_for_status()
            .context("/interview_report returned an error status")?;

        response
            .json()
            .await
            .context("Malformed /interview_report response")
    }
}
