use super::model::{InterviewSession, SessionStatus};
use crate::api::InterviewApi;
use crate::error::{InterviewError, InterviewResult};
use tracing::{error, info};

/// Opening line used when the service does not send its own
pub fn welcome_message(job_role: &str) -> String {
    format!(
        "Welcome to your {} interview. I'll be asking you some questions to evaluate your skills and experience. Let's begin.",
        job_role
    )
}

/// A freshly created session together with the text that opens the call
#[derive(Debug, Clone)]
pub struct OpenedSession {
    pub session: InterviewSession,
    pub opening: String,
}

/// Open a session for `candidate` applying to `job_role`.
///
/// Nothing is kept locally; the service owns the durable state keyed by the
/// returned identifier.
pub async fn start_session(
    api: &dyn InterviewApi,
    candidate: &str,
    job_role: &str,
) -> InterviewResult<OpenedSession> {
    let candidate = candidate.trim();
    let job_role = job_role.trim();
    if candidate.is_empty() || job_role.is_empty() {
        return Err(InterviewError::InvalidInput(
            "candidate email and job role are required".to_string(),
        ));
    }

    info!("Opening interview session for {} ({})", candidate, job_role);

    let response = api.start_interview(candidate, job_role).await.map_err(|e| {
        error!("Session creation failed: {:#}", e);
        InterviewError::SessionCreation(format!("{:#}", e))
    })?;

    let session_id = response
        .session_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            error!("Session creation returned no session id");
            InterviewError::SessionCreation("response carried no session id".to_string())
        })?;

    let opening = response
        .content
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| welcome_message(job_role));

    info!("Session {} opened", session_id);

    Ok(OpenedSession {
        session: InterviewSession {
            session_id,
            candidate: candidate.to_string(),
            job_role: job_role.to_string(),
            status: SessionStatus::Active,
        },
        opening,
    })
}
