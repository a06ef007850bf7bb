use super::state::{AppState, FinishedCall, InterviewCall};
use crate::error::InterviewError;
use crate::media::{MediaTracks, SilentSpeech};
use crate::observer::CompletionObserver;
use crate::session::{Message, Transcript};
use crate::turn::{BehaviorMetric, EndReason, TurnController, TurnOutcome, TurnState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewBody {
    pub email: String,
    pub job_role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewReply {
    pub session_id: String,
    pub state: TurnState,
    pub opening: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerBody {
    pub answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReply {
    pub session_id: String,
    pub state: TurnState,
    pub completed: bool,
    pub question: Option<Message>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndReply {
    pub session_id: String,
    pub state: TurnState,
    pub end_reason: Option<EndReason>,
    pub transcript: Vec<Message>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReply {
    pub session_id: String,
    pub candidate: String,
    pub job_role: String,
    pub state: TurnState,
    pub pending_answer: Option<String>,
    pub messages: usize,
    pub end_reason: Option<EndReason>,
}

#[derive(Debug, Deserialize)]
pub struct BehaviorBody {
    pub posture: Option<u8>,
    pub eye: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub recoverable: bool,
}

fn error_response(err: &InterviewError) -> Response {
    let status = match err {
        InterviewError::SessionCreation(_) | InterviewError::Submission(_) => {
            StatusCode::BAD_GATEWAY
        }
        InterviewError::NotFound(_) => StatusCode::NOT_FOUND,
        InterviewError::StaleResultIgnored | InterviewError::InvalidState { .. } => {
            StatusCode::CONFLICT
        }
        InterviewError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        InterviewError::MalformedRecord(_) | InterviewError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            recoverable: err.is_recoverable(),
        }),
    )
        .into_response()
}

fn call_ended(action: &'static str) -> Response {
    error_response(&InterviewError::InvalidState {
        action,
        state: TurnState::Ended,
    })
}

fn unknown_call(session_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("No active interview {}", session_id),
            recoverable: false,
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /interviews/start
/// Open a session and present the opening message
pub async fn start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewBody>,
) -> impl IntoResponse {
    info!("Starting interview for {} ({})", req.email, req.job_role);

    let controller = Arc::new(TurnController::new(
        req.email.trim(),
        req.job_role.trim(),
        Arc::clone(&state.api),
        Arc::new(SilentSpeech),
        Arc::new(MediaTracks::new()),
    ));

    // Subscribe before the session exists so no completion update is missed
    let observer = match CompletionObserver::spawn(state.feed.as_ref(), Arc::clone(&controller))
        .await
    {
        Ok(observer) => Some(observer),
        Err(e) => {
            warn!("Continuing without completion updates: {:#}", e);
            None
        }
    };

    let session = match controller.begin().await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to start interview: {}", e);
            if let Some(observer) = observer {
                observer.cancel().await;
            }
            return error_response(&e);
        }
    };

    let opening = controller.transcript().await.messages().first().cloned();
    let call = Arc::new(InterviewCall::new(Arc::clone(&controller), observer));

    if !state.admit(&session.session_id, call.clone()).await {
        // The live call owns the remote session, so this one is dropped without ending it
        error!(
            "Interview service reused session id {}, refusing second call",
            session.session_id
        );
        call.stop_observer().await;
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Interview {} is already live", session.session_id),
                recoverable: false,
            }),
        )
            .into_response();
    }
    state.retire_when_ended(session.session_id.clone(), &controller);

    info!("Interview {} started", session.session_id);

    (
        StatusCode::OK,
        Json(StartInterviewReply {
            session_id: session.session_id,
            state: controller.state().await,
            opening,
        }),
    )
        .into_response()
}

/// POST /interviews/:session_id/answer
/// Submit the answer of the current turn
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<AnswerBody>,
) -> impl IntoResponse {
    let Some(call) = state.call(&session_id).await else {
        if state.finished_call(&session_id).await.is_some() {
            return call_ended("submit an answer");
        }
        return unknown_call(&session_id);
    };

    match call.controller.submit_answer(&req.answer).await {
        Ok(outcome) => {
            let (completed, question) = match outcome {
                TurnOutcome::NextQuestion(message) => (false, Some(message)),
                TurnOutcome::Completed => {
                    state.retire(&session_id).await;
                    (true, None)
                }
            };

            (
                StatusCode::OK,
                Json(AnswerReply {
                    session_id,
                    state: call.controller.state().await,
                    completed,
                    question,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST /interviews/:session_id/end
/// Hang up and drop the call
pub async fn end_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("Ending interview {}", session_id);

    let Some(call) = state.call(&session_id).await else {
        return unknown_call(&session_id);
    };

    call.controller.end_call().await;
    state.retire(&session_id).await;

    (
        StatusCode::OK,
        Json(EndReply {
            session_id,
            state: call.controller.state().await,
            end_reason: call.controller.end_reason().await,
            transcript: call.controller.transcript().await.messages().to_vec(),
        }),
    )
        .into_response()
}

fn finished_status(session_id: String, finished: FinishedCall) -> (StatusCode, Json<StatusReply>) {
    (
        StatusCode::OK,
        Json(StatusReply {
            session_id,
            candidate: finished.candidate,
            job_role: finished.job_role,
            state: TurnState::Ended,
            pending_answer: None,
            messages: finished.transcript.len(),
            end_reason: finished.end_reason,
        }),
    )
}

/// GET /interviews/:session_id/status
pub async fn get_interview_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(call) = state.call(&session_id).await else {
        return match state.finished_call(&session_id).await {
            Some(finished) => finished_status(session_id, finished).into_response(),
            None => unknown_call(&session_id),
        };
    };

    let controller = &call.controller;
    (
        StatusCode::OK,
        Json(StatusReply {
            session_id,
            candidate: controller.candidate().to_string(),
            job_role: controller.job_role().to_string(),
            state: controller.state().await,
            pending_answer: controller.pending_answer().await,
            messages: controller.transcript().await.len(),
            end_reason: controller.end_reason().await,
        }),
    )
        .into_response()
}

/// GET /interviews/:session_id/transcript
pub async fn get_interview_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let transcript: Transcript = match state.call(&session_id).await {
        Some(call) => call.controller.transcript().await,
        None => match state.finished_call(&session_id).await {
            Some(finished) => finished.transcript,
            None => return unknown_call(&session_id),
        },
    };

    (StatusCode::OK, Json(transcript)).into_response()
}

/// GET /interviews/:session_id/report
/// Per-answer report kept by the interview service
pub async fn get_interview_report(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let known = state.call(&session_id).await.is_some()
        || state.finished_call(&session_id).await.is_some();
    if !known {
        return unknown_call(&session_id);
    }

    match state.api.interview_report(&session_id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            warn!("Failed to fetch report for {}: {:#}", session_id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("{:#}", e),
                    recoverable: true,
                }),
            )
                .into_response()
        }
    }
}

/// POST /interviews/:session_id/behavior
/// Forward posture and eye-contact scores from the media analysis
pub async fn report_behavior(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<BehaviorBody>,
) -> impl IntoResponse {
    let Some(call) = state.call(&session_id).await else {
        if state.finished_call(&session_id).await.is_some() {
            return call_ended("report behavior");
        }
        return unknown_call(&session_id);
    };

    let samples = [
        (BehaviorMetric::Posture, req.posture),
        (BehaviorMetric::EyeContact, req.eye),
    ];
    for (metric, score) in samples {
        if let Some(score) = score {
            if let Err(e) = call.controller.report_behavior(metric, score).await {
                return error_response(&e);
            }
        }
    }

    StatusCode::NO_CONTENT.into_response()
}

/// GET /results/:candidate
/// Score report with overall score, tier and transcript
pub async fn get_results(
    State(state): State<AppState>,
    Path(candidate): Path<String>,
) -> impl IntoResponse {
    match state.presenter.present(&candidate).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "interview-room"
    }))
}
