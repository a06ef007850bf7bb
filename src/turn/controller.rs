use super::state::{BehaviorMetric, EndReason, TurnEvent, TurnOutcome, TurnState};
use crate::api::InterviewApi;
use crate::error::{InterviewError, InterviewResult};
use crate::media::{MediaInputs, SpeechOutput};
use crate::session::{start_session, InterviewSession, Message, SessionStatus, Transcript};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, error, info, warn};

/// Line presented when the interview is over
pub const CLOSING_MESSAGE: &str =
    "Thank you for completing the interview. Your responses have been recorded.";

/// Highest value accepted for posture and eye-contact scores
pub const MAX_BEHAVIOR_SCORE: u8 = 10;

const EVENT_CAPACITY: usize = 64;

/// Answer of the current turn that has not produced a next question yet
#[derive(Debug, Clone)]
struct PendingAnswer {
    text: String,
    /// The service acknowledged it; a retry must not send it again
    acknowledged: bool,
}

struct TurnInner {
    state: TurnState,
    session: Option<InterviewSession>,
    transcript: Transcript,
    pending: Option<PendingAnswer>,
    end_reason: Option<EndReason>,
}

/// Drives one interview call through its question/answer loop.
///
/// State lives behind a mutex that is never held across network or speech
/// awaits. Every result is applied only after re-checking the state, and
/// `Ended` always wins: anything that completes after the call ended is
/// dropped as [`InterviewError::StaleResultIgnored`].
pub struct TurnController {
    candidate: String,
    job_role: String,
    api: Arc<dyn InterviewApi>,
    speech: Arc<dyn SpeechOutput>,
    media: Arc<dyn MediaInputs>,
    inner: Mutex<TurnInner>,
    events: broadcast::Sender<TurnEvent>,
    ended_tx: watch::Sender<bool>,
}

impl TurnController {
    pub fn new(
        candidate: impl Into<String>,
        job_role: impl Into<String>,
        api: Arc<dyn InterviewApi>,
        speech: Arc<dyn SpeechOutput>,
        media: Arc<dyn MediaInputs>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (ended_tx, _) = watch::channel(false);

        Self {
            candidate: candidate.into(),
            job_role: job_role.into(),
            api,
            speech,
            media,
            inner: Mutex::new(TurnInner {
                state: TurnState::Idle,
                session: None,
                transcript: Transcript::new(),
                pending: None,
                end_reason: None,
            }),
            events,
            ended_tx,
        }
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn job_role(&self) -> &str {
        &self.job_role
    }

    pub async fn state(&self) -> TurnState {
        self.inner.lock().await.state
    }

    pub async fn session(&self) -> Option<InterviewSession> {
        self.inner.lock().await.session.clone()
    }

    pub async fn transcript(&self) -> Transcript {
        self.inner.lock().await.transcript.clone()
    }

    /// Answer text kept for a manual retry after a failed submission
    pub async fn pending_answer(&self) -> Option<String> {
        self.inner
            .lock()
            .await
            .pending
            .as_ref()
            .map(|p| p.text.clone())
    }

    pub async fn end_reason(&self) -> Option<EndReason> {
        self.inner.lock().await.end_reason
    }

    /// Subscribe to state changes, appended messages and notices
    pub fn subscribe(&self) -> broadcast::Receiver<TurnEvent> {
        self.events.subscribe()
    }

    /// Flips to `true` once the call has ended, by any path
    pub fn ended_signal(&self) -> watch::Receiver<bool> {
        self.ended_tx.subscribe()
    }

    /// Open the session and present the opening message.
    ///
    /// On failure the controller goes back to `Idle` and the turn loop is
    /// never entered.
    pub async fn begin(&self) -> InterviewResult<InterviewSession> {
        {
            let mut inner = self.inner.lock().await;
            if inner.state != TurnState::Idle {
                return Err(InterviewError::InvalidState {
                    action: "begin the interview",
                    state: inner.state,
                });
            }
            self.set_state(&mut inner, TurnState::AwaitingQuestion);
        }

        let opened = match start_session(self.api.as_ref(), &self.candidate, &self.job_role).await
        {
            Ok(opened) => opened,
            Err(e) => {
                let mut inner = self.inner.lock().await;
                if inner.state == TurnState::AwaitingQuestion {
                    self.set_state(&mut inner, TurnState::Idle);
                }
                return Err(e);
            }
        };

        let opening = {
            let mut inner = self.inner.lock().await;
            if inner.state.is_ended() {
                drop(inner);
                warn!(
                    "Call ended while session {} was being created",
                    opened.session.session_id
                );
                self.close_remote(&opened.session.session_id).await;
                return Err(InterviewError::StaleResultIgnored);
            }
            inner.session = Some(opened.session.clone());
            let opening = self.append(&mut inner, Message::interviewer(opened.opening));
            self.set_state(&mut inner, TurnState::PresentingQuestion);
            opening
        };

        self.present(&opening.text).await;
        Ok(opened.session)
    }

    /// Submit the answer of the current turn and move on to the next question.
    ///
    /// A network failure leaves the controller in `AwaitingAnswer` with the
    /// answer kept; calling again retries by hand. An answer the service
    /// already acknowledged is not sent twice.
    pub async fn submit_answer(&self, answer: &str) -> InterviewResult<TurnOutcome> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(InterviewError::InvalidInput(
                "answer must not be empty".to_string(),
            ));
        }

        let (session_id, pending) = {
            let mut inner = self.inner.lock().await;
            if inner.state != TurnState::AwaitingAnswer {
                return Err(InterviewError::InvalidState {
                    action: "submit an answer",
                    state: inner.state,
                });
            }
            let session_id = match inner.session.as_ref() {
                Some(session) => session.session_id.clone(),
                None => {
                    return Err(InterviewError::InvalidState {
                        action: "submit an answer",
                        state: inner.state,
                    })
                }
            };

            let pending = match inner.pending.clone() {
                Some(pending) if pending.acknowledged => {
                    if pending.text != answer {
                        debug!("Answer already recorded, retrying next question only");
                    }
                    pending
                }
                _ => PendingAnswer {
                    text: answer.to_string(),
                    acknowledged: false,
                },
            };
            inner.pending = Some(pending.clone());

            let next = if pending.acknowledged {
                TurnState::AwaitingQuestion
            } else {
                TurnState::SubmittingAnswer
            };
            self.set_state(&mut inner, next);
            (session_id, pending)
        };

        if !pending.acknowledged {
            let result = self.api.submit_answer(&session_id, &pending.text).await;

            let mut inner = self.inner.lock().await;
            if inner.state.is_ended() {
                debug!("Dropping submit_answer result for ended session {}", session_id);
                return Err(InterviewError::StaleResultIgnored);
            }
            if let Err(e) = result {
                return Err(self.recoverable_failure(&mut inner, e));
            }
            if let Some(pending) = inner.pending.as_mut() {
                pending.acknowledged = true;
            }
            self.append(&mut inner, Message::candidate(pending.text.clone()));
            self.set_state(&mut inner, TurnState::AwaitingQuestion);
        }

        let result = self.api.next_question(&session_id).await;

        let mut inner = self.inner.lock().await;
        if inner.state.is_ended() {
            debug!("Dropping next_question result for ended session {}", session_id);
            return Err(InterviewError::StaleResultIgnored);
        }
        let question = match result {
            Ok(question) => question,
            Err(e) => return Err(self.recoverable_failure(&mut inner, e)),
        };

        if question.is_completed() {
            info!("Interview {} completed by the service", session_id);
            inner.pending = None;
            self.append(&mut inner, Message::interviewer(CLOSING_MESSAGE));
            self.enter_ended(&mut inner, EndReason::ServiceCompleted);
            drop(inner);

            self.teardown().await;
            self.speak(CLOSING_MESSAGE).await;
            self.close_remote(&session_id).await;
            return Ok(TurnOutcome::Completed);
        }

        let content = match question.content.filter(|c| !c.trim().is_empty()) {
            Some(content) => content,
            None => {
                return Err(self.recoverable_failure(
                    &mut inner,
                    anyhow::anyhow!("next question carried no content"),
                ))
            }
        };

        inner.pending = None;
        let message = self.append(&mut inner, Message::interviewer(content));
        self.set_state(&mut inner, TurnState::PresentingQuestion);
        drop(inner);

        self.present(&message.text).await;
        Ok(TurnOutcome::NextQuestion(message))
    }

    /// Force the call into `Ended` because the service reported completion.
    ///
    /// Returns `false` if the call had already ended.
    pub async fn complete_from_service(&self) -> bool {
        {
            let mut inner = self.inner.lock().await;
            if inner.state.is_ended() {
                debug!("Completion signal after end ignored");
                return false;
            }
            info!("Completion signal received for {}", self.candidate);
            inner.pending = None;
            self.append(&mut inner, Message::interviewer(CLOSING_MESSAGE));
            self.enter_ended(&mut inner, EndReason::ServiceCompleted);
        }

        self.teardown().await;
        self.speak(CLOSING_MESSAGE).await;
        true
    }

    /// The candidate hangs up.
    ///
    /// Returns `false` if the call had already ended.
    pub async fn end_call(&self) -> bool {
        let session_id = {
            let mut inner = self.inner.lock().await;
            if inner.state.is_ended() {
                return false;
            }
            info!("Call ended by {}", self.candidate);
            let session_id = inner.session.as_ref().map(|s| s.session_id.clone());
            self.enter_ended(&mut inner, EndReason::UserEnded);
            session_id
        };

        self.teardown().await;
        if let Some(session_id) = session_id {
            self.close_remote(&session_id).await;
        }
        true
    }

    /// Forward a posture or eye-contact score (0-10) for the live call
    pub async fn report_behavior(&self, metric: BehaviorMetric, score: u8) -> InterviewResult<()> {
        if score > MAX_BEHAVIOR_SCORE {
            return Err(InterviewError::InvalidInput(format!(
                "{:?} score must be between 0 and {}, got {}",
                metric, MAX_BEHAVIOR_SCORE, score
            )));
        }

        let session_id = {
            let inner = self.inner.lock().await;
            match (&inner.session, inner.state) {
                (Some(session), state) if !state.is_ended() => session.session_id.clone(),
                (_, state) => {
                    return Err(InterviewError::InvalidState {
                        action: "report behavior",
                        state,
                    })
                }
            }
        };

        let result = match metric {
            BehaviorMetric::Posture => self.api.update_posture_score(&session_id, score).await,
            BehaviorMetric::EyeContact => self.api.update_eye_score(&session_id, score).await,
        };

        if self.inner.lock().await.state.is_ended() {
            return Err(InterviewError::StaleResultIgnored);
        }
        result.map_err(|e| {
            warn!("Failed to report {:?} score: {:#}", metric, e);
            InterviewError::Submission(format!("{:#}", e))
        })
    }

    fn set_state(&self, inner: &mut TurnInner, state: TurnState) {
        if inner.state != state {
            debug!("Turn state {} -> {}", inner.state, state);
            inner.state = state;
            let _ = self.events.send(TurnEvent::StateChanged(state));
        }
    }

    fn append(&self, inner: &mut TurnInner, message: Message) -> Message {
        let stored = inner.transcript.push(message).clone();
        let _ = self.events.send(TurnEvent::MessageAppended(stored.clone()));
        stored
    }

    fn notify(&self, notice: impl Into<String>) {
        let _ = self.events.send(TurnEvent::Notice(notice.into()));
    }

    fn recoverable_failure(&self, inner: &mut TurnInner, cause: anyhow::Error) -> InterviewError {
        warn!("Interview step failed: {:#}", cause);
        self.set_state(inner, TurnState::AwaitingAnswer);
        self.notify("There was an error processing your response. Please try again.");
        InterviewError::Submission(format!("{:#}", cause))
    }

    fn enter_ended(&self, inner: &mut TurnInner, reason: EndReason) {
        if reason == EndReason::ServiceCompleted {
            if let Some(session) = inner.session.as_mut() {
                session.status = SessionStatus::Completed;
            }
        }
        inner.end_reason = Some(reason);
        self.set_state(inner, TurnState::Ended);
        self.ended_tx.send_replace(true);
        let _ = self.events.send(TurnEvent::Ended(reason));
    }

    /// Runs once per call, right after the transition to `Ended`
    async fn teardown(&self) {
        self.speech.cancel();
        if let Err(e) = self.media.release().await {
            error!("Failed to release {} media inputs: {:#}", self.media.name(), e);
        }
    }

    async fn present(&self, text: &str) {
        self.speak(text).await;

        let mut inner = self.inner.lock().await;
        if inner.state == TurnState::PresentingQuestion {
            self.set_state(&mut inner, TurnState::AwaitingAnswer);
            self.notify("Your turn. Please type your response.");
        }
    }

    async fn speak(&self, text: &str) {
        if let Err(e) = self.speech.speak(text).await {
            warn!("{} speech output failed: {:#}", self.speech.name(), e);
        }
    }

    async fn close_remote(&self, session_id: &str) {
        if let Err(e) = self.api.end_interview(session_id).await {
            error!("Failed to end interview {}: {:#}", session_id, e);
        }
    }
}
