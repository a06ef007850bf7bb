// Shared fakes for the interview seams: service API, speech output, media inputs
#![allow(dead_code)]

use anyhow::{bail, Result};
use interview_room::api::messages::{InterviewReport, QuestionMessage, StartInterviewResponse};
use interview_room::{InterviewApi, MediaInputs, SpeechOutput, TurnController};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const CANDIDATE: &str = "ada@example.com";
pub const JOB_ROLE: &str = "Backend Engineer";
pub const OPENING: &str = "Tell me about a system you designed.";

/// Scripted interview service
pub struct FakeApi {
    pub session_id: String,
    pub opening: Option<String>,
    pub questions: Mutex<VecDeque<String>>,
    pub fail_start: AtomicBool,
    pub fail_submit: AtomicUsize,
    pub fail_next: AtomicUsize,
    pub submitted: Mutex<Vec<String>>,
    pub next_calls: AtomicUsize,
    pub end_calls: AtomicUsize,
    pub behavior: Mutex<Vec<(&'static str, u8)>>,
    /// When set, start_interview signals `entered` and waits for `release`
    pub start_gate: Option<(Arc<Notify>, Arc<Notify>)>,
    /// Same as `start_gate`, for submit_answer
    pub submit_gate: Option<(Arc<Notify>, Arc<Notify>)>,
    /// Same as `start_gate`, for next_question
    pub next_gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakeApi {
    pub fn with_questions(questions: &[&str]) -> Self {
        Self {
            session_id: "session-1".to_string(),
            opening: Some(OPENING.to_string()),
            questions: Mutex::new(questions.iter().map(|q| q.to_string()).collect()),
            fail_start: AtomicBool::new(false),
            fail_submit: AtomicUsize::new(0),
            fail_next: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            next_calls: AtomicUsize::new(0),
            end_calls: AtomicUsize::new(0),
            behavior: Mutex::new(Vec::new()),
            start_gate: None,
            submit_gate: None,
            next_gate: None,
        }
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }
}

async fn pass_gate(gate: &Option<(Arc<Notify>, Arc<Notify>)>) {
    if let Some((entered, release)) = gate {
        entered.notify_one();
        release.notified().await;
    }
}

fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait::async_trait]
impl InterviewApi for FakeApi {
    async fn start_interview(
        &self,
        _email: &str,
        _job_role: &str,
    ) -> Result<StartInterviewResponse> {
        pass_gate(&self.start_gate).await;
        if self.fail_start.load(Ordering::SeqCst) {
            bail!("/start_interview returned 500");
        }
        Ok(StartInterviewResponse {
            session_id: Some(self.session_id.clone()),
            content: self.opening.clone(),
            status: Some("started".to_string()),
        })
    }

    async fn next_question(&self, _session_id: &str) -> Result<QuestionMessage> {
        self.next_calls.fetch_add(1, Ordering::SeqCst);

        pass_gate(&self.next_gate).await;

        if take_failure(&self.fail_next) {
            bail!("connection reset");
        }

        let next = self.questions.lock().unwrap().pop_front();
        Ok(match next {
            Some(question) => QuestionMessage {
                role: Some("ai".to_string()),
                content: Some(question),
                timestamp: None,
                status: Some("in_progress".to_string()),
            },
            None => QuestionMessage {
                role: None,
                content: None,
                timestamp: None,
                status: Some("completed".to_string()),
            },
        })
    }

    async fn submit_answer(&self, _session_id: &str, answer: &str) -> Result<()> {
        pass_gate(&self.submit_gate).await;
        if take_failure(&self.fail_submit) {
            bail!("connection refused");
        }
        self.submitted.lock().unwrap().push(answer.to_string());
        Ok(())
    }

    async fn end_interview(&self, _session_id: &str) -> Result<()> {
        self.end_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_posture_score(&self, _session_id: &str, score: u8) -> Result<()> {
        self.behavior.lock().unwrap().push(("posture", score));
        Ok(())
    }

    async fn update_eye_score(&self, _session_id: &str, score: u8) -> Result<()> {
        self.behavior.lock().unwrap().push(("eye", score));
        Ok(())
    }

    async fn interview_report(&self, session_id: &str) -> Result<InterviewReport> {
        if session_id != self.session_id {
            bail!("/interview_report returned 404 for {}", session_id);
        }
        Ok(InterviewReport {
            session_id: session_id.to_string(),
            email: CANDIDATE.to_string(),
            job_role: JOB_ROLE.to_string(),
            questions: Vec::new(),
            answers: Vec::new(),
            total_score: 0.0,
            percentage_score: 0.0,
            posture_score: 0.0,
            eye_score: 0.0,
            status: None,
        })
    }
}

/// Speech output that records what it was asked to say
#[derive(Default)]
pub struct RecordingSpeech {
    pub spoken: Mutex<Vec<String>>,
    pub cancels: AtomicUsize,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SpeechOutput for RecordingSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Media inputs that count releases
#[derive(Default)]
pub struct CountingMedia {
    pub releases: AtomicUsize,
}

impl CountingMedia {
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MediaInputs for CountingMedia {
    async fn release(&self) -> Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.releases() == 0
    }

    fn name(&self) -> &str {
        "counting"
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub speech: Arc<RecordingSpeech>,
    pub media: Arc<CountingMedia>,
    pub controller: Arc<TurnController>,
}

pub fn harness(api: FakeApi) -> Harness {
    let api = Arc::new(api);
    let speech = Arc::new(RecordingSpeech::default());
    let media = Arc::new(CountingMedia::default());
    let controller = Arc::new(TurnController::new(
        CANDIDATE,
        JOB_ROLE,
        api.clone(),
        speech.clone(),
        media.clone(),
    ));

    Harness {
        api,
        speech,
        media,
        controller,
    }
}
