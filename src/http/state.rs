use crate::api::InterviewApi;
use crate::observer::{CompletionSubscription, StatusFeed};
use crate::results::{ResultStore, ScorePresenter};
use crate::session::Transcript;
use crate::turn::{EndReason, TurnController};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// How many ended calls stay queryable through status and transcript
pub const FINISHED_CAPACITY: usize = 256;

/// A live interview call hosted by the HTTP API
pub struct InterviewCall {
    pub controller: Arc<TurnController>,
    observer: Mutex<Option<CompletionSubscription>>,
}

impl InterviewCall {
    pub fn new(controller: Arc<TurnController>, observer: Option<CompletionSubscription>) -> Self {
        Self {
            controller,
            observer: Mutex::new(observer),
        }
    }

    /// Cancel the completion subscription, if still running
    pub async fn stop_observer(&self) {
        let observer = self.observer.lock().await.take();
        if let Some(observer) = observer {
            observer.cancel().await;
        }
    }
}

/// What is kept of a call after it ended
#[derive(Debug, Clone)]
pub struct FinishedCall {
    pub candidate: String,
    pub job_role: String,
    pub end_reason: Option<EndReason>,
    pub transcript: Transcript,
}

/// Ended calls, oldest evicted first
#[derive(Default)]
pub struct FinishedCalls {
    order: VecDeque<String>,
    calls: HashMap<String, FinishedCall>,
}

impl FinishedCalls {
    pub fn insert(&mut self, session_id: String, call: FinishedCall) {
        if self.calls.insert(session_id.clone(), call).is_none() {
            self.order.push_back(session_id);
        }
        while self.order.len() > FINISHED_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.calls.remove(&oldest);
            }
        }
    }

    pub fn get(&self, session_id: &str) -> Option<&FinishedCall> {
        self.calls.get(session_id)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active calls (session_id → call)
    pub calls: Arc<RwLock<HashMap<String, Arc<InterviewCall>>>>,

    /// Ended calls (session_id → transcript snapshot)
    pub finished: Arc<RwLock<FinishedCalls>>,

    pub api: Arc<dyn InterviewApi>,

    pub feed: Arc<dyn StatusFeed>,

    pub presenter: Arc<ScorePresenter>,
}

impl AppState {
    pub fn new(
        api: Arc<dyn InterviewApi>,
        feed: Arc<dyn StatusFeed>,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            calls: Arc::new(RwLock::new(HashMap::new())),
            finished: Arc::new(RwLock::new(FinishedCalls::default())),
            api,
            feed,
            presenter: Arc::new(ScorePresenter::new(store)),
        }
    }

    pub async fn call(&self, session_id: &str) -> Option<Arc<InterviewCall>> {
        self.calls.read().await.get(session_id).cloned()
    }

    pub async fn finished_call(&self, session_id: &str) -> Option<FinishedCall> {
        self.finished.read().await.get(session_id).cloned()
    }

    /// Register a live call; refuses a session id that is already live
    pub async fn admit(&self, session_id: &str, call: Arc<InterviewCall>) -> bool {
        let mut calls = self.calls.write().await;
        if calls.contains_key(session_id) {
            return false;
        }
        calls.insert(session_id.to_string(), call);
        true
    }

    /// Move an ended call out of the live map, keeping its transcript.
    ///
    /// Returns the call if it was still live.
    pub async fn retire(&self, session_id: &str) -> Option<Arc<InterviewCall>> {
        let call = self.call(session_id).await?;

        // Snapshot first so the call is always found in one of the two maps
        let controller = &call.controller;
        let snapshot = FinishedCall {
            candidate: controller.candidate().to_string(),
            job_role: controller.job_role().to_string(),
            end_reason: controller.end_reason().await,
            transcript: controller.transcript().await,
        };
        self.finished
            .write()
            .await
            .insert(session_id.to_string(), snapshot);

        let removed = self.calls.write().await.remove(session_id);
        call.stop_observer().await;

        if removed.is_some() {
            info!("Interview {} retired", session_id);
        }
        removed
    }

    /// Retire the call as soon as its controller ends, by any path
    pub fn retire_when_ended(&self, session_id: String, controller: &TurnController) {
        let mut ended = controller.ended_signal();
        let state = self.clone();

        tokio::spawn(async move {
            while !*ended.borrow() {
                if ended.changed().await.is_err() {
                    break;
                }
            }
            debug!("Call {} ended, retiring", session_id);
            state.retire(&session_id).await;
        });
    }
}
