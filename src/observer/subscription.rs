use super::feed::StatusFeed;
use crate::turn::TurnController;
use anyhow::{Context, Result};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Why the observer stopped watching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverExit {
    /// A `completed` update ended the call
    Completed,
    /// The call ended through another path
    CallEnded,
    /// `cancel()` was called
    Cancelled,
    /// The feed stopped delivering updates
    FeedClosed,
    /// The task was aborted or panicked
    Aborted,
}

/// Spawns the task that ties a status feed to a turn controller
pub struct CompletionObserver;

impl CompletionObserver {
    /// Subscribe to `controller`'s candidate on `feed` and watch for completion.
    ///
    /// The subscription lives until it fires, the call ends, it is cancelled,
    /// or the returned handle is dropped.
    pub async fn spawn(
        feed: &dyn StatusFeed,
        controller: Arc<TurnController>,
    ) -> Result<CompletionSubscription> {
        let candidate = controller.candidate().to_string();

        let mut updates = feed
            .subscribe(&candidate)
            .await
            .with_context(|| format!("Failed to subscribe to {} status feed", feed.name()))?;

        let mut ended = controller.ended_signal();
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            info!("Completion observer started for {}", candidate);

            let exit = if *ended.borrow() {
                ObserverExit::CallEnded
            } else {
                loop {
                    tokio::select! {
                        biased;

                        _ = &mut cancel_rx => break ObserverExit::Cancelled,

                        changed = ended.changed() => {
                            if changed.is_err() || *ended.borrow() {
                                break ObserverExit::CallEnded;
                            }
                        }

                        update = updates.next() => match update {
                            Some(update) if update.is_completed() => {
                                controller.complete_from_service().await;
                                break ObserverExit::Completed;
                            }
                            Some(update) => {
                                debug!("Status {} for {}", update.status, candidate);
                            }
                            None => {
                                warn!("Status feed closed for {}", candidate);
                                break ObserverExit::FeedClosed;
                            }
                        },
                    }
                }
            };

            info!("Completion observer stopped for {} ({:?})", candidate, exit);
            exit
        });

        Ok(CompletionSubscription {
            cancel: Some(cancel_tx),
            task: Some(task),
        })
    }
}

/// Handle to a running completion observer; dropping it aborts the watcher
pub struct CompletionSubscription {
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<ObserverExit>>,
}

impl CompletionSubscription {
    /// Stop watching and wait for the task to exit
    pub async fn cancel(mut self) -> ObserverExit {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        self.join().await
    }

    /// Wait until the observer exits on its own
    pub async fn finished(mut self) -> ObserverExit {
        self.join().await
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    async fn join(&mut self) -> ObserverExit {
        match self.task.take() {
            Some(task) => match task.await {
                Ok(exit) => exit,
                Err(e) => {
                    if e.is_panic() {
                        error!("Completion observer panicked: {}", e);
                    }
                    ObserverExit::Aborted
                }
            },
            None => ObserverExit::Aborted,
        }
    }
}

impl Drop for CompletionSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
