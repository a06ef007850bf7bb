use crate::api::messages::STATUS_COMPLETED;
use anyhow::Result;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// Stream of status updates for one candidate
pub type StatusStream = BoxStream<'static, StatusUpdate>;

/// Change to a candidate's interview status record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: String,

    #[serde(default)]
    pub session_id: Option<String>,
}

impl StatusUpdate {
    pub fn completed() -> Self {
        Self {
            status: STATUS_COMPLETED.to_string(),
            session_id: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }
}

/// Source of pushed status updates, keyed by candidate
#[async_trait::async_trait]
pub trait StatusFeed: Send + Sync {
    /// Subscribe to updates for `candidate`; dropping the stream unsubscribes
    async fn subscribe(&self, candidate: &str) -> Result<StatusStream>;

    /// Get feed name for logging
    fn name(&self) -> &str;
}

/// In-process status feed backed by a broadcast channel
#[derive(Clone)]
pub struct ChannelStatusFeed {
    tx: broadcast::Sender<(String, StatusUpdate)>,
}

impl ChannelStatusFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Push an update to every subscriber of `candidate`.
    ///
    /// Returns how many subscriptions were listening on the feed.
    pub fn publish(&self, candidate: &str, update: StatusUpdate) -> usize {
        self.tx
            .send((candidate.to_string(), update))
            .unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChannelStatusFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait::async_trait]
impl StatusFeed for ChannelStatusFeed {
    async fn subscribe(&self, candidate: &str) -> Result<StatusStream> {
        let rx = self.tx.subscribe();
        let candidate = candidate.to_string();

        let updates = stream::unfold((rx, candidate), |(mut rx, candidate)| async move {
            loop {
                match rx.recv().await {
                    Ok((key, update)) if key == candidate => {
                        return Some((update, (rx, candidate)));
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Status feed lagged, skipped {} updates", skipped);
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        Ok(updates.boxed())
    }

    fn name(&self) -> &str {
        "channel"
    }
}
