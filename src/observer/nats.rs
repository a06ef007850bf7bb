use super::feed::{StatusFeed, StatusStream, StatusUpdate};
use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::StreamExt;
use tracing::{info, warn};

/// Status feed over NATS, one subject per candidate
pub struct NatsStatusFeed {
    client: Client,
    subject_prefix: String,
}

impl NatsStatusFeed {
    /// Connect to NATS server
    pub async fn connect(url: &str, subject_prefix: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            subject_prefix: subject_prefix.trim_end_matches('.').to_string(),
        })
    }

    /// Subject carrying status updates for `candidate`
    ///
    /// Dots would split an email into several subject tokens, so they are
    /// replaced with underscores.
    pub fn subject_for(prefix: &str, candidate: &str) -> String {
        let token: String = candidate
            .chars()
            .map(|c| match c {
                '.' | ' ' | '*' | '>' => '_',
                c => c,
            })
            .collect();
        format!("{}.{}", prefix, token)
    }

    /// Publish a status update, as the interview service does on completion
    pub async fn publish(&self, candidate: &str, update: &StatusUpdate) -> Result<()> {
        let subject = Self::subject_for(&self.subject_prefix, candidate);
        let payload = serde_json::to_vec(update)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish status update")?;

        info!("Published status {} to {}", update.status, subject);
        Ok(())
    }
}

#[async_trait::async_trait]
impl StatusFeed for NatsStatusFeed {
    async fn subscribe(&self, candidate: &str) -> Result<StatusStream> {
        let subject = Self::subject_for(&self.subject_prefix, candidate);

        info!("Subscribing to status updates on {}", subject);

        let subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .context("Failed to subscribe to status updates")?;

        info!("Subscribed to {}", subject);

        let updates = subscriber.filter_map(|msg| async move {
            match serde_json::from_slice::<StatusUpdate>(&msg.payload) {
                Ok(update) => Some(update),
                Err(e) => {
                    warn!("Failed to parse status message: {}", e);
                    None
                }
            }
        });

        Ok(updates.boxed())
    }

    fn name(&self) -> &str {
        "nats"
    }
}
