use super::score::ScoreRecord;
use crate::session::Message;
use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Collection holding one finalized score record per candidate
pub const FINAL_SCORES: &str = "final_scores";

/// Collection holding one transcript per candidate
pub const CONVERSATIONS: &str = "conversations";

/// Read side of the document store used by the results view
#[async_trait::async_trait]
pub trait ResultStore: Send + Sync {
    async fn final_score(&self, candidate: &str) -> Result<Option<ScoreRecord>>;

    async fn transcript(&self, candidate: &str) -> Result<Option<Vec<Message>>>;

    /// Get store name for logging
    fn name(&self) -> &str;
}

/// Transcript documents come either as a bare list or wrapped in `messages`
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptDocument {
    List(Vec<Message>),
    Wrapped { messages: Vec<Message> },
}

impl From<TranscriptDocument> for Vec<Message> {
    fn from(doc: TranscriptDocument) -> Self {
        match doc {
            TranscriptDocument::List(messages) => messages,
            TranscriptDocument::Wrapped { messages } => messages,
        }
    }
}

/// Document store reached over HTTP: `GET {base}/{collection}/{key}`
pub struct HttpResultStore {
    client: Client,
    base_url: Url,
}

impl HttpResultStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid document store URL {}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Document store URL {} cannot hold paths", base_url));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    fn document_url(&self, collection: &str, key: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Document store URL cannot hold paths"))?
            .pop_if_empty()
            .push(collection)
            .push(key);
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<T>> {
        let url = self.document_url(collection, key)?;
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request for {}/{} failed", collection, key))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document = response
            .error_for_status()
            .with_context(|| format!("{}/{} returned an error status", collection, key))?
            .json()
            .await
            .with_context(|| format!("Malformed {} document", collection))?;

        Ok(Some(document))
    }
}

#[async_trait::async_trait]
impl ResultStore for HttpResultStore {
    async fn final_score(&self, candidate: &str) -> Result<Option<ScoreRecord>> {
        self.fetch(FINAL_SCORES, candidate).await
    }

    async fn transcript(&self, candidate: &str) -> Result<Option<Vec<Message>>> {
        let document: Option<TranscriptDocument> = self.fetch(CONVERSATIONS, candidate).await?;
        Ok(document.map(Vec::from))
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// In-memory document store
#[derive(Default)]
pub struct MemoryResultStore {
    scores: RwLock<HashMap<String, ScoreRecord>>,
    transcripts: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_score(&self, candidate: &str, record: ScoreRecord) {
        self.scores
            .write()
            .await
            .insert(candidate.to_string(), record);
    }

    pub async fn put_transcript(&self, candidate: &str, messages: Vec<Message>) {
        self.transcripts
            .write()
            .await
            .insert(candidate.to_string(), messages);
    }
}

#[async_trait::async_trait]
impl ResultStore for MemoryResultStore {
    async fn final_score(&self, candidate: &str) -> Result<Option<ScoreRecord>> {
        Ok(self.scores.read().await.get(candidate).cloned())
    }

    async fn transcript(&self, candidate: &str) -> Result<Option<Vec<Message>>> {
        Ok(self.transcripts.read().await.get(candidate).cloned())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
