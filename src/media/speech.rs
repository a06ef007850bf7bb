use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

/// Speech output for interviewer lines
///
/// Implementations:
/// - Console: prints the line and waits for a reading-pace duration
/// - Silent: returns immediately (HTTP shell, tests)
#[async_trait::async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak `text`, resolving once output finished or was cancelled
    async fn speak(&self, text: &str) -> Result<()>;

    /// Cut off whatever is being spoken right now
    fn cancel(&self);

    /// Get output name for logging
    fn name(&self) -> &str;
}

/// How long `text` takes to say at `words_per_minute`
pub fn speaking_duration(text: &str, words_per_minute: u32) -> Duration {
    if words_per_minute == 0 {
        return Duration::ZERO;
    }
    let words = text.split_whitespace().count() as u64;
    Duration::from_millis(words * 60_000 / words_per_minute as u64)
}

/// Prints interviewer lines to stdout at a reading pace
pub struct ConsoleSpeech {
    words_per_minute: u32,
    /// Bumped by every `cancel`; a line stops once it differs from its start value
    generation: AtomicU64,
    cancelled: Notify,
}

impl ConsoleSpeech {
    pub fn new(words_per_minute: u32) -> Self {
        Self {
            words_per_minute,
            generation: AtomicU64::new(0),
            cancelled: Notify::new(),
        }
    }

    /// Wait out `duration` unless a cancel lands after `generation` was read
    async fn hold(&self, generation: u64, duration: Duration) {
        let notified = self.cancelled.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Speech cancelled before it started waiting");
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = notified => debug!("Speech cancelled"),
        }
    }
}

#[async_trait::async_trait]
impl SpeechOutput for ConsoleSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        let generation = self.generation.load(Ordering::SeqCst);
        println!("\nInterviewer: {}", text);

        let duration = speaking_duration(text, self.words_per_minute);
        if !duration.is_zero() {
            self.hold(generation, duration).await;
        }
        Ok(())
    }

    fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancelled.notify_waiters();
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Speech output that says nothing
#[derive(Debug, Default)]
pub struct SilentSpeech;

#[async_trait::async_trait]
impl SpeechOutput for SilentSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        debug!(chars = text.len(), "Silent speech");
        Ok(())
    }

    fn cancel(&self) {}

    fn name(&self) -> &str {
        "silent"
    }
}
