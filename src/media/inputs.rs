use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

/// Kind of captured media input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Camera,
    Microphone,
    Screen,
}

/// Media inputs held for the duration of a call
///
/// The turn controller calls `release` exactly once, when the call ends.
#[async_trait::async_trait]
pub trait MediaInputs: Send + Sync {
    /// Stop every held input
    async fn release(&self) -> Result<()>;

    /// Check if any input is still held
    fn is_capturing(&self) -> bool;

    /// Get inputs name for logging
    fn name(&self) -> &str;
}

/// Registry of capture handles a shell attached to the call
#[derive(Default)]
pub struct MediaTracks {
    tracks: Mutex<Vec<(MediaKind, String)>>,
    capturing: AtomicBool,
}

impl MediaTracks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a live capture handle
    pub fn attach(&self, kind: MediaKind, label: impl Into<String>) {
        let label = label.into();
        debug!("Attaching {:?} track {}", kind, label);
        let mut tracks = self.tracks.lock().unwrap_or_else(|e| e.into_inner());
        tracks.push((kind, label));
        self.capturing.store(true, Ordering::SeqCst);
    }

    pub fn track_count(&self) -> usize {
        self.tracks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait::async_trait]
impl MediaInputs for MediaTracks {
    async fn release(&self) -> Result<()> {
        let released: Vec<_> = {
            let mut tracks = self.tracks.lock().unwrap_or_else(|e| e.into_inner());
            tracks.drain(..).collect()
        };
        self.capturing.store(false, Ordering::SeqCst);

        for (kind, label) in &released {
            info!("Stopped {:?} track {}", kind, label);
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "tracks"
    }
}
