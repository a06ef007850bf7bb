//! Completion observer
//!
//! Watches the per-candidate status record and forces the turn controller
//! into `Ended` when the service marks the interview completed.
//! - `StatusFeed`: where status updates come from (NATS or in-process)
//! - `CompletionObserver`: spawns the watcher and hands back a cancellable
//!   `CompletionSubscription`

mod feed;
mod nats;
mod subscription;

pub use feed::{ChannelStatusFeed, StatusFeed, StatusStream, StatusUpdate};
pub use nats::NatsStatusFeed;
pub use subscription::{CompletionObserver, CompletionSubscription, ObserverExit};
