pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod observer;
pub mod results;
pub mod session;
pub mod turn;

pub use api::{HttpInterviewApi, InterviewApi};
pub use config::Config;
pub use error::{InterviewError, InterviewResult, Severity};
pub use http::{create_router, AppState};
pub use media::{ConsoleSpeech, MediaInputs, MediaTracks, SilentSpeech, SpeechOutput};
pub use observer::{
    ChannelStatusFeed, CompletionObserver, CompletionSubscription, NatsStatusFeed, StatusFeed,
    StatusUpdate,
};
pub use results::{
    overall_score, HttpResultStore, MemoryResultStore, PerformanceTier, ResultStore,
    ScorePresenter, ScoreRecord, ScoreReport,
};
pub use session::{InterviewSession, Message, SessionStatus, Speaker, Transcript};
pub use turn::{TurnController, TurnEvent, TurnOutcome, TurnState};
