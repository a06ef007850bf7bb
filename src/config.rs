use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

/// Prefix of environment overrides, e.g. `INTERVIEW_ROOM__NATS__URL`
pub const ENV_PREFIX: &str = "INTERVIEW_ROOM";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub interview: InterviewConfig,
    pub store: StoreConfig,
    pub nats: NatsConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct InterviewConfig {
    /// Base URL of the interview-orchestration service
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl InterviewConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the document store holding scores and transcripts
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct NatsConfig {
    pub url: String,
    #[serde(default = "default_status_prefix")]
    pub status_subject_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeechConfig {
    /// Reading pace of the console interviewer; 0 disables pacing
    pub words_per_minute: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 160,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_status_prefix() -> String {
    "interview.status".to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
