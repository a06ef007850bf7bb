use super::score::{percent_of_ten, BehaviorBand, PerformanceTier, ScoreRecord};
use super::store::ResultStore;
use crate::error::{InterviewError, InterviewResult};
use crate::session::Transcript;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Everything the results view renders for one candidate
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub candidate: String,
    pub role: String,

    /// Weighted overall score, recomputed on every read
    pub overall: u32,
    pub tier: PerformanceTier,

    pub technical_score: f64,
    pub posture_score: f64,
    pub eye_score: f64,

    /// Posture shown on a 0-100 bar
    pub posture_percent: f64,
    /// Eye contact shown on a 0-100 bar
    pub eye_percent: f64,

    pub posture_band: BehaviorBand,
    pub posture_feedback: String,
    pub eye_band: BehaviorBand,
    pub eye_feedback: String,

    pub transcript: Transcript,
}

impl ScoreReport {
    pub fn from_record(candidate: &str, record: &ScoreRecord, transcript: Transcript) -> Self {
        let overall = record.overall();
        let posture_band = BehaviorBand::from_score(record.posture_score);
        let eye_band = BehaviorBand::from_score(record.eye_score);

        Self {
            candidate: candidate.to_string(),
            role: record.role.clone(),
            overall,
            tier: PerformanceTier::from_overall(overall),
            technical_score: record.technical_score,
            posture_score: record.posture_score,
            eye_score: record.eye_score,
            posture_percent: percent_of_ten(record.posture_score),
            eye_percent: percent_of_ten(record.eye_score),
            posture_band,
            posture_feedback: posture_band.posture_feedback().to_string(),
            eye_band,
            eye_feedback: eye_band.eye_contact_feedback().to_string(),
            transcript,
        }
    }
}

/// Loads finalized scores and transcripts for the results view
pub struct ScorePresenter {
    store: Arc<dyn ResultStore>,
}

impl ScorePresenter {
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self { store }
    }

    /// Build the report for `candidate`.
    ///
    /// A missing score record is `NotFound`; nothing is rendered partially.
    /// A missing transcript yields an empty one.
    pub async fn present(&self, candidate: &str) -> InterviewResult<ScoreReport> {
        let record = self
            .store
            .final_score(candidate)
            .await
            .map_err(|e| {
                error!("Failed to read score for {}: {:#}", candidate, e);
                InterviewError::Store(format!("{:#}", e))
            })?
            .ok_or_else(|| {
                warn!("No score record for {}", candidate);
                InterviewError::NotFound(candidate.to_string())
            })?;

        record.validate()?;

        let messages = self
            .store
            .transcript(candidate)
            .await
            .map_err(|e| {
                error!("Failed to read transcript for {}: {:#}", candidate, e);
                InterviewError::Store(format!("{:#}", e))
            })?
            .unwrap_or_default();

        let report = ScoreReport::from_record(candidate, &record, Transcript::from(messages));

        info!(
            "Report for {} from {} store: overall={} ({})",
            candidate,
            self.store.name(),
            report.overall,
            report.tier
        );

        Ok(report)
    }
}
