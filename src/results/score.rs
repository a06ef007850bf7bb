use crate::error::{InterviewError, InterviewResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TECHNICAL_WEIGHT: f64 = 0.7;
pub const POSTURE_WEIGHT: f64 = 0.15;
pub const EYE_WEIGHT: f64 = 0.15;

/// Finalized scores written by the scoring service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Technical score, 0-100
    #[serde(rename = "total_score")]
    pub technical_score: f64,

    /// Posture score, 0-10
    pub posture_score: f64,

    /// Eye-contact score, 0-10
    pub eye_score: f64,

    /// Job role the interview was for
    #[serde(default)]
    pub role: String,
}

impl ScoreRecord {
    /// Reject values outside their documented scales
    pub fn validate(&self) -> InterviewResult<()> {
        check_range("total_score", self.technical_score, 100.0)?;
        check_range("posture_score", self.posture_score, 10.0)?;
        check_range("eye_score", self.eye_score, 10.0)
    }

    pub fn overall(&self) -> u32 {
        overall_score(self.technical_score, self.posture_score, self.eye_score)
    }
}

fn check_range(field: &str, value: f64, max: f64) -> InterviewResult<()> {
    if !value.is_finite() || value < 0.0 || value > max {
        return Err(InterviewError::MalformedRecord(format!(
            "{} must be within 0..={}, got {}",
            field, max, value
        )));
    }
    Ok(())
}

/// Weighted overall score.
///
/// Posture and eye contact stay on their 0-10 scale while the technical score
/// is 0-100; the weights are applied to the raw values as stored.
pub fn overall_score(technical: f64, posture: f64, eye: f64) -> u32 {
    let weighted = technical * TECHNICAL_WEIGHT + posture * POSTURE_WEIGHT + eye * EYE_WEIGHT;
    weighted.round().max(0.0) as u32
}

/// Score shown as a percentage bar for a 0-10 metric
pub fn percent_of_ten(score: f64) -> f64 {
    score * 10.0
}

/// Feedback band for the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl PerformanceTier {
    /// Lower bounds are inclusive: 80, 65, 50
    pub fn from_overall(overall: u32) -> Self {
        match overall {
            o if o >= 80 => PerformanceTier::Excellent,
            o if o >= 65 => PerformanceTier::Good,
            o if o >= 50 => PerformanceTier::Average,
            _ => PerformanceTier::NeedsImprovement,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::Average => "Average",
            PerformanceTier::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Feedback band for a 0-10 behavioral metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl BehaviorBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            BehaviorBand::Excellent
        } else if score >= 6.0 {
            BehaviorBand::Good
        } else {
            BehaviorBand::NeedsImprovement
        }
    }

    pub fn posture_feedback(self) -> &'static str {
        match self {
            BehaviorBand::Excellent => {
                "Excellent posture maintained throughout the interview. You appeared confident and engaged."
            }
            BehaviorBand::Good => {
                "Good posture overall with occasional slouching. Maintaining consistent posture can help project more confidence."
            }
            BehaviorBand::NeedsImprovement => {
                "Your posture could use improvement. Try sitting up straight and avoiding slouching to appear more confident and engaged."
            }
        }
    }

    pub fn eye_contact_feedback(self) -> &'static str {
        match self {
            BehaviorBand::Excellent => {
                "Excellent eye contact maintained throughout the interview. You appeared engaged and confident."
            }
            BehaviorBand::Good => {
                "Good eye contact overall with occasional lapses. Consistent eye contact can help establish better rapport."
            }
            BehaviorBand::NeedsImprovement => {
                "Your eye contact could use improvement. Try to look at the camera more consistently to establish better connection with the interviewer."
            }
        }
    }
}
