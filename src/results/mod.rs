//! Interview results
//!
//! - Score record, weighted overall score and feedback bands
//! - Document store the records are read from
//! - Presenter assembling the report shown to the candidate

mod presenter;
mod score;
mod store;

pub use presenter::{ScorePresenter, ScoreReport};
pub use score::{
    overall_score, percent_of_ten, BehaviorBand, PerformanceTier, ScoreRecord, EYE_WEIGHT,
    POSTURE_WEIGHT, TECHNICAL_WEIGHT,
};
pub use store::{HttpResultStore, MemoryResultStore, ResultStore, CONVERSATIONS, FINAL_SCORES};
