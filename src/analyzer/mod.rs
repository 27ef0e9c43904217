//! Report analyzer boundary — raw report text in, score and plan out.
//!
//! The analyzer is an external collaborator: everything behind the
//! [`ReportAnalyzer`] trait is an AI model's opinion, validated
//! structurally on the way in. The sync controller only ever sees a
//! well-formed [`ReportAnalysis`] or an [`AnalysisError`].

pub mod ollama;
pub mod parser;
pub mod prompt;

pub use ollama::OllamaAnalyzer;
pub use parser::parse_analysis_response;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DayPlan, Suggestion};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("The AI model is unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed analyzer response: {0}")]
    MalformedResponse(String),

    #[error("Analyzer score {0} is out of range (expected 0-100)")]
    InvalidScore(i64),

    #[error("Invalid daily plan: {0}")]
    InvalidPlan(String),
}

/// Structured result of a successful report analysis. Completion flags are
/// always false — completion state belongs to the user, not the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAnalysis {
    pub score: u8,
    pub suggestions: Vec<Suggestion>,
    pub daily_plan: Vec<DayPlan>,
}

/// One analysis backend behind a trait, so the sync controller can be
/// exercised without a live model.
pub trait ReportAnalyzer: Send + Sync {
    fn analyze(&self, report_text: &str) -> Result<ReportAnalysis, AnalysisError>;
}
