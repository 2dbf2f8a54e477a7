//! Insight Orchestrator: a prose rationale for each recommendation.
//!
//! One bounded generative call per request when a credential is configured,
//! with a deterministic rule-based narrative whenever that call is disabled,
//! fails, times out, returns nothing usable, or is cancelled. Callers always
//! get an [`InsightResult`]; [`InsightError`] never leaves this module tree
//! except through logging.

pub mod fallback;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod provider;

pub use fallback::rule_based_insight;
pub use orchestrator::{CancelToken, InsightMode, InsightOrchestrator};
pub use parser::{parse_insight_text, ParsedInsight};
pub use prompt::build_prompt;
pub use provider::{ChatCompletionsClient, InsightProvider};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tickwise_core::domain::PriceSnapshot;
use tickwise_core::indicators::IndicatorSet;
use tickwise_core::risk::RiskProfile;
use tickwise_core::scoring::ScoredRecommendation;

/// Everything the prompt and the fallback narrative are built from.
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    pub symbol: &'a str,
    pub snapshot: &'a PriceSnapshot,
    pub indicators: &'a IndicatorSet,
    pub risk: &'a RiskProfile,
    pub recommendation: &'a ScoredRecommendation,
    /// Timestamp of the last analysed bar.
    pub as_of: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightSource {
    GenerativeAi,
    RuleBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    MediumHigh,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightResult {
    pub source: InsightSource,
    pub narrative: String,
    pub sentiment: Sentiment,
    /// At most [`parser::MAX_KEY_FACTORS`] entries.
    pub key_factors: Vec<String>,
    pub confidence: Confidence,
    pub generated_at: DateTime<Utc>,
}

/// Failure of the generative path. Always recovered by the fallback.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("generative insight is disabled (no usable credential)")]
    Disabled,

    #[error("generative call timed out after {0} ms")]
    Timeout(u64),

    #[error("generative call cancelled")]
    Cancelled,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("empty response")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
