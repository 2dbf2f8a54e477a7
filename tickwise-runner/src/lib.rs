//! Tickwise Runner: configuration, insight generation and the analysis pipeline.
//!
//! This crate builds on `tickwise-core` to provide:
//! - `EngineConfig` loaded from TOML, with validation
//! - The Insight Orchestrator (bounded generative call, rule-based fallback)
//! - `Analyzer::analyze` / `analyze_batch`, which wire everything together

pub mod analyze;
pub mod config;
pub mod insight;

pub use analyze::{AnalysisReport, AnalyzeError, Analyzer, SymbolRequest};
pub use config::{ConfigError, EngineConfig, InsightConfig};
pub use insight::{
    CancelToken, Confidence, InsightError, InsightMode, InsightOrchestrator, InsightProvider,
    InsightResult, InsightSource, Sentiment,
};
