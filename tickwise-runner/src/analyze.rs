//! The `analyze()` pipeline: validated series in, complete report out.
//!
//! Indicators and risk are independent and run in parallel; scoring needs
//! both; the insight comes last and never fails. The only errors returned are
//! input problems and invalid indicator overrides.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use tickwise_core::domain::{Bar, BarSeries, InputError, PriceSnapshot, SeriesFingerprint};
use tickwise_core::indicators::{compute_indicators, IndicatorParams, IndicatorSet, ParamsError};
use tickwise_core::risk::{compute_risk, RiskProfile};
use tickwise_core::scoring::{score, ScoredRecommendation};

use crate::config::{ConfigError, EngineConfig};
use crate::insight::{CancelToken, InsightContext, InsightMode, InsightOrchestrator, InsightResult};

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("invalid indicator parameters: {0}")]
    InvalidParams(#[from] ParamsError),
}

/// Full result for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub fingerprint: SeriesFingerprint,
    pub snapshot: PriceSnapshot,
    pub indicators: IndicatorSet,
    pub risk: RiskProfile,
    pub recommendation: ScoredRecommendation,
    pub insight: InsightResult,
}

/// One entry of a batch: raw bars, validated inside the batch so a bad symbol
/// only fails its own slot.
#[derive(Debug, Clone)]
pub struct SymbolRequest {
    pub symbol: String,
    pub bars: Vec<Bar>,
    /// Overrides the configured indicator windows for this symbol.
    pub params: Option<IndicatorParams>,
}

impl SymbolRequest {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
            params: None,
        }
    }

    pub fn with_params(mut self, params: IndicatorParams) -> Self {
        self.params = Some(params);
        self
    }
}

pub struct Analyzer {
    config: EngineConfig,
    orchestrator: InsightOrchestrator,
}

impl Analyzer {
    /// Validate `config` and build the insight orchestrator from it. The
    /// credential is read here, once.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let orchestrator = InsightOrchestrator::from_config(&config.insight);
        Ok(Self {
            config,
            orchestrator,
        })
    }

    pub fn with_orchestrator(
        config: EngineConfig,
        orchestrator: InsightOrchestrator,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            orchestrator,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn insight_mode(&self) -> InsightMode {
        self.orchestrator.mode()
    }

    pub fn analyze(
        &self,
        series: &BarSeries,
        benchmark: Option<&BarSeries>,
        params: Option<&IndicatorParams>,
    ) -> Result<AnalysisReport, AnalyzeError> {
        self.analyze_with_cancel(series, benchmark, params, None)
    }

    /// Like [`analyze`](Self::analyze); cancelling `cancel` while the
    /// generative call is running resolves the insight through the fallback.
    pub fn analyze_with_cancel(
        &self,
        series: &BarSeries,
        benchmark: Option<&BarSeries>,
        params: Option<&IndicatorParams>,
        cancel: Option<&CancelToken>,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let params = params.unwrap_or(&self.config.indicators);

        let (indicators, risk) = rayon::join(
            || compute_indicators(series, params),
            || {
                let bench = benchmark.map(BarSeries::returns);
                compute_risk(&series.returns(), bench.as_deref(), &self.config.risk)
            },
        );
        let indicators = indicators?;
        let recommendation = score(&indicators, &risk, &self.config.scoring);
        let snapshot = PriceSnapshot::from_series(series);

        let ctx = InsightContext {
            symbol: series.symbol(),
            snapshot: &snapshot,
            indicators: &indicators,
            risk: &risk,
            recommendation: &recommendation,
            as_of: series.last().timestamp,
        };
        let insight = self.orchestrator.generate(&ctx, cancel);

        info!(
            symbol = series.symbol(),
            bars = series.len(),
            score = recommendation.score,
            decision = recommendation.decision.label(),
            insight = ?insight.source,
            "analysis complete"
        );

        Ok(AnalysisReport {
            symbol: series.symbol().to_string(),
            fingerprint: series.fingerprint(),
            snapshot,
            indicators,
            risk,
            recommendation,
            insight,
        })
    }

    /// Validate raw bars, then analyse them.
    pub fn analyze_bars(
        &self,
        symbol: &str,
        bars: Vec<Bar>,
        benchmark: Option<&BarSeries>,
        params: Option<&IndicatorParams>,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let series = BarSeries::new(symbol, bars)?;
        self.analyze(&series, benchmark, params)
    }

    /// Analyse every request in parallel against one shared benchmark.
    /// Results come back in input order, one per request.
    pub fn analyze_batch(
        &self,
        requests: &[SymbolRequest],
        benchmark: Option<&BarSeries>,
    ) -> Vec<Result<AnalysisReport, AnalyzeError>> {
        requests
            .par_iter()
            .map(|req| {
                self.analyze_bars(&req.symbol, req.bars.clone(), benchmark, req.params.as_ref())
            })
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
