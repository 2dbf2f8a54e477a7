//! The fallback guarantee, exercised through the public `Analyzer` API with
//! scripted providers standing in for the network.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Duration as Days, TimeZone, Utc};
use tickwise_core::domain::{Bar, BarSeries};
use tickwise_runner::{
    Analyzer, CancelToken, Confidence, EngineConfig, InsightError, InsightMode,
    InsightOrchestrator, InsightProvider, InsightSource,
};

struct Scripted<F>(F);

impl<F> InsightProvider for Scripted<F>
where
    F: Fn() -> Result<String, InsightError> + Send + Sync,
{
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(&self, _system: &str, _prompt: &str) -> Result<String, InsightError> {
        (self.0)()
    }
}

fn analyzer_with<F>(reply: F, timeout: Duration) -> Analyzer
where
    F: Fn() -> Result<String, InsightError> + Send + Sync + 'static,
{
    let orchestrator = InsightOrchestrator::with_provider(Arc::new(Scripted(reply)), timeout);
    Analyzer::with_orchestrator(EngineConfig::default(), orchestrator).unwrap()
}

fn wave(n: usize) -> BarSeries {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let bars = (0..n)
        .map(|i| {
            let c = 80.0 + 5.0 * (i as f64 / 9.0).sin() + i as f64 * 0.02;
            Bar {
                timestamp: start + Days::days(i as i64),
                open: c,
                high: c + 0.8,
                low: c - 0.8,
                close: c,
                volume: 50_000,
            }
        })
        .collect();
    BarSeries::new("WAVE", bars).unwrap()
}

fn assert_rule_based(analyzer: &Analyzer) {
    let report = analyzer.analyze(&wave(240), None, None).unwrap();
    assert_eq!(report.insight.source, InsightSource::RuleBased);
    assert!(!report.insight.narrative.trim().is_empty());
    assert!(report
        .insight
        .narrative
        .contains(report.recommendation.decision.label()));
}

#[test]
fn generative_reply_is_used_when_it_arrives() {
    let analyzer = analyzer_with(
        || Ok("Outlook is bullish.\n1. Momentum keeps improving steadily".into()),
        Duration::from_secs(5),
    );
    assert_eq!(analyzer.insight_mode(), InsightMode::Enabled);

    let report = analyzer.analyze(&wave(240), None, None).unwrap();
    assert_eq!(report.insight.source, InsightSource::GenerativeAi);
    assert_eq!(report.insight.confidence, Confidence::High);
    assert_eq!(
        report.insight.key_factors,
        vec!["Momentum keeps improving steadily".to_string()]
    );
}

#[test]
fn provider_error_falls_back() {
    assert_rule_based(&analyzer_with(
        || Err(InsightError::Transport("connection refused".into())),
        Duration::from_secs(5),
    ));
}

#[test]
fn empty_reply_falls_back() {
    assert_rule_based(&analyzer_with(|| Ok(String::new()), Duration::from_secs(5)));
}

#[test]
fn timeout_falls_back_promptly() {
    let analyzer = analyzer_with(
        || {
            thread::sleep(Duration::from_secs(3));
            Ok("too late".into())
        },
        Duration::from_millis(100),
    );
    let start = Instant::now();
    assert_rule_based(&analyzer);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn cancellation_falls_back_promptly() {
    let analyzer = analyzer_with(
        || {
            thread::sleep(Duration::from_secs(5));
            Ok("never seen".into())
        },
        Duration::from_secs(30),
    );
    let token = CancelToken::new();
    let remote = token.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        remote.cancel();
    });

    let start = Instant::now();
    let report = analyzer
        .analyze_with_cancel(&wave(240), None, None, Some(&token))
        .unwrap();
    canceller.join().unwrap();

    assert_eq!(report.insight.source, InsightSource::RuleBased);
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[test]
fn fallback_matches_disabled_output() {
    let failing = analyzer_with(
        || Err(InsightError::HttpStatus {
            status: 500,
            body: String::new(),
        }),
        Duration::from_secs(5),
    );
    let disabled =
        Analyzer::with_orchestrator(EngineConfig::default(), InsightOrchestrator::disabled())
            .unwrap();

    let series = wave(240);
    let a = failing.analyze(&series, None, None).unwrap();
    let b = disabled.analyze(&series, None, None).unwrap();
    assert_eq!(a.insight, b.insight);
}

#[test]
fn partial_fallback_keeps_medium_high_confidence() {
    let analyzer = analyzer_with(
        || Err(InsightError::Transport("connection reset".into())),
        Duration::from_secs(5),
    );
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let bars = (0..300)
        .map(|i| Bar {
            timestamp: start + Days::days(i),
            open: 100.0,
            high: 100.0,
            low: 100.0,
            close: 100.0,
            volume: 10_000,
        })
        .collect();
    let flat = BarSeries::new("FLAT", bars).unwrap();

    let report = analyzer.analyze(&flat, None, None).unwrap();
    assert!(report.recommendation.is_partial());
    assert_eq!(report.insight.source, InsightSource::RuleBased);
    assert_eq!(report.insight.confidence, Confidence::MediumHigh);
}
